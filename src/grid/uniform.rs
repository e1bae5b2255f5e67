//! Uniform grids of (y, x) coordinates over the unmasked pixels of a mask.

use super::{irregular::Grid2DIrregular, EvalResult, Structure};
use crate::{
    array::Array2D,
    error::{GridError, Result},
    geometry::{
        Dim2::{X, Y},
        FromReferenceFrame2, In2D, PointTransformation2, ToReferenceFrame2,
    },
    mask::Mask2D,
};
use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A uniform 2D grid holding the sub-pixel centres of every unmasked pixel in slim order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Grid2D {
    coords: Array2<f64>,
    mask: Mask2D,
    transformed: bool,
}

impl Grid2D {
    /// Creates the grid of sub-pixel centres of the given mask.
    pub fn from_mask(mask: Mask2D) -> Self {
        Self {
            coords: mask.sub_grid_slim(),
            mask,
            transformed: false,
        }
    }

    /// Creates a grid over an unmasked raster of the given shape.
    pub fn uniform(shape: (usize, usize), pixel_scales: In2D<f64>, sub_size: usize) -> Result<Self> {
        Ok(Self::from_mask(Mask2D::unmasked(shape, pixel_scales, sub_size)?))
    }

    /// Wraps an explicit `[sub_pixels_in_mask, 2]` coordinate array with its mask.
    pub fn from_slim(coords: Array2<f64>, mask: Mask2D) -> Result<Self> {
        let expected = mask.sub_pixels_in_mask();
        if coords.nrows() != expected {
            return Err(GridError::ResultLength {
                expected,
                found: coords.nrows(),
            });
        }
        Ok(Self {
            coords,
            mask,
            transformed: false,
        })
    }

    pub(crate) fn with_slim(&self, coords: Array2<f64>, transformed: bool) -> Self {
        debug_assert_eq!(coords.nrows(), self.coords.nrows());
        Self {
            coords,
            mask: self.mask.clone(),
            transformed,
        }
    }

    pub fn slim(&self) -> &Array2<f64> {
        &self.coords
    }

    pub fn mask(&self) -> &Mask2D {
        &self.mask
    }

    pub fn pixel_scales(&self) -> &In2D<f64> {
        self.mask.pixel_scales()
    }

    /// Returns the single pixel scale of a grid with square pixels.
    pub fn pixel_scale(&self) -> Result<f64> {
        self.mask.pixel_scale()
    }

    pub fn sub_size(&self) -> usize {
        self.mask.sub_size()
    }

    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }

    pub fn is_transformed(&self) -> bool {
        self.transformed
    }

    /// Averages the sub-pixel coordinates of every pixel, returning a grid with sub size 1.
    pub fn binned(&self) -> Self {
        if self.mask.sub_size() == 1 {
            return self.clone();
        }
        Self {
            coords: self.mask.bin_sub_values(self.coords.view()),
            mask: self.mask.with_sub_size(1),
            transformed: self.transformed,
        }
    }

    /// Returns the `[x_min, x_max, y_min, y_max]` extent of the coordinates.
    pub fn extent(&self) -> [f64; 4] {
        let fold_column = |column: usize| {
            self.coords.column(column).iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), &value| (min.min(value), max.max(value)),
            )
        };
        let (y_min, y_max) = fold_column(0);
        let (x_min, x_max) = fold_column(1);
        [x_min, x_max, y_min, y_max]
    }

    /// Creates an irregular grid of points along a straight line from `centre`,
    /// rotated clockwise by `angle` degrees from the positive x-axis.
    ///
    /// The points are spaced by the sub-pixel scale along the dimension of the
    /// farthest extent edge, and the line is long enough to reach that edge.
    /// The centre itself is the first point unless `remove_centre` is set.
    pub fn grid_2d_radial_projected_from(
        &self,
        centre: In2D<f64>,
        angle: f64,
        remove_centre: bool,
    ) -> Grid2DIrregular {
        let [x_min, x_max, y_min, y_max] = self.extent();

        let distance_to_positive_x = x_max - centre[X];
        let distance_to_positive_y = y_max - centre[Y];
        let distance_to_negative_x = centre[X] - x_min;
        let distance_to_negative_y = centre[Y] - y_min;

        let scaled_distance = distance_to_positive_x
            .max(distance_to_positive_y)
            .max(distance_to_negative_x)
            .max(distance_to_negative_y);

        let pixel_scale = if scaled_distance == distance_to_positive_y
            || scaled_distance == distance_to_negative_y
        {
            self.pixel_scales()[Y]
        } else {
            self.pixel_scales()[X]
        };
        let sub_pixel_scale = pixel_scale / self.sub_size() as f64;
        let n_points = (scaled_distance / sub_pixel_scale).max(0.0) as usize + 1;

        let mut line = Array2::zeros((n_points, 2));
        for (idx, mut point) in line.rows_mut().into_iter().enumerate() {
            point[0] = centre[Y];
            point[1] = centre[X] + idx as f64 * sub_pixel_scale;
        }

        let rotated = ToReferenceFrame2::new(centre, angle).transform_grid(line.view());
        let projected = FromReferenceFrame2::new(centre, 0.0).transform_grid(rotated.view());

        let projected = if remove_centre {
            projected.slice(s![1.., ..]).to_owned()
        } else {
            projected
        };
        Grid2DIrregular::from_slim(projected)
    }

    /// Rebuilds a raw result evaluated on this grid as an [`Array2D`] (scalar
    /// results) or a [`Grid2D`] sharing this grid's mask (vector results).
    pub fn structure_2d_from_result(&self, result: EvalResult) -> Result<Structure> {
        result.verify_len(self.len())?;
        Ok(match result {
            EvalResult::Scalar(values) => {
                Structure::Array2D(Array2D::from_slim(values, self.mask.clone())?)
            }
            EvalResult::Vector(coords) => {
                Structure::Grid2D(Grid2D::from_slim(coords, self.mask.clone())?)
            }
        })
    }

    /// Rebuilds every raw result in the list as in [`Self::structure_2d_from_result`].
    pub fn structure_2d_list_from_result_list(
        &self,
        results: Vec<EvalResult>,
    ) -> Result<Vec<Structure>> {
        results
            .into_iter()
            .map(|result| self.structure_2d_from_result(result))
            .collect()
    }
}
