//! Uniform 1D grids of radial coordinates.

use super::{irregular::Grid2DIrregular, EvalResult, Structure};
use crate::{
    array::Array1D,
    error::{GridError, Result},
    geometry::{In2D, PointTransformation2, ToReferenceFrame2},
};
use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A uniform grid of 1D coordinates, each pixel split into `sub_size` sub-pixels.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Grid1D {
    coords: Array1<f64>,
    pixel_scale: f64,
    sub_size: usize,
}

impl Grid1D {
    /// Creates a grid of `n_pixels` pixels centred on `origin`.
    pub fn uniform(n_pixels: usize, pixel_scale: f64, sub_size: usize, origin: f64) -> Result<Self> {
        if n_pixels == 0 || sub_size == 0 || !(pixel_scale > 0.0) {
            return Err(GridError::MaskShape(format!(
                "1D grid needs pixels, sub size and pixel scale above zero, got {}, {} and {}",
                n_pixels, sub_size, pixel_scale
            )));
        }
        let centre = (n_pixels as f64 - 1.0) / 2.0;
        let sub_scale = pixel_scale / sub_size as f64;
        let coords = (0..n_pixels)
            .flat_map(|idx| {
                let left = (idx as f64 - centre) * pixel_scale + origin - 0.5 * pixel_scale;
                (0..sub_size).map(move |sub_idx| left + (sub_idx as f64 + 0.5) * sub_scale)
            })
            .collect();
        Ok(Self {
            coords,
            pixel_scale,
            sub_size,
        })
    }

    /// Creates a grid of `n_pixels` pixels whose first coordinate is zero.
    pub fn uniform_from_zero(n_pixels: usize, pixel_scale: f64, sub_size: usize) -> Result<Self> {
        let mut grid = Self::uniform(n_pixels, pixel_scale, sub_size, 0.0)?;
        let first = grid.coords[0];
        grid.coords.mapv_inplace(|coord| coord - first);
        Ok(grid)
    }

    pub fn slim(&self) -> ArrayView1<f64> {
        self.coords.view()
    }

    pub fn pixel_scale(&self) -> f64 {
        self.pixel_scale
    }

    pub fn sub_size(&self) -> usize {
        self.sub_size
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Places the 1D coordinates along the positive x-axis and rotates them
    /// clockwise by `angle` degrees about the origin.
    pub fn project_to_radial_grid_2d(&self, angle: f64) -> Grid2DIrregular {
        let mut grid = Array2::zeros((self.len(), 2));
        grid.column_mut(1).assign(&self.coords);
        Grid2DIrregular::from_slim(
            ToReferenceFrame2::new(In2D::same(0.0), angle).transform_grid(grid.view()),
        )
    }

    /// Rebuilds a raw result evaluated on the projection of this grid as an
    /// [`Array1D`] (scalar results) or an irregular grid (vector results).
    pub fn structure_2d_from_result(&self, result: EvalResult) -> Result<Structure> {
        result.verify_len(self.len())?;
        Ok(match result {
            EvalResult::Scalar(values) => {
                Structure::Array1D(Array1D::manual_slim(values, self.pixel_scale))
            }
            EvalResult::Vector(coords) => {
                Structure::Grid2DIrregular(Grid2DIrregular::from_slim(coords))
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
