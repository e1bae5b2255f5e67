//! Rectangular pixel masks and the sub-gridded coordinates they define.

use crate::{
    error::{GridError, Result},
    geometry::{Dim2::{X, Y}, In2D},
};
use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A 2D boolean mask over a rectangular raster of pixels.
///
/// Entries that are `true` are masked out. Every unmasked pixel is split into
/// `sub_size * sub_size` sub-pixels, and all per-coordinate data built from
/// the mask is stored in "slim" order: unmasked pixels row-major, with the
/// sub-pixels of each pixel contiguous and row-major within it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Mask2D {
    mask: Array2<bool>,
    pixel_scales: In2D<f64>,
    origin: In2D<f64>,
    sub_size: usize,
}

impl Mask2D {
    /// Creates a new mask from the given boolean raster.
    pub fn from_array(
        mask: Array2<bool>,
        pixel_scales: In2D<f64>,
        origin: In2D<f64>,
        sub_size: usize,
    ) -> Result<Self> {
        if mask.is_empty() {
            return Err(GridError::MaskShape(
                "mask must have non-zero size along both dimensions".to_string(),
            ));
        }
        if sub_size == 0 {
            return Err(GridError::MaskShape("sub size must be at least 1".to_string()));
        }
        if !(pixel_scales[Y] > 0.0 && pixel_scales[X] > 0.0) {
            return Err(GridError::MaskShape(format!(
                "pixel scales must be positive, got {}",
                pixel_scales
            )));
        }
        Ok(Self {
            mask,
            pixel_scales,
            origin,
            sub_size,
        })
    }

    /// Creates a mask of the given shape with every pixel unmasked.
    pub fn unmasked(shape: (usize, usize), pixel_scales: In2D<f64>, sub_size: usize) -> Result<Self> {
        Self::from_array(
            Array2::from_elem(shape, false),
            pixel_scales,
            In2D::same(0.0),
            sub_size,
        )
    }

    /// Creates a mask where only pixels whose centres lie within `radius` of
    /// `centre` are unmasked.
    pub fn circular(
        shape: (usize, usize),
        pixel_scales: In2D<f64>,
        radius: f64,
        centre: In2D<f64>,
        sub_size: usize,
    ) -> Result<Self> {
        let mut circular = Self::unmasked(shape, pixel_scales, sub_size)?;
        let (ny, nx) = shape;
        for i in 0..ny {
            for j in 0..nx {
                let pixel_centre = circular.pixel_centre(i, j);
                let distance =
                    (pixel_centre[Y] - centre[Y]).hypot(pixel_centre[X] - centre[X]);
                circular.mask[[i, j]] = distance > radius;
            }
        }
        Ok(circular)
    }

    /// Returns a view of the boolean raster.
    pub fn mask(&self) -> ArrayView2<bool> {
        self.mask.view()
    }

    /// Returns the (y, x) shape of the pixel raster.
    pub fn shape_native(&self) -> (usize, usize) {
        self.mask.dim()
    }

    pub fn pixel_scales(&self) -> &In2D<f64> {
        &self.pixel_scales
    }

    pub fn origin(&self) -> &In2D<f64> {
        &self.origin
    }

    pub fn sub_size(&self) -> usize {
        self.sub_size
    }

    /// Returns the single pixel scale of a mask with square pixels.
    pub fn pixel_scale(&self) -> Result<f64> {
        if self.pixel_scales[Y] == self.pixel_scales[X] {
            Ok(self.pixel_scales[Y])
        } else {
            Err(GridError::PixelScalesNotSquare(
                self.pixel_scales[Y],
                self.pixel_scales[X],
            ))
        }
    }

    /// Number of unmasked pixels.
    pub fn pixels_in_mask(&self) -> usize {
        self.mask.iter().filter(|&&masked| !masked).count()
    }

    /// Number of unmasked sub-pixels.
    pub fn sub_pixels_in_mask(&self) -> usize {
        self.pixels_in_mask() * self.sub_size * self.sub_size
    }

    /// Constructs a copy of the mask with a different sub size.
    pub fn with_sub_size(&self, sub_size: usize) -> Self {
        Self {
            sub_size,
            ..self.clone()
        }
    }

    /// Constructs a copy of the mask where only the unmasked pixels whose slim
    /// index is selected stay unmasked.
    pub fn with_slim_selection(&self, selection: &[bool]) -> Self {
        let mut selected = self.clone();
        for ((i, j), &keep) in self.unmasked_pixel_indices().into_iter().zip(selection) {
            selected.mask[[i, j]] = !keep;
        }
        selected
    }

    /// Returns the (row, column) indices of every unmasked pixel in slim order.
    pub fn unmasked_pixel_indices(&self) -> Vec<(usize, usize)> {
        self.mask
            .indexed_iter()
            .filter_map(|(idx, &masked)| if masked { None } else { Some(idx) })
            .collect()
    }

    /// Returns the scaled (y, x) coordinates of the centre of the given pixel.
    pub fn pixel_centre(&self, i: usize, j: usize) -> In2D<f64> {
        let (ny, nx) = self.shape_native();
        let y_centre = (ny as f64 - 1.0) / 2.0;
        let x_centre = (nx as f64 - 1.0) / 2.0;
        In2D::new(
            -(i as f64 - y_centre) * self.pixel_scales[Y] + self.origin[Y],
            (j as f64 - x_centre) * self.pixel_scales[X] + self.origin[X],
        )
    }

    /// Computes the `[sub_pixels_in_mask, 2]` array of sub-pixel centres.
    pub fn sub_grid_slim(&self) -> Array2<f64> {
        let sub = self.sub_size;
        let sub_scale_y = self.pixel_scales[Y] / sub as f64;
        let sub_scale_x = self.pixel_scales[X] / sub as f64;

        let mut grid = Array2::zeros((self.sub_pixels_in_mask(), 2));
        let mut sub_index = 0;
        for (i, j) in self.unmasked_pixel_indices() {
            let centre = self.pixel_centre(i, j);
            let top = centre[Y] + 0.5 * self.pixel_scales[Y];
            let left = centre[X] - 0.5 * self.pixel_scales[X];
            for sub_y in 0..sub {
                for sub_x in 0..sub {
                    grid[[sub_index, 0]] = top - (sub_y as f64 + 0.5) * sub_scale_y;
                    grid[[sub_index, 1]] = left + (sub_x as f64 + 0.5) * sub_scale_x;
                    sub_index += 1;
                }
            }
        }
        grid
    }

    /// Averages the sub-pixel rows of a `[sub_pixels_in_mask, components]`
    /// array down to one row per pixel.
    pub fn bin_sub_values(&self, values: ArrayView2<f64>) -> Array2<f64> {
        let sub_length = self.sub_size * self.sub_size;
        let mut binned = Array2::zeros((self.pixels_in_mask(), values.ncols()));
        for (mut binned_row, chunk) in binned
            .rows_mut()
            .into_iter()
            .zip(values.exact_chunks((sub_length, values.ncols())))
        {
            binned_row.assign(&chunk.mean_axis(Axis(0)).unwrap_or_else(|| {
                Array1::zeros(values.ncols())
            }));
        }
        binned
    }

    /// Places slim sub-pixel values onto the full `(ny * sub, nx * sub)` raster,
    /// leaving masked entries at zero.
    pub fn native_from_sub_slim(&self, values: ArrayView1<f64>) -> Array2<f64> {
        let sub = self.sub_size;
        let (ny, nx) = self.shape_native();
        let mut native = Array2::zeros((ny * sub, nx * sub));
        let mut sub_index = 0;
        for (i, j) in self.unmasked_pixel_indices() {
            for sub_y in 0..sub {
                for sub_x in 0..sub {
                    native[[i * sub + sub_y, j * sub + sub_x]] = values[sub_index];
                    sub_index += 1;
                }
            }
        }
        native
    }
}
