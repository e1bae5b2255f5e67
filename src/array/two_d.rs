//! Scalar values over the unmasked sub-pixels of a 2D mask.

use crate::{
    error::{GridError, Result},
    mask::Mask2D,
};
use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A masked 2D array stored in slim order at the resolution of its mask's sub size.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Array2D {
    values: Array1<f64>,
    mask: Mask2D,
}

impl Array2D {
    /// Wraps slim sub-pixel values together with the mask they belong to.
    pub fn from_slim(values: Array1<f64>, mask: Mask2D) -> Result<Self> {
        let expected = mask.sub_pixels_in_mask();
        if values.len() != expected {
            return Err(GridError::ResultLength {
                expected,
                found: values.len(),
            });
        }
        Ok(Self { values, mask })
    }

    /// Picks the unmasked entries of a native 2D raster, at sub size 1.
    pub fn from_native(values: ArrayView2<f64>, mask: Mask2D) -> Result<Self> {
        if values.dim() != mask.shape_native() {
            return Err(GridError::MaskShape(format!(
                "array shape {:?} does not match mask shape {:?}",
                values.dim(),
                mask.shape_native()
            )));
        }
        let mask = mask.with_sub_size(1);
        let slim = mask
            .unmasked_pixel_indices()
            .into_iter()
            .map(|idx| values[idx])
            .collect();
        Ok(Self { values: slim, mask })
    }

    pub fn slim(&self) -> ArrayView1<f64> {
        self.values.view()
    }

    pub fn mask(&self) -> &Mask2D {
        &self.mask
    }

    pub fn into_slim(self) -> Array1<f64> {
        self.values
    }

    /// Returns the values on the full sub-gridded raster, with zeros where masked.
    pub fn native(&self) -> Array2<f64> {
        self.mask.native_from_sub_slim(self.values.view())
    }

    /// Averages every pixel's sub-pixel values, returning an array with sub size 1.
    pub fn binned(&self) -> Self {
        if self.mask.sub_size() == 1 {
            return self.clone();
        }
        let binned = self
            .mask
            .bin_sub_values(self.values.view().insert_axis(Axis(1)))
            .remove_axis(Axis(1));
        Self {
            values: binned,
            mask: self.mask.with_sub_size(1),
        }
    }
}
