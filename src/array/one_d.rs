//! Scalar values along a 1D line of samples.

use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Values sampled along a 1D line, tagged with the pixel scale of the grid
/// they were evaluated from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Array1D {
    values: Array1<f64>,
    pixel_scale: f64,
}

impl Array1D {
    /// Wraps the given values without any reshaping.
    pub fn manual_slim(values: Array1<f64>, pixel_scale: f64) -> Self {
        Self {
            values,
            pixel_scale,
        }
    }

    pub fn slim(&self) -> ArrayView1<f64> {
        self.values.view()
    }

    pub fn pixel_scale(&self) -> f64 {
        self.pixel_scale
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_slim(self) -> Array1<f64> {
        self.values
    }
}
