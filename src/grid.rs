//! Coordinate grids that functions can be evaluated on, and the structured
//! results such evaluations are reconstructed into.

pub mod interpolate;
pub mod irregular;
pub mod iterate;
pub mod one_d;
pub mod uniform;

pub use interpolate::Grid2DInterpolate;
pub use irregular::Grid2DIrregular;
pub use iterate::Grid2DIterate;
pub use one_d::Grid1D;
pub use uniform::Grid2D;

use crate::{
    array::{Array1D, Array2D, ValuesIrregular},
    error::{GridError, Result},
};
use ndarray::prelude::*;
use std::borrow::Cow;

/// Raw numeric output of a function evaluated at a set of (y, x) coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalResult {
    /// One value per coordinate.
    Scalar(Array1<f64>),
    /// One (y, x) pair per coordinate, stored as an `[n, 2]` array.
    Vector(Array2<f64>),
}

impl EvalResult {
    /// Wraps an `[n, components]` array, as a scalar result if `scalar` is set.
    pub fn from_columns(columns: Array2<f64>, scalar: bool) -> Self {
        if scalar {
            Self::Scalar(columns.remove_axis(Axis(1)))
        } else {
            Self::Vector(columns)
        }
    }

    /// Number of coordinates the result covers.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(values) => values.len(),
            Self::Vector(values) => values.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Views the result as an `[n, components]` array.
    pub fn columns(&self) -> ArrayView2<f64> {
        match self {
            Self::Scalar(values) => values.view().insert_axis(Axis(1)),
            Self::Vector(values) => values.view(),
        }
    }

    /// Returns the scalar values, failing for vector results.
    pub fn into_scalar(self) -> Result<Array1<f64>> {
        match self {
            Self::Scalar(values) => Ok(values),
            Self::Vector(values) => Err(GridError::NotScalar(values.ncols())),
        }
    }

    /// Checks that the result has one entry per coordinate of a grid of
    /// `expected` coordinates, and that vector entries are (y, x) pairs.
    pub fn verify_len(&self, expected: usize) -> Result<()> {
        if let Self::Vector(values) = self {
            if values.ncols() != 2 {
                return Err(GridError::NotCoordinates(values.ncols()));
            }
        }
        if self.len() == expected {
            Ok(())
        } else {
            Err(GridError::ResultLength {
                expected,
                found: self.len(),
            })
        }
    }
}

impl From<Array1<f64>> for EvalResult {
    fn from(values: Array1<f64>) -> Self {
        Self::Scalar(values)
    }
}

impl From<Array2<f64>> for EvalResult {
    fn from(values: Array2<f64>) -> Self {
        Self::Vector(values)
    }
}

/// An evaluation result rebuilt with the topology of the grid it came from.
#[derive(Clone, Debug, PartialEq)]
pub enum Structure {
    /// Scalar values over a masked 2D grid.
    Array2D(Array2D),
    /// Vector values over a masked 2D grid.
    Grid2D(Grid2D),
    /// Scalar values along a 1D line.
    Array1D(Array1D),
    /// Scalar values at irregular coordinates.
    ValuesIrregular(ValuesIrregular),
    /// Vector values at irregular coordinates.
    Grid2DIrregular(Grid2DIrregular),
    /// Result of a pass-through evaluation on an unstructured coordinate array.
    Raw(EvalResult),
}

impl Structure {
    /// Flattens the structure back into the raw numeric result it holds.
    pub fn to_eval_result(&self) -> EvalResult {
        match self {
            Self::Array2D(array) => EvalResult::Scalar(array.slim().to_owned()),
            Self::Grid2D(grid) => EvalResult::Vector(grid.slim().clone()),
            Self::Array1D(array) => EvalResult::Scalar(array.slim().to_owned()),
            Self::ValuesIrregular(values) => EvalResult::Scalar(values.slim().to_owned()),
            Self::Grid2DIrregular(grid) => EvalResult::Vector(grid.slim().clone()),
            Self::Raw(result) => result.clone(),
        }
    }

    /// Bins masked 2D structures down to one value per pixel. Other
    /// structures are returned unchanged.
    pub fn binned(self) -> Self {
        match self {
            Self::Array2D(array) => Self::Array2D(array.binned()),
            Self::Grid2D(grid) => Self::Grid2D(grid.binned()),
            other => other,
        }
    }

    pub fn as_array_2d(&self) -> Option<&Array2D> {
        match self {
            Self::Array2D(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_grid_2d(&self) -> Option<&Grid2D> {
        match self {
            Self::Grid2D(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn as_array_1d(&self) -> Option<&Array1D> {
        match self {
            Self::Array1D(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_values_irregular(&self) -> Option<&ValuesIrregular> {
        match self {
            Self::ValuesIrregular(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_grid_2d_irregular(&self) -> Option<&Grid2DIrregular> {
        match self {
            Self::Grid2DIrregular(grid) => Some(grid),
            _ => None,
        }
    }
}

/// An unstructured `[n, 2]` array of (y, x) coordinates with no mask or grouping.
#[derive(Clone, Debug, PartialEq)]
pub struct RawGrid {
    coords: Array2<f64>,
    transformed: bool,
}

impl RawGrid {
    pub fn new(coords: Array2<f64>) -> Self {
        Self {
            coords,
            transformed: false,
        }
    }

    pub fn slim(&self) -> &Array2<f64> {
        &self.coords
    }

    pub fn is_transformed(&self) -> bool {
        self.transformed
    }
}

/// Any of the coordinate representations a function can be evaluated on.
#[derive(Clone, Debug, PartialEq)]
pub enum GridLike {
    Uniform(Grid2D),
    Iterate(Grid2DIterate),
    Interpolate(Grid2DInterpolate),
    Irregular(Grid2DIrregular),
    Radial(Grid1D),
    Raw(RawGrid),
}

impl GridLike {
    /// Returns the `[n, 2]` (y, x) coordinates a function receiving this grid
    /// works on. A 1D grid is projected onto the positive x-axis.
    pub fn slim(&self) -> Cow<'_, Array2<f64>> {
        match self {
            Self::Uniform(grid) => Cow::Borrowed(grid.slim()),
            Self::Iterate(grid) => Cow::Borrowed(grid.grid().slim()),
            Self::Interpolate(grid) => Cow::Borrowed(grid.grid().slim()),
            Self::Irregular(grid) => Cow::Borrowed(grid.slim()),
            Self::Radial(grid) => Cow::Owned(grid.project_to_radial_grid_2d(0.0).slim().clone()),
            Self::Raw(grid) => Cow::Borrowed(grid.slim()),
        }
    }

    /// Number of coordinates in the grid.
    pub fn len(&self) -> usize {
        match self {
            Self::Radial(grid) => grid.len(),
            _ => self.slim().nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sub size of masked grids, `None` for grids without a mask.
    pub fn sub_size(&self) -> Option<usize> {
        match self {
            Self::Uniform(grid) => Some(grid.mask().sub_size()),
            Self::Iterate(grid) => Some(grid.grid().mask().sub_size()),
            Self::Interpolate(grid) => Some(grid.grid().mask().sub_size()),
            Self::Radial(grid) => Some(grid.sub_size()),
            Self::Irregular(_) | Self::Raw(_) => None,
        }
    }

    /// Whether the coordinates are already in a profile's reference frame.
    pub fn is_transformed(&self) -> bool {
        match self {
            Self::Uniform(grid) => grid.is_transformed(),
            Self::Irregular(grid) => grid.is_transformed(),
            Self::Raw(grid) => grid.is_transformed(),
            Self::Iterate(_) | Self::Interpolate(_) | Self::Radial(_) => false,
        }
    }

    /// Short name of the variant, for log messages.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Uniform(_) => "Grid2D",
            Self::Iterate(_) => "Grid2DIterate",
            Self::Interpolate(_) => "Grid2DInterpolate",
            Self::Irregular(_) => "Grid2DIrregular",
            Self::Radial(_) => "Grid1D",
            Self::Raw(_) => "raw coordinates",
        }
    }

    /// Creates a grid of the same variant holding the given coordinates,
    /// tagged as transformed into a reference frame. Variants without a
    /// transformed form become raw transformed coordinates.
    pub fn to_transformed(&self, coords: Array2<f64>) -> Self {
        match self {
            Self::Uniform(grid) => Self::Uniform(grid.with_slim(coords, true)),
            Self::Irregular(grid) => Self::Irregular(grid.with_slim(coords, true)),
            _ => Self::Raw(RawGrid {
                coords,
                transformed: true,
            }),
        }
    }

    /// Creates a grid of the same variant and transformed state holding the
    /// given coordinates, which must have the same length.
    pub fn with_coordinates(&self, coords: Array2<f64>) -> Self {
        let transformed = self.is_transformed();
        match self {
            Self::Uniform(grid) => Self::Uniform(grid.with_slim(coords, transformed)),
            Self::Irregular(grid) => Self::Irregular(grid.with_slim(coords, transformed)),
            _ => Self::Raw(RawGrid {
                coords,
                transformed,
            }),
        }
    }
}

impl From<Grid2D> for GridLike {
    fn from(grid: Grid2D) -> Self {
        Self::Uniform(grid)
    }
}

impl From<Grid2DIterate> for GridLike {
    fn from(grid: Grid2DIterate) -> Self {
        Self::Iterate(grid)
    }
}

impl From<Grid2DInterpolate> for GridLike {
    fn from(grid: Grid2DInterpolate) -> Self {
        Self::Interpolate(grid)
    }
}

impl From<Grid2DIrregular> for GridLike {
    fn from(grid: Grid2DIrregular) -> Self {
        Self::Irregular(grid)
    }
}

impl From<Grid1D> for GridLike {
    fn from(grid: Grid1D) -> Self {
        Self::Radial(grid)
    }
}

impl From<Array2<f64>> for GridLike {
    fn from(coords: Array2<f64>) -> Self {
        Self::Raw(RawGrid::new(coords))
    }
}
