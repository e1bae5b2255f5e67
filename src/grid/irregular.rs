//! Irregular, optionally grouped, sets of (y, x) coordinates.

use super::{EvalResult, Structure};
use crate::{
    array::{Grouping, ValuesIrregular},
    error::Result,
};
use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// An unstructured list of (y, x) coordinates with no mask.
///
/// The coordinates may be partitioned into consecutive groups, in which case
/// results evaluated on the grid are partitioned the same way.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Grid2DIrregular {
    coords: Array2<f64>,
    grouping: Option<Grouping>,
    transformed: bool,
}

impl Grid2DIrregular {
    /// Wraps an `[n, 2]` coordinate array without grouping.
    pub fn from_slim(coords: Array2<f64>) -> Self {
        Self {
            coords,
            grouping: None,
            transformed: false,
        }
    }

    /// Creates an ungrouped grid from a list of (y, x) pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        let mut coords = Array2::zeros((pairs.len(), 2));
        for (mut row, &(y, x)) in coords.rows_mut().into_iter().zip(pairs) {
            row[0] = y;
            row[1] = x;
        }
        Self::from_slim(coords)
    }

    /// Creates a grouped grid from a list of groups of (y, x) pairs.
    pub fn from_grouped(groups: &[Vec<(f64, f64)>]) -> Self {
        let flat: Vec<_> = groups.iter().flatten().copied().collect();
        Self {
            grouping: Some(Grouping::new(groups.iter().map(Vec::len).collect())),
            ..Self::from_pairs(&flat)
        }
    }

    pub(crate) fn with_slim(&self, coords: Array2<f64>, transformed: bool) -> Self {
        debug_assert_eq!(coords.nrows(), self.coords.nrows());
        Self {
            coords,
            grouping: self.grouping.clone(),
            transformed,
        }
    }

    pub fn slim(&self) -> &Array2<f64> {
        &self.coords
    }

    pub fn grouping(&self) -> Option<&Grouping> {
        self.grouping.as_ref()
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

    /// Returns the coordinates as (y, x) pairs partitioned by the grouping.
    /// Ungrouped coordinates form a single group.
    pub fn in_groups(&self) -> Vec<Vec<(f64, f64)>> {
        let pairs: Vec<_> = self
            .coords
            .rows()
            .into_iter()
            .map(|row| (row[0], row[1]))
            .collect();
        match &self.grouping {
            Some(grouping) => grouping.split(&pairs),
            None => vec![pairs],
        }
    }

    /// Rebuilds a raw result evaluated on this grid as [`ValuesIrregular`]
    /// (scalar results) or as a new irregular grid (vector results), both
    /// carrying this grid's grouping.
    pub fn structure_2d_from_result(&self, result: EvalResult) -> Result<Structure> {
        result.verify_len(self.len())?;
        Ok(match result {
            EvalResult::Scalar(values) => Structure::ValuesIrregular(ValuesIrregular::new(
                values,
                self.grouping.clone(),
            )?),
            EvalResult::Vector(coords) => Structure::Grid2DIrregular(Self {
                coords,
                grouping: self.grouping.clone(),
                transformed: false,
            }),
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
