//! Scalar values at irregular, optionally grouped, coordinates.

use crate::error::{GridError, Result};
use ndarray::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A partition of a flat sequence into consecutive groups.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Grouping {
    group_sizes: Vec<usize>,
}

impl Grouping {
    pub fn new(group_sizes: Vec<usize>) -> Self {
        Self { group_sizes }
    }

    pub fn group_sizes(&self) -> &[usize] {
        &self.group_sizes
    }

    /// Total number of elements covered by the grouping.
    pub fn total(&self) -> usize {
        self.group_sizes.iter().sum()
    }

    /// Checks that the grouping covers exactly `length` elements.
    pub fn verify_covers(&self, length: usize) -> Result<()> {
        if self.total() == length {
            Ok(())
        } else {
            Err(GridError::GroupingMismatch {
                grouped: self.total(),
                found: length,
            })
        }
    }

    /// Splits the given flat sequence into groups, keeping the original order.
    pub fn split<T: Clone>(&self, flat: &[T]) -> Vec<Vec<T>> {
        let mut start = 0;
        self.group_sizes
            .iter()
            .map(|&size| {
                let group = flat[start..start + size].to_vec();
                start += size;
                group
            })
            .collect()
    }
}

/// Scalar values evaluated at the coordinates of an irregular grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ValuesIrregular {
    values: Array1<f64>,
    grouping: Option<Grouping>,
}

impl ValuesIrregular {
    /// Wraps the given flat values, optionally partitioned by a grouping.
    pub fn new(values: Array1<f64>, grouping: Option<Grouping>) -> Result<Self> {
        if let Some(grouping) = &grouping {
            grouping.verify_covers(values.len())?;
        }
        Ok(Self { values, grouping })
    }

    pub fn slim(&self) -> ArrayView1<f64> {
        self.values.view()
    }

    pub fn grouping(&self) -> Option<&Grouping> {
        self.grouping.as_ref()
    }

    /// Returns the values as a list of groups. Ungrouped values form a single group.
    pub fn in_groups(&self) -> Vec<Vec<f64>> {
        let flat = self.values.to_vec();
        match &self.grouping {
            Some(grouping) => grouping.split(&flat),
            None => vec![flat],
        }
    }

    pub fn into_slim(self) -> Array1<f64> {
        self.values
    }
}
