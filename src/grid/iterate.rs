//! Grids that refine their sub size pixel by pixel until a fractional accuracy is met.

use super::{uniform::Grid2D, EvalResult, GridLike, Structure};
use crate::{
    error::{GridError, Result},
    mask::Mask2D,
};
use ndarray::prelude::*;
use rayon::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A uniform grid whose evaluations are iteratively refined over increasing sub sizes.
///
/// A function is first evaluated at the smallest sub size in `sub_steps`. It
/// is then re-evaluated at each following sub size, but only for pixels whose
/// binned value has not yet changed by less than the fractional accuracy
/// between two consecutive sub sizes. Pixels that converge keep the value
/// from the sub size at which they converged, and pixels that never converge
/// take the value at the largest sub size.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Grid2DIterate {
    grid: Grid2D,
    fractional_accuracy: f64,
    sub_steps: Vec<usize>,
}

impl Grid2DIterate {
    pub const DEFAULT_FRACTIONAL_ACCURACY: f64 = 0.9999;
    pub const DEFAULT_SUB_STEPS: [usize; 5] = [1, 2, 4, 8, 16];

    /// Creates a new iterative grid over the given mask, whose sub size is ignored.
    pub fn new(mask: Mask2D, fractional_accuracy: f64, sub_steps: Vec<usize>) -> Result<Self> {
        if !(fractional_accuracy > 0.0 && fractional_accuracy <= 1.0) {
            return Err(GridError::InvalidFractionalAccuracy(fractional_accuracy));
        }
        let strictly_increasing = sub_steps.windows(2).all(|pair| pair[0] < pair[1]);
        if sub_steps.is_empty() || sub_steps[0] == 0 || !strictly_increasing {
            return Err(GridError::InvalidSubSteps(sub_steps));
        }
        Ok(Self {
            grid: Grid2D::from_mask(mask.with_sub_size(1)),
            fractional_accuracy,
            sub_steps,
        })
    }

    /// Creates a new iterative grid with the default accuracy and sub steps.
    pub fn from_mask(mask: Mask2D) -> Self {
        Self {
            grid: Grid2D::from_mask(mask.with_sub_size(1)),
            fractional_accuracy: Self::DEFAULT_FRACTIONAL_ACCURACY,
            sub_steps: Self::DEFAULT_SUB_STEPS.to_vec(),
        }
    }

    /// Returns the underlying grid of pixel centres.
    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    pub fn fractional_accuracy(&self) -> f64 {
        self.fractional_accuracy
    }

    pub fn sub_steps(&self) -> &[usize] {
        &self.sub_steps
    }

    /// Largest sub size the refinement can reach.
    pub fn max_sub_size(&self) -> usize {
        // Sub steps are validated to be non-empty and increasing.
        self.sub_steps[self.sub_steps.len() - 1]
    }

    /// Evaluates `func` with iterative sub-size refinement and rebuilds the
    /// binned result as an `Array2D` or `Grid2D` over the pixel mask.
    ///
    /// Failing to converge is not an error; the largest sub size is used for
    /// any pixel that never reaches the accuracy.
    pub fn iterated_result_from_func<P, F>(&self, profile: &P, func: &F) -> Result<Structure>
    where
        P: ?Sized,
        F: Fn(&P, &GridLike) -> EvalResult,
    {
        let mask = self.grid.mask();
        let n_pixels = mask.pixels_in_mask();

        let (mut lower, is_scalar) =
            binned_result_at_sub_size(profile, func, &mask.with_sub_size(self.sub_steps[0]))?;
        let mut iterated = lower.clone();
        let mut unconverged: Vec<usize> = (0..n_pixels).collect();

        for &sub_size in &self.sub_steps[1..] {
            if unconverged.is_empty() {
                break;
            }

            let mut selection = vec![false; n_pixels];
            for &pixel in &unconverged {
                selection[pixel] = true;
            }
            let sub_mask = mask.with_slim_selection(&selection).with_sub_size(sub_size);
            let (higher, _) = binned_result_at_sub_size(profile, func, &sub_mask)?;

            let converged: Vec<bool> = unconverged
                .par_iter()
                .enumerate()
                .map(|(row, &pixel)| {
                    lower
                        .row(pixel)
                        .iter()
                        .zip(higher.row(row))
                        .all(|(&lower_value, &higher_value)| {
                            fractional_accuracy_reached(
                                lower_value,
                                higher_value,
                                self.fractional_accuracy,
                            )
                        })
                })
                .collect();

            for (row, &pixel) in unconverged.iter().enumerate() {
                iterated.row_mut(pixel).assign(&higher.row(row));
                lower.row_mut(pixel).assign(&higher.row(row));
            }

            let mut converged = converged.into_iter();
            unconverged.retain(|_| !converged.next().unwrap_or(false));

            log::debug!(
                "Sub size {}: {} of {} pixels still unconverged",
                sub_size,
                unconverged.len(),
                n_pixels
            );
        }

        if !unconverged.is_empty() && self.sub_steps.len() > 1 {
            log::warn!(
                "{} pixels did not reach fractional accuracy {}, using sub size {}",
                unconverged.len(),
                self.fractional_accuracy,
                self.max_sub_size()
            );
        }

        self.grid
            .structure_2d_from_result(EvalResult::from_columns(iterated, is_scalar))
    }
}

/// Evaluates `func` on the sub-gridded coordinates of the given mask and
/// bins the result to one row per unmasked pixel.
fn binned_result_at_sub_size<P, F>(profile: &P, func: &F, mask: &Mask2D) -> Result<(Array2<f64>, bool)>
where
    P: ?Sized,
    F: Fn(&P, &GridLike) -> EvalResult,
{
    let grid = GridLike::Uniform(Grid2D::from_mask(mask.clone()));
    let result = func(profile, &grid);
    result.verify_len(mask.sub_pixels_in_mask())?;
    Ok((mask.bin_sub_values(result.columns()), result.is_scalar()))
}

/// Whether two consecutive estimates of a value agree to the given
/// fractional accuracy. Estimates of opposite sign never agree.
fn fractional_accuracy_reached(lower: f64, higher: f64, fractional_accuracy: f64) -> bool {
    if lower == higher {
        return true;
    }
    if lower.signum() != higher.signum() {
        return false;
    }
    let (lower, higher) = (lower.abs(), higher.abs());
    lower.min(higher) / lower.max(higher) >= fractional_accuracy
}
