//! Grids that evaluate functions on a coarser lattice and interpolate the results.

use super::{uniform::Grid2D, EvalResult, GridLike, Structure};
use crate::{
    error::{GridError, Result},
    geometry::{
        Dim2::{X, Y},
        In2D,
    },
    mask::Mask2D,
};
use ndarray::prelude::*;
use rayon::prelude::*;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Precomputed bilinear weights mapping values at lattice nodes onto a set of coordinates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
struct BilinearWeights {
    corners: Vec<[usize; 4]>,
    weights: Vec<[f64; 4]>,
}

impl BilinearWeights {
    /// Computes the weights of every coordinate relative to the enclosing
    /// cell of a fully unmasked lattice.
    fn new(lattice_mask: &Mask2D, coords: ArrayView2<f64>) -> Self {
        let (ny, nx) = lattice_mask.shape_native();
        let top_left = lattice_mask.pixel_centre(0, 0);
        let spacing = lattice_mask.pixel_scales();

        let (corners, weights): (Vec<_>, Vec<_>) = coords
            .rows()
            .into_iter()
            .map(|point| {
                let fy = (top_left[Y] - point[0]) / spacing[Y];
                let fx = (point[1] - top_left[X]) / spacing[X];
                let i = (fy.floor().max(0.0) as usize).min(ny - 2);
                let j = (fx.floor().max(0.0) as usize).min(nx - 2);
                let ty = fy - i as f64;
                let tx = fx - j as f64;
                (
                    [i * nx + j, i * nx + j + 1, (i + 1) * nx + j, (i + 1) * nx + j + 1],
                    [
                        (1.0 - ty) * (1.0 - tx),
                        (1.0 - ty) * tx,
                        ty * (1.0 - tx),
                        ty * tx,
                    ],
                )
            })
            .unzip();
        Self { corners, weights }
    }

    /// Interpolates `[n_lattice, components]` node values onto the coordinates.
    fn interpolate(&self, lattice_values: ArrayView2<f64>) -> Array2<f64> {
        let mut interpolated = Array2::zeros((self.corners.len(), lattice_values.ncols()));
        interpolated
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(self.corners.par_iter())
            .zip(self.weights.par_iter())
            .for_each(|((mut value, corners), weights)| {
                for (&corner, &weight) in corners.iter().zip(weights) {
                    value.scaled_add(weight, &lattice_values.row(corner));
                }
            });
        interpolated
    }
}

/// A uniform grid whose evaluations are computed on a coarser, fully
/// unmasked lattice covering the grid, then bilinearly interpolated.
///
/// The lattice extends one lattice pixel beyond the grid extent on every side.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Grid2DInterpolate {
    grid: Grid2D,
    lattice: Grid2D,
    weights: BilinearWeights,
}

impl Grid2DInterpolate {
    /// Creates an interpolation grid over the given mask, with lattice pixel
    /// scales no finer than the mask's.
    pub fn new(mask: Mask2D, pixel_scales_interp: In2D<f64>) -> Result<Self> {
        let grid = Grid2D::from_mask(mask);
        let grid_scales = *grid.pixel_scales();
        if pixel_scales_interp[Y] < grid_scales[Y] || pixel_scales_interp[X] < grid_scales[X] {
            return Err(GridError::InterpolationResolution {
                interp_y: pixel_scales_interp[Y],
                interp_x: pixel_scales_interp[X],
                grid_y: grid_scales[Y],
                grid_x: grid_scales[X],
            });
        }

        let [x_min, x_max, y_min, y_max] = grid.extent();
        let lattice_shape = (
            ((y_max - y_min) / pixel_scales_interp[Y]).ceil() as usize + 3,
            ((x_max - x_min) / pixel_scales_interp[X]).ceil() as usize + 3,
        );
        let lattice_origin = In2D::new(0.5 * (y_min + y_max), 0.5 * (x_min + x_max));
        let lattice_mask = Mask2D::from_array(
            Array2::from_elem(lattice_shape, false),
            pixel_scales_interp,
            lattice_origin,
            1,
        )?;

        let weights = BilinearWeights::new(&lattice_mask, grid.slim().view());
        log::debug!(
            "Interpolating {} coordinates from a {}x{} lattice",
            grid.len(),
            lattice_shape.0,
            lattice_shape.1
        );

        Ok(Self {
            grid,
            lattice: Grid2D::from_mask(lattice_mask),
            weights,
        })
    }

    /// Returns the full-resolution grid results are interpolated onto.
    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    /// Returns the coarse lattice functions are evaluated on.
    pub fn lattice(&self) -> &Grid2D {
        &self.lattice
    }

    pub fn pixel_scales_interp(&self) -> &In2D<f64> {
        self.lattice.pixel_scales()
    }

    /// Evaluates `func` on the lattice and interpolates the result onto the
    /// full grid, rebuilt as an `Array2D` or `Grid2D`.
    pub fn result_from_func<P, F>(&self, profile: &P, func: &F) -> Result<Structure>
    where
        P: ?Sized,
        F: Fn(&P, &GridLike) -> EvalResult,
    {
        let lattice_result = func(profile, &GridLike::Uniform(self.lattice.clone()));
        self.grid
            .structure_2d_from_result(self.interpolated(&lattice_result)?)
    }

    /// Evaluates a list-valued `func` on the lattice and interpolates every
    /// element onto the full grid.
    pub fn result_list_from_func<P, F>(&self, profile: &P, func: &F) -> Result<Vec<Structure>>
    where
        P: ?Sized,
        F: Fn(&P, &GridLike) -> Vec<EvalResult>,
    {
        let lattice_results = func(profile, &GridLike::Uniform(self.lattice.clone()));
        let interpolated = lattice_results
            .iter()
            .map(|lattice_result| self.interpolated(lattice_result))
            .collect::<Result<Vec<_>>>()?;
        self.grid.structure_2d_list_from_result_list(interpolated)
    }

    fn interpolated(&self, lattice_result: &EvalResult) -> Result<EvalResult> {
        lattice_result.verify_len(self.lattice.len())?;
        Ok(EvalResult::from_columns(
            self.weights.interpolate(lattice_result.columns()),
            lattice_result.is_scalar(),
        ))
    }
}
