//! Evaluation of functions on any grid variant, with the raw result rebuilt
//! into a structure matching the grid the function was given.
//!
//! A wrapped function has the form `Fn(&P, &GridLike) -> EvalResult`, where
//! `P` is the object owning the function (typically a profile). Any further
//! arguments are captured by the closure.

use crate::{
    array::Array1D,
    error::{GridError, Result},
    geometry::In2D,
    grid::{EvalResult, Grid2D, GridLike, Structure},
    profile::GeometryProfile,
};

/// Evaluates `func` along a radial line through the profile and returns the
/// result as 1D values.
///
/// Masked 2D grids are projected onto a line starting at the profile centre
/// and running perpendicular to its major axis. A 1D grid is projected along
/// the same direction. Irregular grids are evaluated as they are and keep
/// their irregular structure. Raw coordinates carry no pixel scale to tag the
/// output with and are rejected.
pub fn grid_1d_to_structure<P, F>(profile: &P, grid: &GridLike, func: F) -> Result<Structure>
where
    P: GeometryProfile + ?Sized,
    F: FnOnce(&P, &GridLike) -> EvalResult,
{
    log::trace!("Evaluating on {} projected to 1D", grid.variant_name());

    let centre = profile.centre().unwrap_or_else(|| In2D::same(0.0));
    let angle = profile.angle().map_or(0.0, |angle| angle + 90.0);

    let grid_2d = match grid {
        GridLike::Uniform(grid_2d) => grid_2d,
        GridLike::Iterate(iterate) => iterate.grid(),
        GridLike::Interpolate(interpolate) => interpolate.grid(),
        GridLike::Irregular(irregular) => {
            return irregular.structure_2d_from_result(func(profile, grid))
        }
        GridLike::Radial(grid_1d) => {
            let projected = GridLike::Irregular(grid_1d.project_to_radial_grid_2d(angle));
            return values_1d(
                func(profile, &projected),
                grid_1d.len(),
                grid_1d.pixel_scale(),
            );
        }
        GridLike::Raw(_) => {
            return Err(GridError::UnsupportedGridType {
                wrapper: "grid_1d_to_structure",
            })
        }
    };

    let projected = GridLike::Irregular(grid_2d.grid_2d_radial_projected_from(centre, angle, false));
    values_1d(
        func(profile, &projected),
        projected.len(),
        grid_2d.pixel_scale()?,
    )
}

fn values_1d(result: EvalResult, expected_len: usize, pixel_scale: f64) -> Result<Structure> {
    result.verify_len(expected_len)?;
    Ok(Structure::Array1D(Array1D::manual_slim(
        result.into_scalar()?,
        pixel_scale,
    )))
}

/// Evaluates `func` on the grid as given and returns the result as 1D values.
///
/// For functions that already produce 1D output from 2D coordinates. The
/// output of masked 2D and 1D grids is tagged with their pixel scale, and
/// irregular grids keep their irregular structure. Raw coordinates are rejected.
pub fn grid_1d_output_structure<P, F>(profile: &P, grid: &GridLike, func: F) -> Result<Structure>
where
    P: ?Sized,
    F: FnOnce(&P, &GridLike) -> EvalResult,
{
    log::trace!("Evaluating 1D output on {}", grid.variant_name());

    let pixel_scale = match grid {
        GridLike::Uniform(grid_2d) => grid_2d.pixel_scale()?,
        GridLike::Iterate(grid_2d) => grid_2d.grid().pixel_scale()?,
        GridLike::Interpolate(grid_2d) => grid_2d.grid().pixel_scale()?,
        GridLike::Radial(grid_1d) => grid_1d.pixel_scale(),
        GridLike::Irregular(irregular) => {
            return irregular.structure_2d_from_result(func(profile, grid))
        }
        GridLike::Raw(_) => {
            return Err(GridError::UnsupportedGridType {
                wrapper: "grid_1d_output_structure",
            })
        }
    };
    Ok(Structure::Array1D(Array1D::manual_slim(
        func(profile, grid).into_scalar()?,
        pixel_scale,
    )))
}

/// Evaluates `func` on the grid and rebuilds the result with the grid's structure.
///
/// Iterative grids refine their sub size until the fractional accuracy is
/// met, and interpolation grids evaluate on their coarse lattice. A 1D grid
/// is evaluated on its unrotated 2D projection, with the result rebuilt
/// along the 1D grid. Raw coordinates are passed straight through, and the
/// result is returned without structure.
pub fn grid_2d_to_structure<P, F>(profile: &P, grid: &GridLike, func: F) -> Result<Structure>
where
    P: ?Sized,
    F: Fn(&P, &GridLike) -> EvalResult,
{
    log::trace!("Evaluating on {}", grid.variant_name());

    match grid {
        GridLike::Iterate(iterate) => iterate.iterated_result_from_func(profile, &func),
        GridLike::Interpolate(interpolate) => interpolate.result_from_func(profile, &func),
        GridLike::Irregular(irregular) => irregular.structure_2d_from_result(func(profile, grid)),
        GridLike::Uniform(grid_2d) => grid_2d.structure_2d_from_result(func(profile, grid)),
        GridLike::Radial(grid_1d) => {
            let projected = GridLike::Irregular(grid_1d.project_to_radial_grid_2d(0.0));
            grid_1d.structure_2d_from_result(func(profile, &projected))
        }
        GridLike::Raw(_) => Ok(Structure::Raw(func(profile, grid))),
    }
}

/// Evaluates a list-valued `func` on the grid and rebuilds every element of
/// the result with the grid's structure.
///
/// Dispatches like [`grid_2d_to_structure`], except for iterative grids:
/// those are evaluated once at their largest sub size and every element is
/// binned down to one value per pixel, without adaptive refinement.
pub fn grid_2d_to_structure_list<P, F>(
    profile: &P,
    grid: &GridLike,
    func: F,
) -> Result<Vec<Structure>>
where
    P: ?Sized,
    F: Fn(&P, &GridLike) -> Vec<EvalResult>,
{
    log::trace!("Evaluating list on {}", grid.variant_name());

    match grid {
        GridLike::Iterate(iterate) => {
            let sub_gridded = Grid2D::from_mask(
                iterate
                    .grid()
                    .mask()
                    .with_sub_size(iterate.max_sub_size()),
            );
            let results = func(profile, &GridLike::Uniform(sub_gridded.clone()));
            let binned = sub_gridded
                .structure_2d_list_from_result_list(results)?
                .into_iter()
                .map(|structure| structure.binned().to_eval_result())
                .collect();
            iterate.grid().structure_2d_list_from_result_list(binned)
        }
        GridLike::Interpolate(interpolate) => interpolate.result_list_from_func(profile, &func),
        GridLike::Irregular(irregular) => {
            irregular.structure_2d_list_from_result_list(func(profile, grid))
        }
        GridLike::Uniform(grid_2d) => grid_2d.structure_2d_list_from_result_list(func(profile, grid)),
        GridLike::Radial(grid_1d) => {
            let projected = GridLike::Irregular(grid_1d.project_to_radial_grid_2d(0.0));
            grid_1d.structure_2d_list_from_result_list(func(profile, &projected))
        }
        GridLike::Raw(_) => Ok(func(profile, grid)
            .into_iter()
            .map(Structure::Raw)
            .collect()),
    }
}
