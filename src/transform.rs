//! Wrappers that prepare grid coordinates before a profile function sees them.

use crate::{
    config::RadialMinimumConfig,
    error::{GridError, Result},
    grid::GridLike,
    profile::GeometryProfile,
};
use ndarray::{prelude::*, Zip};

/// Calls `func` with the grid in the profile's reference frame.
///
/// Grids already tagged as transformed are passed on as they are, so nested
/// or repeated application never transforms twice.
pub fn transform<P, F, R>(profile: &P, grid: &GridLike, func: F) -> R
where
    P: GeometryProfile + ?Sized,
    F: FnOnce(&P, &GridLike) -> R,
{
    if grid.is_transformed() {
        func(profile, grid)
    } else {
        let transformed = profile.transform_grid_to_reference_frame(grid);
        func(profile, &transformed)
    }
}

/// Moves coordinates that lie radially closer to the origin than a minimum
/// radius out to that radius, keeping their direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialMinimumRelocation {
    radial_minimum: f64,
}

impl RadialMinimumRelocation {
    pub fn new(radial_minimum: f64) -> Self {
        Self { radial_minimum }
    }

    /// Creates a relocation using the configured minimum of the given profile type.
    pub fn from_config(config: &RadialMinimumConfig, profile_type: &str) -> Result<Self> {
        Ok(Self::new(config.radial_minimum_for(profile_type)?))
    }

    pub fn radial_minimum(&self) -> f64 {
        self.radial_minimum
    }

    /// Returns a grid of the same variant with relocated coordinates, using
    /// the profile's notion of radius. The profile must give one radius
    /// per coordinate.
    pub fn relocated_grid<P>(&self, profile: &P, grid: &GridLike) -> Result<GridLike>
    where
        P: GeometryProfile + ?Sized,
    {
        let radii = profile.grid_to_grid_radii(grid);
        if radii.len() != grid.len() {
            return Err(GridError::ResultLength {
                expected: grid.len(),
                found: radii.len(),
            });
        }
        Ok(grid.with_coordinates(relocate_coordinates(
            grid.slim().view(),
            radii.view(),
            self.radial_minimum,
        )))
    }

    /// Calls `func` with the relocated grid.
    pub fn evaluate<P, F, R>(&self, profile: &P, grid: &GridLike, func: F) -> Result<R>
    where
        P: GeometryProfile + ?Sized,
        F: FnOnce(&P, &GridLike) -> R,
    {
        Ok(func(profile, &self.relocated_grid(profile, grid)?))
    }
}

/// Calls `func` with the grid relocated to the radial minimum configured for
/// the profile's type.
pub fn relocate_to_radial_minimum<P, F, R>(
    profile: &P,
    grid: &GridLike,
    config: &RadialMinimumConfig,
    func: F,
) -> Result<R>
where
    P: GeometryProfile + ?Sized,
    F: FnOnce(&P, &GridLike) -> R,
{
    let relocation = RadialMinimumRelocation::from_config(config, profile.profile_type())?;
    relocation.evaluate(profile, grid, func)
}

/// Scales every coordinate with a radius below `radial_minimum` out to
/// exactly `radial_minimum`. Components left undefined by a zero radius are
/// set to `radial_minimum` itself. The number and order of coordinates never change.
pub fn relocate_coordinates(
    coords: ArrayView2<f64>,
    radii: ArrayView1<f64>,
    radial_minimum: f64,
) -> Array2<f64> {
    let mut relocated = coords.to_owned();
    Zip::from(relocated.rows_mut())
        .and(radii)
        .par_for_each(|mut point, &radius| {
            if radius < radial_minimum {
                point.mapv_inplace(|coord| {
                    let scaled = (coord / radius) * radial_minimum;
                    if scaled.is_nan() {
                        radial_minimum
                    } else {
                        scaled
                    }
                });
            }
        });
    relocated
}
