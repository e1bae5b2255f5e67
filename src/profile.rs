//! Capabilities of the profile objects whose functions are evaluated on grids.

use crate::{
    geometry::{self, In2D, PointTransformation2, ToReferenceFrame2},
    grid::GridLike,
};
use ndarray::prelude::*;

/// Defines the geometry a profile exposes to the grid wrappers.
///
/// Only `profile_type` is required. A profile without a centre is treated as
/// centred on the origin, and one without an angle as unrotated.
pub trait GeometryProfile {
    /// Name identifying the kind of profile, used to look up configuration.
    fn profile_type(&self) -> &str;

    fn centre(&self) -> Option<In2D<f64>> {
        None
    }

    /// Position angle in degrees, anticlockwise from the positive x-axis.
    fn angle(&self) -> Option<f64> {
        None
    }

    /// Returns the grid translated to the profile centre and rotated by the
    /// profile angle, tagged as transformed.
    fn transform_grid_to_reference_frame(&self, grid: &GridLike) -> GridLike {
        let transformation = ToReferenceFrame2::new(
            self.centre().unwrap_or_else(|| In2D::same(0.0)),
            self.angle().unwrap_or(0.0),
        );
        grid.to_transformed(transformation.transform_grid(grid.slim().view()))
    }

    /// Returns the distance of every coordinate from the origin of the frame
    /// the grid is expressed in.
    fn grid_to_grid_radii(&self, grid: &GridLike) -> Array1<f64> {
        geometry::radii_from_centre(grid.slim().view(), &In2D::same(0.0))
    }
}

/// A circularly symmetric profile.
#[derive(Clone, Debug, PartialEq)]
pub struct SphericalProfile {
    centre: In2D<f64>,
}

impl SphericalProfile {
    pub const PROFILE_TYPE: &'static str = "SphericalProfile";

    pub fn new(centre: In2D<f64>) -> Self {
        Self { centre }
    }
}

impl GeometryProfile for SphericalProfile {
    fn profile_type(&self) -> &str {
        Self::PROFILE_TYPE
    }

    fn centre(&self) -> Option<In2D<f64>> {
        Some(self.centre)
    }
}

/// A profile with a centre and a major axis rotated by a position angle.
#[derive(Clone, Debug, PartialEq)]
pub struct EllipticalProfile {
    centre: In2D<f64>,
    angle: f64,
}

impl EllipticalProfile {
    pub const PROFILE_TYPE: &'static str = "EllipticalProfile";

    pub fn new(centre: In2D<f64>, angle: f64) -> Self {
        Self { centre, angle }
    }
}

impl GeometryProfile for EllipticalProfile {
    fn profile_type(&self) -> &str {
        Self::PROFILE_TYPE
    }

    fn centre(&self) -> Option<In2D<f64>> {
        Some(self.centre)
    }

    fn angle(&self) -> Option<f64> {
        Some(self.angle)
    }
}
