//! Geometric utility objects for (y, x) coordinates.

use ndarray::prelude::*;
use ndarray::Zip;
use std::{
    fmt,
    ops::{Index, IndexMut},
};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "for-testing")]
use approx::{AbsDiffEq, RelativeEq};

/// Denotes the y- or x-dimension.
///
/// Coordinates are stored with y first, so `Y` maps to column 0 of a
/// coordinate array and `X` to column 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dim2 {
    Y = 0,
    X = 1,
}

use Dim2::{X, Y};

/// Represents any quantity with a y- and an x-component.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct In2D<T>([T; 2]);

impl<T> In2D<T> {
    /// Creates a new 2D quantity given the y- and x-components.
    pub fn new(y: T, x: T) -> Self {
        Self([y, x])
    }

    /// Creates a new 2D quantity with the given value copied into both components.
    pub fn same(a: T) -> Self
    where
        T: Copy,
    {
        Self([a, a])
    }
}

impl<T> Index<Dim2> for In2D<T> {
    type Output = T;
    fn index(&self, dim: Dim2) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<T> IndexMut<Dim2> for In2D<T> {
    fn index_mut(&mut self, dim: Dim2) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<T> From<(T, T)> for In2D<T> {
    fn from((y, x): (T, T)) -> Self {
        Self::new(y, x)
    }
}

impl<T: fmt::Display> fmt::Display for In2D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        fmt::Display::fmt(&self[Y], f)?;
        f.write_str(", ")?;
        fmt::Display::fmt(&self[X], f)?;
        f.write_str(")")
    }
}

#[cfg(feature = "for-testing")]
impl<T> AbsDiffEq for In2D<T>
where
    T: AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = <T as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        T::abs_diff_eq(&self[Y], &other[Y], epsilon) && T::abs_diff_eq(&self[X], &other[X], epsilon)
    }
}

#[cfg(feature = "for-testing")]
impl<T> RelativeEq for In2D<T>
where
    T: RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        T::relative_eq(&self[Y], &other[Y], epsilon, max_relative)
            && T::relative_eq(&self[X], &other[X], epsilon, max_relative)
    }
}

/// Defines the properties of a transformation of (y, x) points.
pub trait PointTransformation2: Sync {
    /// Returns the transformed version of the given point.
    fn transform(&self, point: &In2D<f64>) -> In2D<f64>;

    /// Returns a new `[n, 2]` coordinate array with every row transformed.
    fn transform_grid(&self, grid: ArrayView2<f64>) -> Array2<f64> {
        let mut transformed = Array2::zeros(grid.raw_dim());
        Zip::from(transformed.rows_mut())
            .and(grid.rows())
            .par_for_each(|mut transformed_point, point| {
                let result = self.transform(&In2D::new(point[0], point[1]));
                transformed_point[0] = result[Y];
                transformed_point[1] = result[X];
            });
        transformed
    }
}

/// Transformation from the cartesian frame into a frame centred on `centre`
/// and rotated anticlockwise by `angle` degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct ToReferenceFrame2 {
    centre: In2D<f64>,
    angle_rad: f64,
}

impl ToReferenceFrame2 {
    pub fn new(centre: In2D<f64>, angle_deg: f64) -> Self {
        Self {
            centre,
            angle_rad: angle_deg.to_radians(),
        }
    }
}

impl PointTransformation2 for ToReferenceFrame2 {
    fn transform(&self, point: &In2D<f64>) -> In2D<f64> {
        let dy = point[Y] - self.centre[Y];
        let dx = point[X] - self.centre[X];
        let radius = dy.hypot(dx);
        let theta = dy.atan2(dx) - self.angle_rad;
        In2D::new(radius * theta.sin(), radius * theta.cos())
    }
}

/// Inverse of [`ToReferenceFrame2`]: rotates back by `angle` degrees and
/// translates the origin to `centre`.
#[derive(Clone, Debug, PartialEq)]
pub struct FromReferenceFrame2 {
    centre: In2D<f64>,
    cos_angle: f64,
    sin_angle: f64,
}

impl FromReferenceFrame2 {
    pub fn new(centre: In2D<f64>, angle_deg: f64) -> Self {
        let angle_rad = angle_deg.to_radians();
        Self {
            centre,
            cos_angle: angle_rad.cos(),
            sin_angle: angle_rad.sin(),
        }
    }
}

impl PointTransformation2 for FromReferenceFrame2 {
    fn transform(&self, point: &In2D<f64>) -> In2D<f64> {
        In2D::new(
            point[X] * self.sin_angle + point[Y] * self.cos_angle + self.centre[Y],
            point[X] * self.cos_angle - point[Y] * self.sin_angle + self.centre[X],
        )
    }
}

/// Computes the distance of every (y, x) row of the grid from the given centre.
pub fn radii_from_centre(grid: ArrayView2<f64>, centre: &In2D<f64>) -> Array1<f64> {
    grid.rows()
        .into_iter()
        .map(|point| (point[0] - centre[Y]).hypot(point[1] - centre[X]))
        .collect()
}
