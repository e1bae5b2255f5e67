//! The `skygrid` crate evaluates functions of (y, x) coordinates on masked,
//! iterative, interpolated, irregular and radial grids, and rebuilds the raw
//! results into structures matching the grid they were evaluated on.
pub mod array;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod kernel;
pub mod mask;
pub mod profile;
pub mod transform;
