//! Scalar values structured like the grids they were evaluated on.

pub mod irregular;
pub mod one_d;
pub mod two_d;

pub use irregular::{Grouping, ValuesIrregular};
pub use one_d::Array1D;
pub use two_d::Array2D;
