//! Errors raised when constructing grids or dispatching evaluations over them.

use std::io;

/// Failure modes of grid construction, evaluation dispatch and configuration.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A wrapper that needs grid metadata to reconstruct its output received
    /// an unstructured coordinate array.
    #[error("cannot input an unstructured coordinate array to `{wrapper}`")]
    UnsupportedGridType { wrapper: &'static str },
    #[error("result has {found} entries but the grid has {expected} coordinates")]
    ResultLength { expected: usize, found: usize },
    #[error("expected one value per coordinate but the result has {0} components")]
    NotScalar(usize),
    #[error("expected (y, x) coordinates but the result has {0} components")]
    NotCoordinates(usize),
    #[error("sub steps must be non-empty, non-zero and strictly increasing, got {0:?}")]
    InvalidSubSteps(Vec<usize>),
    #[error("fractional accuracy must lie in (0, 1], got {0}")]
    InvalidFractionalAccuracy(f64),
    #[error("interpolation pixel scales ({interp_y}, {interp_x}) are finer than the grid pixel scales ({grid_y}, {grid_x})")]
    InterpolationResolution {
        interp_y: f64,
        interp_x: f64,
        grid_y: f64,
        grid_x: f64,
    },
    #[error("pixel scales ({0}, {1}) are not square")]
    PixelScalesNotSquare(f64, f64),
    #[error("invalid mask: {0}")]
    MaskShape(String),
    #[error("grouping covers {grouped} coordinates but {found} were given")]
    GroupingMismatch { grouped: usize, found: usize },
    #[error("kernel of shape ({0}, {1}) must have odd dimensions to be convolved")]
    EvenKernel(usize, usize),
    #[error("kernel rescale factor must be positive and finite, got {0}")]
    InvalidRescaleFactor(f64),
    #[error("no radial minimum configured for profile type `{profile_type}`")]
    MissingRadialMinimum { profile_type: String },
    #[error("failed to read configuration")]
    Io(#[from] io::Error),
    #[cfg(feature = "json")]
    #[error("failed to parse configuration")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GridError>;
