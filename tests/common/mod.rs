use lazy_static::lazy_static;
use skygrid::{
    config::RadialMinimumConfig,
    geometry::In2D,
    grid::{EvalResult, GridLike},
    mask::Mask2D,
    profile::GeometryProfile,
};

#[macro_export]
macro_rules! def_test {
    (fn $name:ident $test_body:block) => {
        #[test]
        fn $name() {
            let _test = common::Test::new(stringify!($name));
            $test_body
        }
    };
}

lazy_static! {
    pub static ref CONFIG: RadialMinimumConfig = RadialMinimumConfig::default()
        .with_radial_minimum(MockProfile::PROFILE_TYPE, MockProfile::RADIAL_MINIMUM);
}

/// Profile with freely optional centre and angle.
#[derive(Clone, Debug, Default)]
pub struct MockProfile {
    centre: Option<In2D<f64>>,
    angle: Option<f64>,
}

impl MockProfile {
    pub const PROFILE_TYPE: &'static str = "MockProfile";
    pub const RADIAL_MINIMUM: f64 = 0.5;

    pub fn new(centre: Option<(f64, f64)>, angle: Option<f64>) -> Self {
        Self {
            centre: centre.map(In2D::from),
            angle,
        }
    }
}

impl GeometryProfile for MockProfile {
    fn profile_type(&self) -> &str {
        Self::PROFILE_TYPE
    }

    fn centre(&self) -> Option<In2D<f64>> {
        self.centre
    }

    fn angle(&self) -> Option<f64> {
        self.angle
    }
}

#[derive(Debug, Clone)]
pub struct Test;

impl Test {
    pub fn new(name: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        log::debug!("Running {}", name);
        Self
    }
}

pub fn square_mask(size: usize, pixel_scale: f64, sub_size: usize) -> Mask2D {
    Mask2D::unmasked((size, size), In2D::same(pixel_scale), sub_size).unwrap()
}

pub fn y_coordinates<P: ?Sized>(_: &P, grid: &GridLike) -> EvalResult {
    EvalResult::Scalar(grid.slim().column(0).to_owned())
}

pub fn x_coordinates<P: ?Sized>(_: &P, grid: &GridLike) -> EvalResult {
    EvalResult::Scalar(grid.slim().column(1).to_owned())
}

pub fn y_plus_x<P: ?Sized>(_: &P, grid: &GridLike) -> EvalResult {
    let coords = grid.slim();
    EvalResult::Scalar(&coords.column(0) + &coords.column(1))
}

pub fn doubled_coordinates<P: ?Sized>(_: &P, grid: &GridLike) -> EvalResult {
    EvalResult::Vector(grid.slim().mapv(|coord| 2.0 * coord))
}
