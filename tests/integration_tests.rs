mod common;

use approx::assert_abs_diff_eq;
use common::{MockProfile, CONFIG};
use ndarray::prelude::*;
use skygrid::{
    dispatch::{
        grid_1d_output_structure, grid_1d_to_structure, grid_2d_to_structure,
        grid_2d_to_structure_list,
    },
    error::GridError,
    geometry::In2D,
    grid::{
        EvalResult, Grid1D, Grid2D, Grid2DInterpolate, Grid2DIrregular, Grid2DIterate, GridLike,
        Structure,
    },
    mask::Mask2D,
    transform::{relocate_to_radial_minimum, transform},
};
use std::sync::Mutex;

def_test!(
fn raw_coordinates_are_rejected_by_1d_wrappers {
    let profile = MockProfile::default();
    let raw = GridLike::from(array![[0.0, 1.0], [1.0, 0.0]]);

    assert!(matches!(
        grid_1d_to_structure(&profile, &raw, common::y_coordinates),
        Err(GridError::UnsupportedGridType { .. })
    ));
    assert!(matches!(
        grid_1d_output_structure(&profile, &raw, common::y_coordinates),
        Err(GridError::UnsupportedGridType { .. })
    ));
});

def_test!(
fn raw_coordinates_pass_through_2d_wrappers {
    let profile = MockProfile::default();
    let raw = GridLike::from(array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0]]);

    let structure = grid_2d_to_structure(&profile, &raw, common::y_plus_x).unwrap();
    assert_eq!(structure, Structure::Raw(EvalResult::Scalar(array![1.0, 1.0, 4.0])));

    let structures = grid_2d_to_structure_list(&profile, &raw, |profile, grid| {
        vec![
            common::y_plus_x(profile, grid),
            common::doubled_coordinates(profile, grid),
        ]
    })
    .unwrap();
    assert_eq!(structures.len(), 2);
    assert!(matches!(structures[1], Structure::Raw(EvalResult::Vector(_))));
});

def_test!(
fn uniform_grid_reconstruction_is_lossless {
    let profile = MockProfile::default();
    let mask = Mask2D::circular((7, 7), In2D::same(0.3), 0.8, In2D::same(0.0), 2).unwrap();
    let grid = GridLike::from(Grid2D::from_mask(mask.clone()));

    let structure = grid_2d_to_structure(&profile, &grid, common::y_plus_x).unwrap();
    let array = structure.as_array_2d().unwrap();
    assert_eq!(array.mask(), &mask);
    assert_eq!(structure.to_eval_result(), common::y_plus_x(&profile, &grid));

    let structure = grid_2d_to_structure(&profile, &grid, common::doubled_coordinates).unwrap();
    assert_eq!(
        structure.to_eval_result(),
        common::doubled_coordinates(&profile, &grid)
    );
});

def_test!(
fn grouped_irregular_results_are_partitioned_in_order {
    let profile = MockProfile::default();
    let grid = GridLike::from(Grid2DIrregular::from_grouped(&[
        vec![(1.0, 0.0), (2.0, 0.0)],
        vec![(3.0, 0.0), (4.0, 0.0), (5.0, 0.0)],
    ]));

    let structure = grid_2d_to_structure(&profile, &grid, common::y_coordinates).unwrap();
    let values = structure.as_values_irregular().unwrap();
    assert_eq!(
        values.in_groups(),
        vec![vec![1.0, 2.0], vec![3.0, 4.0, 5.0]]
    );

    let structure = grid_2d_to_structure(&profile, &grid, common::doubled_coordinates).unwrap();
    let coords = structure.as_grid_2d_irregular().unwrap();
    assert_eq!(coords.grouping().unwrap().group_sizes(), &[2, 3]);
    assert_eq!(coords.in_groups()[1], vec![(6.0, 0.0), (8.0, 0.0), (10.0, 0.0)]);
});

def_test!(
fn list_evaluation_on_iterative_grid_uses_largest_sub_size_only {
    let profile = MockProfile::default();
    let grid = GridLike::from(
        Grid2DIterate::new(common::square_mask(3, 1.0, 1), 0.9999, vec![1, 2, 4]).unwrap(),
    );
    let sub_sizes = Mutex::new(Vec::new());

    let structures = grid_2d_to_structure_list(&profile, &grid, |profile, grid| {
        sub_sizes.lock().unwrap().push(grid.sub_size().unwrap());
        vec![
            common::y_coordinates(profile, grid),
            common::doubled_coordinates(profile, grid),
        ]
    })
    .unwrap();

    assert_eq!(*sub_sizes.lock().unwrap(), vec![4]);
    assert_eq!(structures.len(), 2);

    let pixel_centres = Grid2D::uniform((3, 3), In2D::same(1.0), 1).unwrap();
    let binned_y = structures[0].as_array_2d().unwrap();
    assert_eq!(binned_y.mask().sub_size(), 1);
    assert_abs_diff_eq!(
        binned_y.slim(),
        pixel_centres.slim().column(0),
        epsilon = 1e-12
    );

    let binned_coords = structures[1].as_grid_2d().unwrap();
    assert_eq!(binned_coords.len(), 9);
    let doubled_x = pixel_centres.slim().column(1).mapv(|x| 2.0 * x);
    assert_abs_diff_eq!(binned_coords.slim().column(1), doubled_x, epsilon = 1e-12);
});

def_test!(
fn iterative_refinement_does_not_lose_accuracy {
    // The mean of x^2 over a pixel of width w centred on x_c is x_c^2 + w^2/12.
    let pixel_scale = 0.5;
    let mask = common::square_mask(5, pixel_scale, 1);
    let pixel_centres = Grid2D::from_mask(mask.clone());
    let exact = pixel_centres
        .slim()
        .column(1)
        .mapv(|x| x * x + pixel_scale * pixel_scale / 12.0);

    let x_squared = |_: &MockProfile, grid: &GridLike| {
        EvalResult::Scalar(grid.slim().column(1).mapv(|x| x * x))
    };
    let profile = MockProfile::default();

    let first_step = grid_2d_to_structure(&profile, &GridLike::from(pixel_centres), x_squared)
        .unwrap()
        .to_eval_result()
        .into_scalar()
        .unwrap();

    let grid = GridLike::from(Grid2DIterate::new(mask, 0.9999, vec![1, 2, 4, 8, 16]).unwrap());
    let iterated = grid_2d_to_structure(&profile, &grid, x_squared)
        .unwrap()
        .to_eval_result()
        .into_scalar()
        .unwrap();

    for ((&first, &last), &exact) in first_step.iter().zip(iterated.iter()).zip(exact.iter()) {
        let first_error = ((first - exact) / exact).abs();
        let last_error = ((last - exact) / exact).abs();
        assert!(last_error <= first_error);
        assert!(last_error < 1e-2);
    }
});

def_test!(
fn interpolation_grid_evaluates_on_lattice_only {
    let profile = MockProfile::default();
    let mask = common::square_mask(8, 0.25, 1);
    let interpolate = Grid2DInterpolate::new(mask.clone(), In2D::same(0.5)).unwrap();
    let lattice_len = interpolate.lattice().len();
    let grid = GridLike::from(interpolate);
    let evaluated_lengths = Mutex::new(Vec::new());

    let structure = grid_2d_to_structure(&profile, &grid, |profile, grid| {
        evaluated_lengths.lock().unwrap().push(grid.len());
        common::y_plus_x(profile, grid)
    })
    .unwrap();

    assert_eq!(*evaluated_lengths.lock().unwrap(), vec![lattice_len]);
    let direct = common::y_plus_x(&profile, &GridLike::from(Grid2D::from_mask(mask)));
    let direct = direct.into_scalar().unwrap();
    assert_abs_diff_eq!(
        structure.as_array_2d().unwrap().slim(),
        direct,
        epsilon = 1e-10
    );
});

def_test!(
fn uniform_grid_is_projected_along_minor_axis {
    let grid = GridLike::from(Grid2D::uniform((5, 5), In2D::same(1.0), 1).unwrap());

    let unrotated = MockProfile::default();
    let structure = grid_1d_to_structure(&unrotated, &grid, common::x_coordinates).unwrap();
    let values = structure.as_array_1d().unwrap();
    assert_eq!(values.pixel_scale(), 1.0);
    assert_abs_diff_eq!(values.slim(), array![0.0, 1.0, 2.0], epsilon = 1e-12);

    let rotated = MockProfile::new(Some((0.0, 0.0)), Some(0.0));
    let structure = grid_1d_to_structure(&rotated, &grid, common::y_coordinates).unwrap();
    assert_abs_diff_eq!(
        structure.as_array_1d().unwrap().slim(),
        array![0.0, -1.0, -2.0],
        epsilon = 1e-12
    );
});

def_test!(
fn iterative_grid_is_projected_with_its_pixel_scale {
    let profile = MockProfile::new(Some((0.0, 0.5)), None);
    let grid = GridLike::from(Grid2DIterate::from_mask(common::square_mask(4, 0.5, 1)));

    let structure = grid_1d_to_structure(&profile, &grid, common::x_coordinates).unwrap();
    let values = structure.as_array_1d().unwrap();
    assert_eq!(values.pixel_scale(), 0.5);
    assert_eq!(values.slim()[0], 0.5);
});

def_test!(
fn irregular_grid_is_not_projected_by_1d_wrapper {
    let profile = MockProfile::new(Some((1.0, 1.0)), Some(30.0));
    let grid = GridLike::from(Grid2DIrregular::from_pairs(&[(1.0, 2.0), (3.0, 4.0)]));

    let structure = grid_1d_to_structure(&profile, &grid, common::y_plus_x).unwrap();
    assert_eq!(
        structure.as_values_irregular().unwrap().slim(),
        array![3.0, 7.0].view()
    );
});

def_test!(
fn radial_grid_is_evaluated_along_x {
    let profile = MockProfile::default();
    let grid_1d = Grid1D::uniform_from_zero(4, 0.5, 1).unwrap();
    let grid = GridLike::from(grid_1d.clone());
    let expected = grid_1d.slim();

    for structure in [
        grid_1d_to_structure(&profile, &grid, common::x_coordinates).unwrap(),
        grid_1d_output_structure(&profile, &grid, common::x_coordinates).unwrap(),
        grid_2d_to_structure(&profile, &grid, common::x_coordinates).unwrap(),
    ] {
        let values = structure.as_array_1d().unwrap();
        assert_eq!(values.pixel_scale(), 0.5);
        assert_abs_diff_eq!(values.slim(), expected, epsilon = 1e-12);
    }

    let structure = grid_2d_to_structure(&profile, &grid, common::doubled_coordinates).unwrap();
    assert_eq!(structure.as_grid_2d_irregular().unwrap().len(), 4);
});

def_test!(
fn output_structure_wrapper_does_not_project {
    let profile = MockProfile::new(Some((0.0, 0.0)), Some(45.0));
    let grid = GridLike::from(Grid2D::uniform((2, 3), In2D::same(2.0), 1).unwrap());

    let structure = grid_1d_output_structure(&profile, &grid, common::x_coordinates).unwrap();
    let values = structure.as_array_1d().unwrap();
    assert_eq!(values.pixel_scale(), 2.0);
    assert_eq!(values.slim().to_vec(), vec![-2.0, 0.0, 2.0, -2.0, 0.0, 2.0]);
});

def_test!(
fn transform_is_idempotent {
    let profile = MockProfile::new(Some((0.3, -0.2)), Some(40.0));
    let grid = GridLike::from(Grid2D::uniform((3, 4), In2D::same(0.5), 2).unwrap());

    let once = transform(&profile, &grid, |_, grid| grid.clone());
    let twice = transform(&profile, &once, |_, grid| grid.clone());
    assert!(once.is_transformed());
    assert_eq!(once.slim(), twice.slim());

    let nested = transform(&profile, &grid, |profile, grid| {
        transform(profile, grid, |_, grid| grid.slim().into_owned())
    });
    assert_eq!(&nested, &*once.slim());
});

def_test!(
fn relocation_moves_only_coordinates_inside_radial_minimum {
    let profile = MockProfile::default();
    let grid = GridLike::from(Grid2DIrregular::from_pairs(&[
        (0.0, 0.0),
        (0.0, 0.5),
        (3.0, 4.0),
        (0.06, 0.08),
    ]));

    let relocated = relocate_to_radial_minimum(&profile, &grid, &CONFIG, |_, grid| {
        assert!(matches!(grid, GridLike::Irregular(_)));
        grid.slim().into_owned()
    })
    .unwrap();

    assert_eq!(relocated.nrows(), 4);
    assert_eq!(relocated.row(0).to_vec(), vec![0.5, 0.5]);
    assert_eq!(relocated.row(1).to_vec(), vec![0.0, 0.5]);
    assert_eq!(relocated.row(2).to_vec(), vec![3.0, 4.0]);
    assert_abs_diff_eq!(relocated.row(3), array![0.3, 0.4], epsilon = 1e-12);
});

def_test!(
fn relocation_then_transform_composes {
    let profile = MockProfile::new(Some((1.0, 1.0)), None);
    let grid = GridLike::from(Grid2DIrregular::from_pairs(&[(1.0, 1.0), (1.0, 3.0)]));

    let radii = transform(&profile, &grid, |profile, grid| {
        relocate_to_radial_minimum(profile, grid, &CONFIG, |_, grid| {
            grid.slim()
                .rows()
                .into_iter()
                .map(|point| point[0].hypot(point[1]))
                .collect::<Array1<f64>>()
        })
    })
    .unwrap();

    assert_abs_diff_eq!(
        radii,
        array![MockProfile::RADIAL_MINIMUM * 2.0_f64.sqrt(), 2.0],
        epsilon = 1e-12
    );
});
