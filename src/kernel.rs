//! Convolution kernels for blurring masked 2D arrays.

use crate::{
    array::Array2D,
    error::{GridError, Result},
    geometry::{
        Dim2::{X, Y},
        In2D,
    },
};
use ndarray::{prelude::*, Zip};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// A 2D convolution kernel with odd dimensions, sampled at given pixel scales.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Kernel2D {
    values: Array2<f64>,
    pixel_scales: In2D<f64>,
}

impl Kernel2D {
    /// Creates a kernel from a native raster of values, optionally normalised
    /// to sum to one.
    pub fn from_native(values: Array2<f64>, pixel_scales: In2D<f64>, normalize: bool) -> Self {
        let kernel = Self {
            values,
            pixel_scales,
        };
        if normalize {
            kernel.normalized()
        } else {
            kernel
        }
    }

    /// Creates a 3x3 kernel that leaves any image unchanged.
    pub fn no_blurring(pixel_scales: In2D<f64>) -> Self {
        let mut values = Array2::zeros((3, 3));
        values[[1, 1]] = 1.0;
        Self::from_native(values, pixel_scales, false)
    }

    pub fn native(&self) -> ArrayView2<f64> {
        self.values.view()
    }

    pub fn pixel_scales(&self) -> &In2D<f64> {
        &self.pixel_scales
    }

    /// Returns the kernel scaled so that its values sum to one. A kernel
    /// summing to zero is returned unchanged.
    pub fn normalized(&self) -> Self {
        let sum = self.values.sum();
        if sum == 0.0 {
            return self.clone();
        }
        Self {
            values: &self.values / sum,
            pixel_scales: self.pixel_scales,
        }
    }

    /// Resamples the kernel by `rescale_factor` along both dimensions, then
    /// grows any even dimension by one so that the kernel can be convolved.
    ///
    /// The pixel scales change by the inverse of the change in shape, so the
    /// kernel keeps its angular extent.
    pub fn rescaled_with_odd_dimensions(
        &self,
        rescale_factor: f64,
        normalize: bool,
    ) -> Result<Self> {
        if !(rescale_factor.is_finite() && rescale_factor > 0.0) {
            return Err(GridError::InvalidRescaleFactor(rescale_factor));
        }
        let (ny, nx) = self.values.dim();
        let mut values = resampled(
            self.values.view(),
            (
                rescaled_len(ny, rescale_factor),
                rescaled_len(nx, rescale_factor),
            ),
        );

        let (rescaled_ny, rescaled_nx) = values.dim();
        if rescaled_ny % 2 == 0 || rescaled_nx % 2 == 0 {
            values = resampled(values.view(), (rescaled_ny | 1, rescaled_nx | 1));
        }

        let (odd_ny, odd_nx) = values.dim();
        let pixel_scales = In2D::new(
            self.pixel_scales[Y] * ny as f64 / odd_ny as f64,
            self.pixel_scales[X] * nx as f64 / odd_nx as f64,
        );
        Ok(Self::from_native(values, pixel_scales, normalize))
    }

    /// Convolves a native 2D image with the kernel, treating everything
    /// outside the image as zero. The output has the shape of the image.
    pub fn convolved_native(&self, image: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (kernel_ny, kernel_nx) = self.values.dim();
        if kernel_ny % 2 == 0 || kernel_nx % 2 == 0 {
            return Err(GridError::EvenKernel(kernel_ny, kernel_nx));
        }
        let (half_ny, half_nx) = ((kernel_ny / 2) as isize, (kernel_nx / 2) as isize);
        let (image_ny, image_nx) = (image.nrows() as isize, image.ncols() as isize);

        let mut convolved = Array2::zeros(image.raw_dim());
        Zip::indexed(&mut convolved).par_for_each(|(i, j), value| {
            let mut sum = 0.0;
            for ((m, n), &weight) in self.values.indexed_iter() {
                let y = i as isize - m as isize + half_ny;
                let x = j as isize - n as isize + half_nx;
                if y >= 0 && y < image_ny && x >= 0 && x < image_nx {
                    sum += weight * image[[y as usize, x as usize]];
                }
            }
            *value = sum;
        });
        Ok(convolved)
    }

    /// Convolves a masked array, binned to one value per pixel, with the kernel.
    ///
    /// Masked pixels contribute nothing to the convolution, and the result
    /// keeps the array's mask at sub size 1.
    pub fn convolved_array_from_array(&self, array: &Array2D) -> Result<Array2D> {
        let binned = array.binned();
        let convolved = self.convolved_native(binned.native().view())?;
        Array2D::from_native(convolved.view(), binned.mask().clone())
    }
}

fn rescaled_len(len: usize, rescale_factor: f64) -> usize {
    ((len as f64 * rescale_factor).round() as usize).max(1)
}

/// Bilinearly resamples a raster onto a new shape spanning the same extent.
/// Samples beyond the outermost pixel centres take the edge values.
fn resampled(values: ArrayView2<f64>, shape: (usize, usize)) -> Array2<f64> {
    let (ny, nx) = values.dim();
    let mut resampled = Array2::zeros(shape);
    Zip::indexed(&mut resampled).par_for_each(|(i, j), value| {
        let (y_lower, y_upper, wy) = sample_position(i, ny, shape.0);
        let (x_lower, x_upper, wx) = sample_position(j, nx, shape.1);
        let lower = (1.0 - wx) * values[[y_lower, x_lower]] + wx * values[[y_lower, x_upper]];
        let upper = (1.0 - wx) * values[[y_upper, x_lower]] + wx * values[[y_upper, x_upper]];
        *value = (1.0 - wy) * lower + wy * upper;
    });
    resampled
}

/// Maps an output pixel index to the enclosing input pixels and the weight
/// of the upper one, matching pixel centres.
fn sample_position(idx: usize, len: usize, resampled_len: usize) -> (usize, usize, f64) {
    let position = ((idx as f64 + 0.5) * len as f64 / resampled_len as f64 - 0.5)
        .clamp(0.0, (len - 1) as f64);
    let lower = position.floor() as usize;
    (lower, (lower + 1).min(len - 1), position - lower as f64)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::mask::Mask2D;
    use approx::assert_abs_diff_eq;

    fn asymmetric_kernel() -> Kernel2D {
        Kernel2D::from_native(
            array![[1.0, 1.0, 1.0], [2.0, 2.0, 1.0], [1.0, 3.0, 3.0]],
            In2D::same(1.0),
            false,
        )
    }

    fn cross_kernel() -> Kernel2D {
        Kernel2D::from_native(
            array![[0.0, 1.0, 0.0], [1.0, 2.0, 1.0], [0.0, 1.0, 0.0]],
            In2D::same(1.0),
            false,
        )
    }

    fn image_with_ones(shape: (usize, usize), ones: &[(usize, usize)]) -> Array2<f64> {
        let mut image = Array2::zeros(shape);
        for &idx in ones {
            image[idx] = 1.0;
        }
        image
    }

    #[test]
    fn even_kernel_is_rejected() {
        let kernel = Kernel2D::from_native(
            array![[0.0, 1.0], [1.0, 2.0]],
            In2D::same(1.0),
            false,
        );
        assert!(matches!(
            kernel.convolved_native(Array2::ones((5, 5)).view()),
            Err(GridError::EvenKernel(2, 2))
        ));
    }

    #[test]
    fn point_source_is_blurred_into_kernel() {
        let kernel = cross_kernel();
        let blurred = kernel
            .convolved_native(image_with_ones((3, 3), &[(1, 1)]).view())
            .unwrap();
        assert_eq!(blurred, kernel.native());

        let blurred = kernel
            .convolved_native(image_with_ones((4, 4), &[(1, 1)]).view())
            .unwrap();
        assert_eq!(
            blurred,
            array![
                [0.0, 1.0, 0.0, 0.0],
                [1.0, 2.0, 1.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0]
            ]
        );
    }

    #[test]
    fn asymmetric_kernel_is_flipped() {
        let blurred = asymmetric_kernel()
            .convolved_native(image_with_ones((4, 4), &[(1, 1), (2, 2)]).view())
            .unwrap();
        assert_eq!(
            blurred,
            array![
                [1.0, 1.0, 1.0, 0.0],
                [2.0, 3.0, 2.0, 1.0],
                [1.0, 5.0, 5.0, 1.0],
                [0.0, 1.0, 3.0, 3.0]
            ]
        );
    }

    #[test]
    fn blurring_beyond_edges_is_dropped() {
        let kernel = asymmetric_kernel();
        let blurred = kernel
            .convolved_native(image_with_ones((4, 4), &[(1, 0), (2, 3)]).view())
            .unwrap();
        assert_eq!(
            blurred,
            array![
                [1.0, 1.0, 0.0, 0.0],
                [2.0, 1.0, 1.0, 1.0],
                [3.0, 3.0, 2.0, 2.0],
                [0.0, 0.0, 1.0, 3.0]
            ]
        );

        let blurred = kernel
            .convolved_native(image_with_ones((4, 4), &[(0, 0), (3, 3)]).view())
            .unwrap();
        assert_eq!(
            blurred,
            array![
                [2.0, 1.0, 0.0, 0.0],
                [3.0, 3.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 1.0],
                [0.0, 0.0, 2.0, 2.0]
            ]
        );
    }

    #[test]
    fn normalized_kernel_sums_to_one() {
        let kernel = Kernel2D::from_native(Array2::ones((3, 3)), In2D::same(1.0), true);
        for &value in kernel.native() {
            assert_abs_diff_eq!(value, 1.0 / 9.0, epsilon = 1e-12);
        }
    }

    fn assert_rescaled(
        shape: (usize, usize),
        rescale_factor: f64,
        rescaled_shape: (usize, usize),
        pixel_scales: (f64, f64),
    ) {
        let kernel = Kernel2D::from_native(Array2::ones(shape), In2D::same(1.0), false)
            .rescaled_with_odd_dimensions(rescale_factor, true)
            .unwrap();
        assert_eq!(kernel.native().dim(), rescaled_shape);
        assert_abs_diff_eq!(kernel.pixel_scales()[Y], pixel_scales.0, epsilon = 1e-4);
        assert_abs_diff_eq!(kernel.pixel_scales()[X], pixel_scales.1, epsilon = 1e-4);
        let expected = 1.0 / (rescaled_shape.0 * rescaled_shape.1) as f64;
        for &value in kernel.native() {
            assert_abs_diff_eq!(value, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn odd_rescaled_kernel_keeps_its_shape() {
        assert_rescaled((6, 6), 0.5, (3, 3), (2.0, 2.0));
        assert_rescaled((9, 9), 0.333333333333333, (3, 3), (3.0, 3.0));
        assert_rescaled((18, 6), 0.5, (9, 3), (2.0, 2.0));
        assert_rescaled((6, 18), 0.5, (3, 9), (2.0, 2.0));
    }

    #[test]
    fn even_rescaled_kernel_grows_by_one() {
        assert_rescaled((2, 2), 2.0, (5, 5), (0.4, 0.4));
        assert_rescaled((40, 40), 0.1, (5, 5), (8.0, 8.0));
        assert_rescaled((2, 4), 2.0, (5, 9), (0.4, 0.4444444));
        assert_rescaled((4, 2), 2.0, (9, 5), (0.4444444, 0.4));
    }

    #[test]
    fn single_even_dimension_grows_by_one() {
        assert_rescaled((6, 4), 0.5, (3, 3), (2.0, 1.3333333));
        assert_rescaled((9, 12), 0.33333333333, (3, 5), (3.0, 2.4));
        assert_rescaled((4, 6), 0.5, (3, 3), (1.3333333, 2.0));
        assert_rescaled((12, 9), 0.33333333333, (5, 3), (2.4, 3.0));
    }

    #[test]
    fn rescaled_kernel_keeps_its_peak_centred() {
        let mut values = Array2::zeros((5, 5));
        values[[2, 2]] = 1.0;
        let kernel = Kernel2D::from_native(values, In2D::same(0.1), false)
            .rescaled_with_odd_dimensions(2.0, false)
            .unwrap();
        assert_eq!(kernel.native().dim(), (11, 11));
        let native = kernel.native();
        assert_eq!(native[[5, 5]], native.fold(f64::MIN, |max, &value| max.max(value)));
        assert_abs_diff_eq!(native[[5, 4]], native[[5, 6]], epsilon = 1e-12);
    }

    #[test]
    fn non_positive_rescale_factor_is_rejected() {
        let kernel = Kernel2D::no_blurring(In2D::same(1.0));
        for rescale_factor in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                kernel.rescaled_with_odd_dimensions(rescale_factor, true),
                Err(GridError::InvalidRescaleFactor(_))
            ));
        }
    }

    #[test]
    fn masked_array_keeps_its_mask() {
        let mask = Mask2D::from_array(
            array![[false, false, false], [false, false, false], [true, true, true]],
            In2D::same(1.0),
            In2D::same(0.0),
            1,
        )
        .unwrap();
        let array =
            Array2D::from_slim(array![0.0, 0.0, 0.0, 0.0, 1.0, 0.0], mask.clone()).unwrap();

        let blurred = Kernel2D::no_blurring(In2D::same(1.0))
            .convolved_array_from_array(&array)
            .unwrap();
        assert_eq!(blurred.mask(), &mask);
        assert_eq!(blurred.slim(), array.slim());

        let blurred = cross_kernel().convolved_array_from_array(&array).unwrap();
        assert_eq!(
            blurred.slim().to_vec(),
            vec![0.0, 1.0, 0.0, 1.0, 2.0, 1.0]
        );
    }
}
