//! Anti-aliased bilinear image resizing
//!
//! Downsampling first smooths the image with a Gaussian of standard deviation
//! `max(0, (factor - 1) / 2)` per axis and then samples it bilinearly at the centres of the
//! output pixels. Samples falling outside the image are mirrored at the border without repeating
//! the edge pixel.
use dssc::dataset::check_batch;
use dssc::ImageBatch;
use ndarray::{Array2, ArrayBase, ArrayD, Axis, Data, Ix2, IxDyn};

use crate::error::{PreprocessingError, Result};

/// Gaussian kernels are cut off at this many standard deviations
const TRUNCATE: f64 = 4.0;

/// Mirrors an out-of-range index back into `0..n`, reflecting about the edge pixels
fn mirror(idx: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = idx.rem_euclid(period);
    if m < n as isize {
        m as usize
    } else {
        (period - m) as usize
    }
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let weights = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect::<Vec<_>>();
    let total: f64 = weights.iter().sum();

    weights.into_iter().map(|w| w / total).collect()
}

/// Convolves every lane along `axis` with a Gaussian
fn smooth_axis(image: &Array2<f64>, axis: Axis, sigma: f64) -> Array2<f64> {
    if sigma <= 0.0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;
    let mut out = Array2::zeros(image.raw_dim());

    for (lane, mut out_lane) in image.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = lane.len();
        for (i, v) in out_lane.iter_mut().enumerate() {
            *v = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * lane[mirror(i as isize + k as isize - radius, n)])
                .sum();
        }
    }

    out
}

/// Resizes a single-channel image to `(height, width)`
pub fn resize<S: Data<Elem = f64>>(
    image: &ArrayBase<S, Ix2>,
    output_shape: (usize, usize),
) -> Result<Array2<f64>> {
    let (out_h, out_w) = output_shape;
    if out_h == 0 || out_w == 0 {
        return Err(PreprocessingError::EmptyTarget(output_shape));
    }

    let (in_h, in_w) = image.dim();
    let factor_h = in_h as f64 / out_h as f64;
    let factor_w = in_w as f64 / out_w as f64;

    let smoothed = smooth_axis(&image.to_owned(), Axis(0), ((factor_h - 1.0) / 2.0).max(0.0));
    let smoothed = smooth_axis(&smoothed, Axis(1), ((factor_w - 1.0) / 2.0).max(0.0));

    let sample = |coord: f64, n: usize| -> (usize, usize, f64) {
        let lower = coord.floor();
        let t = coord - lower;
        let lower = lower as isize;
        (mirror(lower, n), mirror(lower + 1, n), t)
    };

    let resized = Array2::from_shape_fn(output_shape, |(r, c)| {
        let (r0, r1, tr) = sample((r as f64 + 0.5) * factor_h - 0.5, in_h);
        let (c0, c1, tc) = sample((c as f64 + 0.5) * factor_w - 0.5, in_w);

        let top = smoothed[[r0, c0]] * (1.0 - tc) + smoothed[[r0, c1]] * tc;
        let bottom = smoothed[[r1, c0]] * (1.0 - tc) + smoothed[[r1, c1]] * tc;
        top * (1.0 - tr) + bottom * tr
    });

    Ok(resized)
}

/// Resizes every image of a single-channel batch to `(height, width)`
///
/// Accepts `(n, h, w)` batches and `(n, h, w, 1)` batches; the trailing channel axis is kept.
pub fn resize_batch(images: &ImageBatch, output_shape: (usize, usize)) -> Result<ImageBatch> {
    check_batch(images)?;
    if images.ndim() == 4 && images.shape()[3] != 1 {
        return Err(PreprocessingError::MultiChannel(images.shape()[3]));
    }

    let mut shape = images.shape().to_vec();
    shape[1] = output_shape.0;
    shape[2] = output_shape.1;
    let mut resized = ArrayD::zeros(IxDyn(&shape));

    for (image, mut target) in images.outer_iter().zip(resized.outer_iter_mut()) {
        let image = image
            .to_shape((image.shape()[0], image.shape()[1]))
            .map_err(dssc::error::Error::from)?;
        let out = resize(&image, output_shape)?
            .into_shape(target.raw_dim())
            .map_err(dssc::error::Error::from)?;
        target.assign(&out);
    }

    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array, Array1, Array3};

    #[test]
    fn mirror_reflects_without_repeating_the_edge() {
        assert_eq!(mirror(-1, 4), 1);
        assert_eq!(mirror(-2, 4), 2);
        assert_eq!(mirror(4, 4), 2);
        assert_eq!(mirror(5, 4), 1);
        assert_eq!(mirror(2, 4), 2);
        assert_eq!(mirror(-7, 1), 0);
    }

    #[test]
    fn kernel_is_normalized() {
        let kernel = gaussian_kernel(1.5);
        assert_eq!(kernel.len(), 13);
        assert_abs_diff_eq!(kernel.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(kernel[0], kernel[12]);
    }

    #[test]
    fn constant_images_stay_constant() {
        let image = Array2::from_elem((64, 48), 0.3);
        let out = resize(&image, (32, 24)).unwrap();
        assert_eq!(out.dim(), (32, 24));
        assert_abs_diff_eq!(out, Array2::from_elem((32, 24), 0.3), epsilon = 1e-12);
    }

    #[test]
    fn identity_resize_keeps_pixels() {
        let image = array![[0., 1., 2.], [3., 4., 5.]];
        let out = resize(&image, (2, 3)).unwrap();
        assert_abs_diff_eq!(out, image, epsilon = 1e-12);
    }

    #[test]
    fn halving_averages_neighbourhoods() {
        // left half dark, right half bright, the boundary stays between output columns
        let image = Array2::from_shape_fn((8, 8), |(_, c)| if c < 4 { 0. } else { 1. });
        let out = resize(&image, (4, 4)).unwrap();
        assert!(out[[0, 0]] < 0.1);
        assert!(out[[0, 3]] > 0.9);
        assert_abs_diff_eq!(
            out.column(0),
            Array1::from_elem(4, out[[0, 0]]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn batches_keep_the_channel_axis() {
        let images = Array::from_elem((3, 40, 40, 1), 1.0).into_dyn();
        let out = resize_batch(&images, (32, 32)).unwrap();
        assert_eq!(out.shape(), &[3, 32, 32, 1]);
    }

    #[test]
    fn color_images_are_rejected() {
        let images = Array::from_elem((2, 40, 40, 3), 1.0).into_dyn();
        assert!(matches!(
            resize_batch(&images, (32, 32)),
            Err(PreprocessingError::MultiChannel(3))
        ));
    }

    #[test]
    fn empty_targets_are_rejected() {
        let images = Array3::<f64>::zeros((1, 4, 4)).into_dyn();
        assert!(matches!(
            resize_batch(&images, (0, 2)),
            Err(PreprocessingError::EmptyTarget(_))
        ));
    }
}
