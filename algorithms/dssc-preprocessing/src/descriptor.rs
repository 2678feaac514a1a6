//! Dense local image descriptors
//!
//! A [`DescriptorExtractor`] turns one single-channel image into a fixed-layout feature vector.
//! [`DenseSift`] is the built-in extractor: SIFT-like gradient orientation histograms computed
//! on a regular grid of square patches, without keypoint detection or rotation normalization.
use dssc::param_guard::ParamGuard;
use ndarray::{Array1, Array2, ArrayView2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use std::f64::consts::PI;

use crate::error::{PreprocessingError, Result};

/// Extracts one descriptor vector per image
///
/// Every image of a batch must yield a descriptor of the same length.
pub trait DescriptorExtractor {
    fn extract(&self, image: ArrayView2<f64>) -> Result<Array1<f64>>;
}

impl<F> DescriptorExtractor for F
where
    F: Fn(ArrayView2<f64>) -> Result<Array1<f64>>,
{
    fn extract(&self, image: ArrayView2<f64>) -> Result<Array1<f64>> {
        self(image)
    }
}

/// Spatial cells per patch side
const CELLS: usize = 4;
/// Orientation bins per cell
const BINS: usize = 8;
/// Descriptor entries are clipped at this value after the first normalization
const CLIP: f64 = 0.2;

/// Checked dense SIFT parameters, usable as an extractor
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSift {
    patch_size: usize,
    step: usize,
}

/// Builder for [`DenseSift`]
#[derive(Debug, Clone, PartialEq)]
pub struct DenseSiftParams(DenseSift);

impl DenseSift {
    /// Defaults: `16x16` patches every `8` pixels
    pub fn params() -> DenseSiftParams {
        DenseSiftParams(DenseSift {
            patch_size: 16,
            step: 8,
        })
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    pub fn step(&self) -> usize {
        self.step
    }

    /// Length of the descriptor produced for an image of the given shape
    pub fn descriptor_len(&self, (height, width): (usize, usize)) -> usize {
        if height < self.patch_size || width < self.patch_size {
            return 0;
        }
        let rows = (height - self.patch_size) / self.step + 1;
        let cols = (width - self.patch_size) / self.step + 1;

        rows * cols * CELLS * CELLS * BINS
    }
}

impl DenseSiftParams {
    /// Side length of the square patches, a multiple of 4
    pub fn patch_size(mut self, patch_size: usize) -> Self {
        self.0.patch_size = patch_size;
        self
    }

    /// Distance between neighbouring patches
    pub fn step(mut self, step: usize) -> Self {
        self.0.step = step;
        self
    }
}

impl ParamGuard for DenseSiftParams {
    type Checked = DenseSift;
    type Error = PreprocessingError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.patch_size == 0 || self.0.patch_size % CELLS != 0 {
            Err(PreprocessingError::InvalidPatchSize(self.0.patch_size))
        } else if self.0.step == 0 {
            Err(PreprocessingError::InvalidStep)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl Default for DenseSift {
    fn default() -> Self {
        DenseSift::params().check_unwrap()
    }
}

/// Gradient magnitude and orientation in `[0, 2pi)` with central differences inside the image
/// and one-sided differences at the border
fn gradients(image: &ArrayView2<f64>) -> (Array2<f64>, Array2<f64>) {
    let (h, w) = image.dim();
    let diff = |lo: f64, hi: f64, span: usize| {
        if span == 0 {
            0.0
        } else {
            (hi - lo) / span as f64
        }
    };

    let mut magnitude = Array2::zeros((h, w));
    let mut orientation = Array2::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let (r0, r1) = (r.saturating_sub(1), (r + 1).min(h - 1));
            let (c0, c1) = (c.saturating_sub(1), (c + 1).min(w - 1));
            let gy = diff(image[[r0, c]], image[[r1, c]], r1 - r0);
            let gx = diff(image[[r, c0]], image[[r, c1]], c1 - c0);

            magnitude[[r, c]] = gx.hypot(gy);
            orientation[[r, c]] = gy.atan2(gx).rem_euclid(2.0 * PI);
        }
    }

    (magnitude, orientation)
}

fn normalize_descriptor(hist: &mut [f64]) {
    let norm = hist.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm == 0.0 {
        return;
    }
    hist.iter_mut().for_each(|x| *x = (*x / norm).min(CLIP));

    let norm = hist.iter().map(|x| x * x).sum::<f64>().sqrt();
    hist.iter_mut().for_each(|x| *x /= norm);
}

impl DescriptorExtractor for DenseSift {
    fn extract(&self, image: ArrayView2<f64>) -> Result<Array1<f64>> {
        let (h, w) = image.dim();
        let p = self.patch_size;
        if h < p || w < p {
            return Err(PreprocessingError::ImageTooSmall((h, w), p));
        }

        let (magnitude, orientation) = gradients(&image);
        let cell = p / CELLS;
        let center = (p as f64 - 1.0) / 2.0;
        let sigma = p as f64 / 2.0;
        let patch_len = CELLS * CELLS * BINS;

        let mut descriptor = Vec::with_capacity(self.descriptor_len((h, w)));
        for y0 in (0..=h - p).step_by(self.step) {
            for x0 in (0..=w - p).step_by(self.step) {
                let mut hist = vec![0.0; patch_len];

                for dy in 0..p {
                    for dx in 0..p {
                        let (r, c) = (y0 + dy, x0 + dx);
                        let dist2 = (dy as f64 - center).powi(2) + (dx as f64 - center).powi(2);
                        let weight = magnitude[[r, c]] * (-dist2 / (2.0 * sigma * sigma)).exp();

                        // soft assignment to the two nearest orientation bins
                        let bin = orientation[[r, c]] * BINS as f64 / (2.0 * PI);
                        let lower = bin.floor();
                        let frac = bin - lower;
                        let b0 = lower as usize % BINS;
                        let b1 = (b0 + 1) % BINS;

                        let offset = ((dy / cell) * CELLS + dx / cell) * BINS;
                        hist[offset + b0] += weight * (1.0 - frac);
                        hist[offset + b1] += weight * frac;
                    }
                }

                normalize_descriptor(&mut hist);
                descriptor.extend(hist);
            }
        }

        Ok(Array1::from(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            DenseSift::params().patch_size(10).check(),
            Err(PreprocessingError::InvalidPatchSize(10))
        ));
        assert!(matches!(
            DenseSift::params().step(0).check(),
            Err(PreprocessingError::InvalidStep)
        ));
    }

    #[test]
    fn descriptor_length_follows_the_grid() {
        let sift = DenseSift::default();
        // patches at 0, 8, 16 along both axes
        assert_eq!(sift.descriptor_len((32, 32)), 9 * 128);

        let image = Array2::from_shape_fn((32, 32), |(r, c)| ((r * c) % 7) as f64);
        let descriptor = sift.extract(image.view()).unwrap();
        assert_eq!(descriptor.len(), 9 * 128);
    }

    #[test]
    fn flat_images_have_empty_histograms() {
        let sift = DenseSift::params().patch_size(8).check().unwrap();
        let descriptor = sift.extract(Array2::from_elem((8, 8), 3.0).view()).unwrap();
        assert!(descriptor.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn histograms_are_unit_length() {
        let sift = DenseSift::params().patch_size(8).step(8).check().unwrap();
        let image = Array2::from_shape_fn((8, 16), |(r, c)| (r as f64).sin() + c as f64 * 0.5);
        let descriptor = sift.extract(image.view()).unwrap();
        assert_eq!(descriptor.len(), 2 * 128);

        for patch in descriptor.as_slice().unwrap().chunks(128) {
            let norm = patch.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn horizontal_ramp_votes_for_orientation_zero() {
        let sift = DenseSift::params().patch_size(8).check().unwrap();
        let image = Array2::from_shape_fn((8, 8), |(_, c)| c as f64);
        let descriptor = sift.extract(image.view()).unwrap();

        // every cell only fills bin 0
        for (i, value) in descriptor.iter().enumerate() {
            if i % BINS != 0 {
                assert_abs_diff_eq!(*value, 0.0);
            }
        }
    }

    #[test]
    fn small_images_are_rejected() {
        let sift = DenseSift::default();
        assert!(matches!(
            sift.extract(Array2::zeros((12, 40)).view()),
            Err(PreprocessingError::ImageTooSmall((12, 40), 16))
        ));
    }

    #[test]
    fn functions_are_extractors() {
        fn mean(image: ArrayView2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::from_elem(1, image.mean().unwrap_or(0.0)))
        }
        let descriptor = mean.extract(Array2::from_elem((2, 2), 4.0).view()).unwrap();
        assert_eq!(descriptor[0], 4.0);
    }
}
