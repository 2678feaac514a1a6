//! Downsampling and intensity normalization
use dssc::dataset::{check_batch, BatchShape};
use dssc::progress::Progress;
use dssc::ImageBatch;
use ndarray::{ArrayBase, Data, DataMut, Dimension};
use tracing::warn;

use crate::error::Result;
use crate::resize::resize_batch;

/// Images with a spatial axis longer than this are downsampled before normalization
pub const MAX_DIM: usize = 32;

/// Target spatial shape for a batch whose largest axis exceeds [`MAX_DIM`]
///
/// The largest axis of a single image, channel axis included, determines the shrink factor
/// `max / 32`; both spatial axes are divided by it and truncated.
pub fn downsampled_shape(image_shape: &[usize]) -> Option<(usize, usize)> {
    let maxdim = image_shape.iter().copied().max()?;
    if maxdim <= MAX_DIM || image_shape.len() < 2 {
        return None;
    }

    let factor = maxdim as f64 / MAX_DIM as f64;
    Some((
        (image_shape[0] as f64 / factor) as usize,
        (image_shape[1] as f64 / factor) as usize,
    ))
}

/// Linearly maps all values into `[-1, 1]` using the global minimum and maximum
///
/// Input without any spread (`max == min`) is mapped to zeros and a warning is logged.
pub fn normalize<S, D>(values: &mut ArrayBase<S, D>)
where
    S: DataMut<Elem = f64>,
    D: Dimension,
{
    let (mmin, mmax) = min_max(values);
    if mmax == mmin {
        warn!(value = mmin, "input has zero range, normalizing to zeros");
        values.fill(0.0);
        return;
    }

    values.mapv_inplace(|x| (2.0 * x - mmax - mmin) / (mmax - mmin));
}

fn min_max<S: Data<Elem = f64>, D: Dimension>(values: &ArrayBase<S, D>) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(*x), hi.max(*x))
        })
}

/// Downsamples large images and normalizes intensities into `[-1, 1]`
///
/// Only single-channel images can be resized.
pub fn rescale(images: &ImageBatch) -> Result<ImageBatch> {
    check_batch(images)?;
    let progress = Progress::new(true);

    let mut images = match downsampled_shape(images.image_shape()) {
        Some(shape) => {
            let stage = progress.stage("Downsampling");
            let resized = resize_batch(images, shape)?;
            stage.finish();
            resized
        }
        None => images.clone(),
    };

    let stage = progress.stage("Normalizing data");
    normalize(&mut images);
    stage.finish();

    Ok(images)
}
