//! Shuffled train/validation split
use dssc::dataset::{check_batch, BatchShape};
use dssc::{ImageBatch, Labels};
use ndarray::{ArrayBase, Axis, Data, Ix1};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{PreprocessingError, Result};

/// Images and labels of one side of a split
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub images: ImageBatch,
    pub labels: Labels,
}

/// Shuffles the samples and splits them into a training and a validation part
///
/// The training part receives `ceil(n * ratio)` samples, the validation part the rest.
pub fn split_with_ratio<S, R>(
    images: &ImageBatch,
    labels: &ArrayBase<S, Ix1>,
    ratio: f32,
    rng: &mut R,
) -> Result<(Split, Split)>
where
    S: Data<Elem = usize>,
    R: Rng + ?Sized,
{
    check_batch(images)?;
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(PreprocessingError::InvalidRatio(ratio));
    }

    let n = images.nsamples();
    if labels.len() != n {
        return Err(dssc::error::Error::LabelLength(labels.len(), n).into());
    }

    let mut indices = (0..n).collect::<Vec<_>>();
    indices.shuffle(rng);
    let n_train = ((n as f32 * ratio).ceil() as usize).min(n);
    let (train, val) = indices.split_at(n_train);

    let take = |idx: &[usize]| Split {
        images: images.select(Axis(0), idx),
        labels: labels.select(Axis(0), idx),
    };

    Ok((take(train), take(val)))
}
