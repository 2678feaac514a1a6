//! Image batches and label vectors
//!
//! An [`ImageBatch`] stores a whole dataset in a single dynamic-dimensional array whose first
//! axis enumerates the samples. Images are either 2-D `(height, width)` or 3-D
//! `(height, width, channels)`; all images of a batch share the same shape.
use ndarray::{Array1, ArrayBase, ArrayD, Data, Ix1, IxDyn};

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// A batch of images with the sample axis first
pub type ImageBatch = ArrayD<f64>;

/// Ground-truth or predicted cluster assignments, one entry per sample
pub type Labels = Array1<usize>;

/// Shape information of an image batch
pub trait BatchShape {
    /// Number of images in the batch
    fn nsamples(&self) -> usize;

    /// Shape of a single image, i.e. every axis except the sample axis
    fn image_shape(&self) -> &[usize];

    /// Number of scalar values stored per image
    fn nfeatures(&self) -> usize {
        self.image_shape().iter().product()
    }
}

impl<S: Data<Elem = f64>> BatchShape for ArrayBase<S, IxDyn> {
    fn nsamples(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    fn image_shape(&self) -> &[usize] {
        match self.shape() {
            [] => &[],
            [_, rest @ ..] => rest,
        }
    }
}

/// Checks that `images` holds single images of dimension 2 or 3
pub fn check_batch(images: &ImageBatch) -> Result<()> {
    match images.ndim() {
        3 | 4 => Ok(()),
        found => Err(Error::Dimension {
            expected: 3,
            found,
        }),
    }
}

/// Distinct label identifiers in ascending order
pub fn distinct_labels<S: Data<Elem = usize>>(labels: &ArrayBase<S, Ix1>) -> Vec<usize> {
    labels
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Number of clusters present in a label vector
pub fn n_clusters<S: Data<Elem = usize>>(labels: &ArrayBase<S, Ix1>) -> usize {
    distinct_labels(labels).len()
}
