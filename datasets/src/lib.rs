//! `dssc-datasets` loads labelled image datasets and generates synthetic datasets for tests
//! and examples.
//!
//! ## Current State
//!
//! * [`load_images`], [`load_labels`] and [`load_features`] read single `.npy` files (and
//!   `.csv`/`.csv.gz` for two-dimensional data), see [`format`]
//! * [`Partitioned`] stores a preprocessed dataset together with its validation split, so the
//!   split only has to be computed once and pre-trained autoencoders keep seeing the same data
//! * [`generate`] samples unions of subspaces and gaussian blobs
//!
//! ```no_run
//! let images = dssc_datasets::load_images("saved/raw/yaleB_images.npy").unwrap();
//! let labels = dssc_datasets::load_labels("saved/raw/yaleB_labels.npy").unwrap();
//! assert_eq!(images.shape()[0], labels.len());
//! ```

mod error;
pub mod format;
pub mod generate;

use std::path::Path;

use dssc::dataset::{check_batch, BatchShape};
use dssc::error::Error;
use dssc::{ImageBatch, Labels};
use ndarray::{Array2, ArrayBase, Data, Ix1};

pub use error::{DatasetError, Result};
pub use format::{write_array as save, write_labels as save_labels};

/// Reads an image batch, sample axis first
pub fn load_images<P: AsRef<Path>>(path: P) -> Result<ImageBatch> {
    let images = format::read_array(path.as_ref())?;
    check_batch(&images)?;

    Ok(images)
}

/// Reads one feature row per sample
pub fn load_features<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let array = format::read_array(path.as_ref())?;
    let ndim = array.ndim();

    array
        .into_dimensionality()
        .map_err(|_| {
            DatasetError::from(Error::Dimension {
                expected: 2,
                found: ndim,
            })
        })
}

/// Reads a label vector
pub fn load_labels<P: AsRef<Path>>(path: P) -> Result<Labels> {
    format::read_labels(path.as_ref())
}

/// Reads images and labels, checking that they belong together
pub fn load_labelled<P: AsRef<Path>, Q: AsRef<Path>>(
    images: P,
    labels: Q,
) -> Result<(ImageBatch, Labels)> {
    let images = load_images(images)?;
    let labels = load_labels(labels)?;
    if images.nsamples() != labels.len() {
        return Err(Error::LabelLength(labels.len(), images.nsamples()).into());
    }

    Ok((images, labels))
}

/// A flattened dataset with a held-out validation part
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned {
    pub train: Array2<f64>,
    pub labels: Labels,
    pub validation: Array2<f64>,
    pub labels_validation: Labels,
}

impl Partitioned {
    const TRAIN: &'static str = "X.npy";
    const LABELS: &'static str = "Y.npy";
    const VALIDATION: &'static str = "X_val.npy";
    const LABELS_VALIDATION: &'static str = "Y_val.npy";

    pub fn new<S, T>(
        train: Array2<f64>,
        labels: &ArrayBase<S, Ix1>,
        validation: Array2<f64>,
        labels_validation: &ArrayBase<T, Ix1>,
    ) -> Result<Self>
    where
        S: Data<Elem = usize>,
        T: Data<Elem = usize>,
    {
        if train.nrows() != labels.len() {
            return Err(Error::LabelLength(labels.len(), train.nrows()).into());
        }
        if validation.nrows() != labels_validation.len() {
            return Err(Error::LabelLength(labels_validation.len(), validation.nrows()).into());
        }
        if validation.ncols() != train.ncols() {
            return Err(Error::Parameters(format!(
                "validation data has {} features, training data {}",
                validation.ncols(),
                train.ncols()
            ))
            .into());
        }

        Ok(Partitioned {
            train,
            labels: labels.to_owned(),
            validation,
            labels_validation: labels_validation.to_owned(),
        })
    }

    /// Writes the four parts as `X.npy`, `Y.npy`, `X_val.npy` and `Y_val.npy` into `dir`
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        save(dir.join(Self::TRAIN), &self.train)?;
        save_labels(dir.join(Self::LABELS), &self.labels)?;
        save(dir.join(Self::VALIDATION), &self.validation)?;
        save_labels(dir.join(Self::LABELS_VALIDATION), &self.labels_validation)?;

        tracing::debug!(dir = ?dir, "saved partitioned dataset");
        Ok(())
    }

    /// Reads a dataset written by [`Partitioned::save`]
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        Partitioned::new(
            load_features(dir.join(Self::TRAIN))?,
            &load_labels(dir.join(Self::LABELS))?,
            load_features(dir.join(Self::VALIDATION))?,
            &load_labels(dir.join(Self::LABELS_VALIDATION))?,
        )
    }
}
