//! Principal Component Analysis
//!
//! Principal Component Analysis is a common technique for data and dimensionality reduction. It
//! reduces the dimensionality of the data while retaining most of the variance. The principal
//! axes are found with a symmetric eigendecomposition of either the covariance matrix or, when
//! there are fewer samples than features, the Gram matrix of the centered records. The result is
//! fully deterministic: the sign of every component is fixed so that its entry of largest
//! magnitude is positive.
//!
//! # Example
//!
//! ```
//! use dssc::traits::{Fit, Transformer};
//! use dssc_preprocessing::Pca;
//! use ndarray::array;
//!
//! let records = array![[1., 2.], [2., 4.1], [3., 5.9], [4., 8.]];
//!
//! // project onto the line which maximizes the spread of the data
//! let pca = Pca::params(1).fit(&records).unwrap();
//! let embedding = pca.transform(&records);
//! assert_eq!(embedding.dim(), (4, 1));
//! ```
use dssc::param_guard::ParamGuard;
use dssc::traits::{Fit, Transformer};
use linfa_linalg::eigh::{EigSort, Eigh};
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{PreprocessingError, Result};

/// Checked PCA parameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PcaValidParams {
    embedding_size: usize,
}

impl PcaValidParams {
    /// The target dimensionality
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }
}

/// Principal Component Analysis parameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PcaParams(PcaValidParams);

impl ParamGuard for PcaParams {
    type Checked = PcaValidParams;
    type Error = PreprocessingError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.embedding_size == 0 {
            Err(PreprocessingError::NonPositiveEmbeddingSize)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Fit a PCA model given a set of records
///
/// # Parameters
///
/// * `records`: `n_samples x n_features` matrix
///
/// # Returns
///
/// A fitted PCA model with origin and hyperplane
impl<S: Data<Elem = f64>> Fit<ArrayBase<S, Ix2>, PreprocessingError> for PcaValidParams {
    type Object = Pca;

    fn fit(&self, records: &ArrayBase<S, Ix2>) -> Result<Pca> {
        let (n_samples, n_features) = records.dim();
        let k = self.embedding_size;
        if n_samples == 0 {
            return Err(PreprocessingError::NotEnoughSamples);
        }
        if k > n_samples.min(n_features) {
            return Err(PreprocessingError::EmbeddingTooLarge(
                k,
                n_samples.min(n_features),
            ));
        }

        // calculate mean of data and subtract it
        let mean = records
            .mean_axis(Axis(0))
            .ok_or(PreprocessingError::NotEnoughSamples)?;
        let centered = records - &mean;

        let (eigvals, mut embedding) = if n_features <= n_samples {
            let (eigvals, eigvecs) = centered.t().dot(&centered).eigh()?.sort_eig_desc();
            (
                eigvals.slice(s![..k]).to_owned(),
                eigvecs.slice(s![.., ..k]).t().to_owned(),
            )
        } else {
            // left singular vectors first, then map them back into feature space
            let (eigvals, eigvecs) = centered.dot(&centered.t()).eigh()?.sort_eig_desc();
            let mut embedding = eigvecs.slice(s![.., ..k]).t().dot(&centered);
            for mut row in embedding.rows_mut() {
                let norm = row.dot(&row).sqrt();
                if norm > 0.0 {
                    row /= norm;
                }
            }
            (eigvals.slice(s![..k]).to_owned(), embedding)
        };

        for mut row in embedding.rows_mut() {
            let pivot = row
                .iter()
                .copied()
                .fold(0.0f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
            if pivot < 0.0 {
                row.mapv_inplace(|x| -x);
            }
        }

        let dof = (n_samples.max(2) - 1) as f64;
        let explained_variance = eigvals.mapv(|v| v.max(0.0) / dof);
        let total_variance = centered.mapv(|x| x * x).sum() / dof;

        Ok(Pca {
            embedding,
            explained_variance,
            total_variance,
            mean,
        })
    }
}

/// Fitted Principal Component Analysis model
///
/// The model contains the mean and hyperplane for the projection of data.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Pca {
    embedding: Array2<f64>,
    explained_variance: Array1<f64>,
    total_variance: f64,
    mean: Array1<f64>,
}

impl Pca {
    /// Create default parameter set
    ///
    /// # Parameters
    ///
    ///  * `embedding_size`: the target dimensionality
    pub fn params(embedding_size: usize) -> PcaParams {
        PcaParams(PcaValidParams { embedding_size })
    }

    /// Principal axes, one per row
    pub fn components(&self) -> &Array2<f64> {
        &self.embedding
    }

    /// Mean of the training records
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Return the amount of explained variance per component
    pub fn explained_variance(&self) -> &Array1<f64> {
        &self.explained_variance
    }

    /// Return the normalized amount of explained variance per component
    pub fn explained_variance_ratio(&self) -> Array1<f64> {
        if self.total_variance > 0.0 {
            &self.explained_variance / self.total_variance
        } else {
            Array1::zeros(self.explained_variance.len())
        }
    }
}

/// Project a matrix to lower dimensional space
///
/// The projection first centers and then projects the data.
impl<'a, S: Data<Elem = f64>> Transformer<&'a ArrayBase<S, Ix2>, Array2<f64>> for Pca {
    fn transform(&self, records: &'a ArrayBase<S, Ix2>) -> Array2<f64> {
        (records - &self.mean).dot(&self.embedding.t())
    }
}
