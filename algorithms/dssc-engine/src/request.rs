//! Explicit request and response of a solver call
use dssc::Labels;
use ndarray::{Array2, ArrayView2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// What the solver should return
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SscMode {
    /// Compute the sparse self-representation matrix `C` only
    Affinity,
    /// Run spectral clustering and return one label per sample
    Cluster,
}

/// Data handed to the solver
#[derive(Debug, Clone, PartialEq)]
pub enum SscInput<'a> {
    /// One sample per row; the solver computes `C` itself
    Features(ArrayView2<'a, f64>),
    /// A precomputed square coefficient matrix
    Coefficients(ArrayView2<'a, f64>),
}

impl<'a> SscInput<'a> {
    pub fn nsamples(&self) -> usize {
        match self {
            SscInput::Features(x) => x.nrows(),
            SscInput::Coefficients(c) => c.nrows(),
        }
    }

    pub fn matrix(&self) -> &ArrayView2<'a, f64> {
        match self {
            SscInput::Features(x) => x,
            SscInput::Coefficients(c) => c,
        }
    }

    /// Whether the solver reads a precomputed `C`
    pub fn is_coefficients(&self) -> bool {
        matches!(self, SscInput::Coefficients(_))
    }
}

/// A single call of the sparse subspace clustering solver
#[derive(Debug, Clone, PartialEq)]
pub struct SscRequest<'a> {
    pub n_clusters: usize,
    pub alpha: f64,
    pub mode: SscMode,
    pub seed: Option<u64>,
    pub input: SscInput<'a>,
}

impl<'a> SscRequest<'a> {
    /// Requests the coefficient matrix of `features`
    pub fn affinity(features: ArrayView2<'a, f64>, n_clusters: usize, alpha: f64) -> Self {
        SscRequest {
            n_clusters,
            alpha,
            mode: SscMode::Affinity,
            seed: None,
            input: SscInput::Features(features),
        }
    }

    /// Requests cluster labels for `input`
    pub fn cluster(input: SscInput<'a>, n_clusters: usize, alpha: f64) -> Self {
        SscRequest {
            n_clusters,
            alpha,
            mode: SscMode::Cluster,
            seed: None,
            input,
        }
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Rejects requests the solver cannot serve
    pub fn validate(&self) -> Result<()> {
        let matrix = self.input.matrix();
        if self.n_clusters == 0 {
            return Err(EngineError::InvalidRequest(
                "number of clusters must be positive".to_string(),
            ));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(EngineError::InvalidRequest(format!(
                "alpha must be positive and finite, got {}",
                self.alpha
            )));
        }
        // MATLAB's rng only takes seeds below 2^32
        if let Some(seed) = self.seed.filter(|&seed| seed > u64::from(u32::MAX)) {
            return Err(EngineError::InvalidRequest(format!(
                "seed must be below 2^32, got {}",
                seed
            )));
        }
        if matrix.is_empty() {
            return Err(EngineError::InvalidRequest("input matrix is empty".to_string()));
        }
        if self.n_clusters > self.input.nsamples() {
            return Err(EngineError::InvalidRequest(format!(
                "{} clusters requested for {} samples",
                self.n_clusters,
                self.input.nsamples()
            )));
        }
        if let SscInput::Coefficients(c) = &self.input {
            if !c.is_square() {
                return Err(EngineError::InvalidRequest(format!(
                    "coefficient matrix must be square, got {:?}",
                    c.dim()
                )));
            }
            if self.mode == SscMode::Affinity {
                return Err(EngineError::InvalidRequest(
                    "the affinity of a precomputed coefficient matrix is the matrix itself"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Result of a solver call, matching the requested [`SscMode`]
#[derive(Debug, Clone, PartialEq)]
pub enum SscResponse {
    Coefficients(Array2<f64>),
    /// Zero-based cluster labels
    Labels(Labels),
}

impl SscResponse {
    pub fn into_coefficients(self) -> Result<Array2<f64>> {
        match self {
            SscResponse::Coefficients(c) => Ok(c),
            SscResponse::Labels(_) => Err(EngineError::UnexpectedResponse(
                "expected a coefficient matrix, got labels".to_string(),
            )),
        }
    }

    pub fn into_labels(self) -> Result<Labels> {
        match self {
            SscResponse::Labels(labels) => Ok(labels),
            SscResponse::Coefficients(_) => Err(EngineError::UnexpectedResponse(
                "expected labels, got a coefficient matrix".to_string(),
            )),
        }
    }
}

/// A host of the sparse subspace clustering solver
///
/// Taking `&mut self` guarantees at most one call in flight per engine.
pub trait SubspaceEngine {
    fn ssc(&mut self, request: SscRequest<'_>) -> Result<SscResponse>;
}

impl<E: SubspaceEngine + ?Sized> SubspaceEngine for Box<E> {
    fn ssc(&mut self, request: SscRequest<'_>) -> Result<SscResponse> {
        (**self).ssc(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn affinity_of_coefficients_is_rejected() {
        let c = Array2::<f64>::eye(3);
        let request = SscRequest {
            mode: SscMode::Affinity,
            ..SscRequest::cluster(SscInput::Coefficients(c.view()), 2, 20.0)
        };
        assert!(matches!(
            request.validate(),
            Err(EngineError::InvalidRequest(_))
        ));
    }

    #[test]
    fn coefficients_must_be_square() {
        let c = Array2::<f64>::zeros((3, 2));
        let request = SscRequest::cluster(SscInput::Coefficients(c.view()), 2, 20.0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn bad_scalars_are_rejected() {
        let x = array![[1., 0.], [0., 1.], [1., 1.]];
        assert!(SscRequest::affinity(x.view(), 0, 20.0).validate().is_err());
        assert!(SscRequest::affinity(x.view(), 2, 0.0).validate().is_err());
        assert!(SscRequest::affinity(x.view(), 2, f64::NAN).validate().is_err());
        assert!(SscRequest::affinity(x.view(), 4, 20.0).validate().is_err());
        assert!(SscRequest::affinity(x.view(), 2, 20.0).validate().is_ok());
    }

    #[test]
    fn seeds_fit_the_engine_generator() {
        let x = array![[1., 0.], [0., 1.], [1., 1.]];
        let request = |seed| SscRequest::affinity(x.view(), 2, 20.0).seed(Some(seed));

        assert!(request(0).validate().is_ok());
        assert!(request(u64::from(u32::MAX)).validate().is_ok());
        match request(1 << 32).validate() {
            Err(EngineError::InvalidRequest(message)) => assert!(message.contains("4294967296")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn responses_are_typed() {
        let labels = SscResponse::Labels(array![0, 1, 1]);
        assert!(labels.clone().into_coefficients().is_err());
        assert_eq!(labels.into_labels().unwrap(), array![0, 1, 1]);
    }
}
