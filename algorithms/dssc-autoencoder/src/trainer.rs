use ndarray::{Array2, ArrayView2};

use crate::error::{AutoencoderError, Result};
use crate::hyperparams::AutoencoderValidParams;

/// Everything a trainer needs for one training run
#[derive(Debug, Clone)]
pub struct TrainingJob<'a> {
    /// Training samples, one per row
    pub train: ArrayView2<'a, f64>,
    /// Validation samples used for early stopping
    pub validation: ArrayView2<'a, f64>,
    /// Precomputed coefficient matrix over the training samples
    pub coefficients: Option<ArrayView2<'a, f64>>,
    pub params: &'a AutoencoderValidParams,
}

impl<'a> TrainingJob<'a> {
    pub fn new(
        train: ArrayView2<'a, f64>,
        validation: ArrayView2<'a, f64>,
        params: &'a AutoencoderValidParams,
    ) -> Self {
        TrainingJob {
            train,
            validation,
            coefficients: None,
            params,
        }
    }

    pub fn coefficients(mut self, coefficients: Option<ArrayView2<'a, f64>>) -> Self {
        self.coefficients = coefficients;
        self
    }

    /// Checks that the matrices fit together
    pub fn validate(&self) -> Result<()> {
        let (n, d) = self.train.dim();
        if n == 0 || d == 0 {
            return Err(AutoencoderError::NotEnoughSamples);
        }
        if self.validation.ncols() != d {
            return Err(AutoencoderError::FeatureMismatch {
                expected: d,
                found: self.validation.ncols(),
            });
        }
        if let Some(c) = &self.coefficients {
            if c.dim() != (n, n) {
                return Err(AutoencoderError::CoefficientShape {
                    expected: n,
                    found: c.dim(),
                });
            }
        }

        Ok(())
    }
}

/// Output of a training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedEmbedding {
    /// Hidden representation of the training samples, one row per sample
    pub embedding: Array2<f64>,
    /// Coefficient matrix learned together with the network
    pub coefficients: Option<Array2<f64>>,
}

/// A deep subspace clustering autoencoder
///
/// Implementations train the network described by the job's parameters and return the innermost
/// hidden layer for the training samples.
pub trait Autoencoder {
    fn train(&mut self, job: TrainingJob<'_>) -> Result<TrainedEmbedding>;
}

impl<A: Autoencoder + ?Sized> Autoencoder for Box<A> {
    fn train(&mut self, job: TrainingJob<'_>) -> Result<TrainedEmbedding> {
        (**self).train(job)
    }
}

/// Validates `job`, runs `trainer` and checks what it returned
pub fn train_embedding<A>(trainer: &mut A, job: TrainingJob<'_>) -> Result<TrainedEmbedding>
where
    A: Autoencoder + ?Sized,
{
    job.validate()?;
    let n = job.train.nrows();
    let train_c = job.params.train_c();

    let trained = trainer.train(job)?;
    if trained.embedding.nrows() != n {
        return Err(AutoencoderError::EmbeddingShape {
            expected: n,
            found: trained.embedding.nrows(),
        });
    }
    match &trained.coefficients {
        None if train_c => Err(AutoencoderError::MissingCoefficients),
        Some(c) if c.dim() != (n, n) => Err(AutoencoderError::CoefficientShape {
            expected: n,
            found: c.dim(),
        }),
        _ => Ok(trained),
    }
}
