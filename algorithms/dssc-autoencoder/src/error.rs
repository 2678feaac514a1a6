use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutoencoderError>;

/// Invalid autoencoder hyperparameters
#[derive(Error, Debug)]
pub enum AutoencoderParamsError {
    #[error("at least one hidden layer is needed")]
    NoHiddenLayers,
    #[error("hidden layer {0} has zero units")]
    EmptyHiddenLayer(usize),
    #[error("learning rate must be positive and finite, got {0}")]
    LearningRate(f64),
    #[error("{0} must be non-negative and finite, got {1}")]
    Regularization(&'static str, f64),
    #[error("{0} must be positive")]
    ZeroCount(&'static str),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AutoencoderError {
    #[error(transparent)]
    InvalidParams(#[from] AutoencoderParamsError),
    #[error("training data is empty")]
    NotEnoughSamples,
    #[error("validation data has {found} features, training data {expected}")]
    FeatureMismatch { expected: usize, found: usize },
    #[error("coefficient matrix of shape {found:?} does not match {expected} training samples")]
    CoefficientShape {
        expected: usize,
        found: (usize, usize),
    },
    #[error("embedding has {found} rows for {expected} training samples")]
    EmbeddingShape { expected: usize, found: usize },
    #[error("trainer was asked to learn C but returned none")]
    MissingCoefficients,
    #[error("trainer exited with {0}")]
    Trainer(std::process::ExitStatus),
    #[error("failed to launch trainer {program:?}: {source}")]
    Spawn {
        program: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    DsscError(#[from] dssc::error::Error),
}
