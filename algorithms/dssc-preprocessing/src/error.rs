//! Error definitions for preprocessing
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreprocessingError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PreprocessingError {
    #[error("at least 1 sample needed")]
    NotEnoughSamples,
    #[error("resizing supports single-channel images only, found {0} channels")]
    MultiChannel(usize),
    #[error("target shape {0:?} has an empty axis")]
    EmptyTarget((usize, usize)),
    #[error("image of shape {0:?} is smaller than a {1}x{1} descriptor patch")]
    ImageTooSmall((usize, usize), usize),
    #[error("descriptor of length {found} differs from the first descriptor of length {expected}")]
    DescriptorLength { expected: usize, found: usize },
    #[error("target dimension of the projection must be positive")]
    NonPositiveEmbeddingSize,
    #[error("embedding size {0} exceeds min(n_samples, n_features) = {1}")]
    EmbeddingTooLarge(usize, usize),
    #[error("split ratio must lie in (0, 1), got {0}")]
    InvalidRatio(f32),
    #[error("descriptor patch size must be a positive multiple of 4, got {0}")]
    InvalidPatchSize(usize),
    #[error("descriptor step must be positive")]
    InvalidStep,
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    #[error(transparent)]
    DsscError(#[from] dssc::error::Error),
}
