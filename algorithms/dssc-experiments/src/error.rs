use dssc_autoencoder::{AutoencoderError, AutoencoderParamsError};
use dssc_datasets::DatasetError;
use dssc_engine::EngineError;
use dssc_preprocessing::PreprocessingError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExperimentError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ExperimentError {
    #[error("invalid experiment parameter: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Autoencoder(#[from] AutoencoderError),
    #[error(transparent)]
    AutoencoderParams(#[from] AutoencoderParamsError),
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    DsscError(#[from] dssc::error::Error),
}
