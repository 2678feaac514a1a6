use std::path::PathBuf;

use ndarray_npy::{ReadNpyError, WriteNpyError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("unsupported dataset file {0}, expected .npy, .csv or .csv.gz")]
    UnsupportedFormat(PathBuf),
    #[error("failed to read npy array: {0}")]
    ReadNpy(#[from] ReadNpyError),
    #[error("failed to write npy array: {0}")]
    WriteNpy(#[from] WriteNpyError),
    #[error("failed to read csv array: {0}")]
    ReadCsv(#[from] ndarray_csv::ReadError),
    #[error("{0} is not a valid label")]
    InvalidLabel(i64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    DsscError(#[from] dssc::error::Error),
}
