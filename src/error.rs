//! Error types in dssc
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("label vector of length {0} does not match length {1}")]
    LabelLength(usize, usize),
    #[error("at least one labelled sample is needed")]
    NotEnoughSamples,
    #[error("expected a {expected}-dimensional array, found {found} dimensions")]
    Dimension { expected: usize, found: usize },
    #[error("malformed interchange container: {0}")]
    Container(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
