//! Error definitions for the engine client
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    #[error("Unknown ENGINE_CHOICE: {0}")]
    UnknownEngine(String),
    #[error("invalid engine configuration: {0}")]
    Config(String),
    #[error("failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid solver request: {0}")]
    InvalidRequest(String),
    #[error("engine reported an error: {0}")]
    Engine(String),
    #[error("unexpected engine response: {0}")]
    UnexpectedResponse(String),
    #[error("engine closed its output stream")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    DsscError(#[from] dssc::error::Error),
}
