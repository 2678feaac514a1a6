//! # Engine client
//!
//! `dssc-engine` talks to the sparse subspace clustering solver `SSC_modified`, which runs inside
//! MATLAB or GNU Octave. The engine is chosen through [`EngineKind`], usually from the
//! `ENGINE_CHOICE` environment variable, and configured with [`EngineConfig`].
//!
//! Solver calls are explicit [`SscRequest`]s answered by an [`SscResponse`]. Any type
//! implementing [`SubspaceEngine`] can serve them; [`ProcessEngine`] launches the engine as a
//! child process and keeps it running for the lifetime of the handle.
//!
//! ```no_run
//! use dssc::param_guard::ParamGuard;
//! use dssc_engine::{EngineConfig, EngineKind, ProcessEngine, SscRequest, SubspaceEngine};
//! use ndarray::array;
//!
//! # fn main() -> Result<(), dssc_engine::EngineError> {
//! let config = EngineConfig::params(EngineKind::from_env()?).check()?;
//! let mut engine = ProcessEngine::start(config)?;
//!
//! let features = array![[0., 1.], [0., 2.], [1., 0.], [2., 0.]];
//! let c = engine
//!     .ssc(SscRequest::affinity(features.view(), 2, 20.0))?
//!     .into_coefficients()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod kind;
mod process;
mod request;
pub mod script;
mod session;

pub use client::{EngineClient, Staging};
pub use config::{EngineConfig, EngineParams, OutputPolicy};
pub use error::{EngineError, Result};
pub use kind::{EngineKind, ENGINE_VAR};
pub use process::ProcessEngine;
pub use request::{SscInput, SscMode, SscRequest, SscResponse, SubspaceEngine};
pub use session::Session;
