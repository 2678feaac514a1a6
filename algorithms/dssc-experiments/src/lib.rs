//! # Experiment drivers
//!
//! `dssc-experiments` wires the workspace together. The drivers [`run_model`], [`run_ae`] and
//! [`run_ssc`] take a [`SubspaceEngine`](dssc_engine::SubspaceEngine) and, where needed, an
//! [`Autoencoder`](dssc_autoencoder::Autoencoder), run one experiment and score the predicted
//! clustering against the ground truth. [`prepare`] turns a labelled image dataset into the
//! partitioned feature set the drivers consume.
//!
//! The `dssc` binary exposes all of this on the command line.

mod drivers;
mod error;
mod hyperparams;
mod prepare;

pub use drivers::{run_ae, run_model, run_ssc};
pub use error::{ExperimentError, Result};
pub use hyperparams::{
    AeParams, AeValidParams, ModelParams, ModelValidParams, SscParams, SscValidParams,
    DEFAULT_ALPHA,
};
pub use prepare::{merged, prepare, Features};
