//! # Autoencoder collaborator
//!
//! Deep subspace clustering trains an autoencoder whose innermost hidden layer is then clustered
//! by the sparse subspace clustering solver. Training happens outside of this workspace; this
//! crate describes a training run ([`TrainingJob`] with [`AutoencoderParams`]), defines the
//! [`Autoencoder`] trait any trainer implements and provides [`CommandTrainer`], which delegates
//! to an external program.

mod command;
mod error;
mod hyperparams;
mod trainer;

pub use command::{
    CommandTrainer, COEFFICIENTS_IN_FILE, COEFFICIENTS_OUT_FILE, EMBEDDING_FILE, PARAMS_FILE,
    TRAIN_FILE, VALIDATION_FILE,
};
pub use error::{AutoencoderError, AutoencoderParamsError, Result};
pub use hyperparams::{Activation, AutoencoderParams, AutoencoderValidParams, Optimizer};
pub use trainer::{train_embedding, Autoencoder, TrainedEmbedding, TrainingJob};
