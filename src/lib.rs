//! `dssc` is the core of a small toolkit for running deep sparse subspace clustering
//! experiments.
//!
//! The heavy lifting happens elsewhere: the sparse subspace clustering solver runs inside an
//! external numeric engine (MATLAB or GNU Octave) and the autoencoder is trained by an external
//! program. What lives in this workspace is everything around them:
//!
//! * image batches, label vectors and the binary [container] used to exchange matrices with
//!   the engine and the autoencoder trainer,
//! * the clustering [metrics] used to score an experiment,
//! * hyperparameter checking through [`ParamGuard`] and verbose [progress] reporting.
//!
//! Preprocessing, the engine client, the autoencoder adapter and the experiment drivers live in
//! the `dssc-preprocessing`, `dssc-engine`, `dssc-autoencoder` and `dssc-experiments` crates.
//!

pub mod container;
pub mod dataset;
pub mod error;
mod hungarian;
mod metrics_clustering;
pub mod param_guard;
pub mod prelude;
pub mod progress;
pub mod traits;

pub use dataset::{ImageBatch, Labels};
pub use metrics_clustering::{evaluate, Evaluation};
pub use param_guard::ParamGuard;

/// Agreement metrics between clusterings
pub mod metrics {
    pub use crate::metrics_clustering::{
        adjusted_rand_index, error_rate, evaluate, normalized_mutual_info, ContingencyTable,
        Evaluation,
    };
}
