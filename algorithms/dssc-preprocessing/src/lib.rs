//! # Preprocessing
//! `dssc-preprocessing` prepares image datasets for subspace clustering experiments.
//!
//! ## Current state
//!
//! Right now `dssc-preprocessing` provides the following steps:
//! * [`flatten`](reshape::flatten) and [`unflatten`](reshape::unflatten) between image batches
//!   and one row per sample
//! * [`rescale`](rescale::rescale): anti-aliased downsampling of large images followed by a
//!   dataset-wide mapping of intensities into `[-1, 1]`
//! * [`DenseSift`] descriptors behind the [`DescriptorExtractor`] trait
//! * deterministic Principal Component Analysis with [`Pca`]
//! * [`preprocess`](pipeline::preprocess): descriptors, projection and normalization in one go
//! * [`split_with_ratio`](split::split_with_ratio): a shuffled train/validation split

pub mod descriptor;
pub mod error;
pub mod pca;
pub mod pipeline;
pub mod rescale;
pub mod reshape;
pub mod resize;
pub mod split;

pub use descriptor::{DenseSift, DenseSiftParams, DescriptorExtractor};
pub use error::{PreprocessingError, Result};
pub use pca::{Pca, PcaParams, PcaValidParams};
pub use pipeline::{extract_descriptors, preprocess, DEFAULT_COMPONENTS};
pub use rescale::{normalize, rescale};
pub use reshape::{flatten, unflatten};
pub use resize::{resize, resize_batch};
pub use split::{split_with_ratio, Split};
