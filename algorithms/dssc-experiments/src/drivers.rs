//! End-to-end experiment runs
//!
//! Every driver receives its collaborators explicitly. The engine answers the sparse subspace
//! clustering requests and the autoencoder learns the hidden representation that gets clustered.
use dssc::dataset::n_clusters;
use dssc::metrics::{evaluate, Evaluation};
use dssc::progress::Progress;
use dssc::{Labels, ParamGuard};
use dssc_autoencoder::{train_embedding, Autoencoder, AutoencoderError, TrainingJob};
use dssc_engine::{SscInput, SscRequest, SubspaceEngine};
use dssc_preprocessing::PreprocessingError;
use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2};
use tracing::info;

use crate::error::Result;
use crate::hyperparams::{AeValidParams, ModelValidParams, SscValidParams};

/// Number of clusters to look for, checked against the samples
fn cluster_count<S, T>(records: &ArrayBase<S, Ix2>, labels: &ArrayBase<T, Ix1>) -> Result<usize>
where
    S: Data<Elem = f64>,
    T: Data<Elem = usize>,
{
    if records.nrows() == 0 {
        return Err(PreprocessingError::NotEnoughSamples.into());
    }
    if labels.len() != records.nrows() {
        return Err(dssc::error::Error::LabelLength(labels.len(), records.nrows()).into());
    }

    Ok(n_clusters(labels))
}

fn report(evaluation: Evaluation) -> Evaluation {
    info!(
        error_rate = evaluation.error_rate,
        one_minus_nmi = evaluation.one_minus_nmi,
        one_minus_ari = evaluation.one_minus_ari,
        "{}",
        evaluation
    );
    evaluation
}

/// Deep sparse subspace clustering
///
/// Unless the network learns `C` on its own, the solver first computes an affinity matrix of
/// the training samples with `alpha1`, optionally symmetrized to `C + C^T`. The autoencoder is
/// then trained with it. The final clustering runs with `alpha2` on the learned `C` if
/// `train_c` is set and on the innermost hidden layer otherwise.
pub fn run_model(
    engine: &mut dyn SubspaceEngine,
    trainer: &mut dyn Autoencoder,
    train: &Array2<f64>,
    validation: &Array2<f64>,
    labels: &Labels,
    params: &ModelValidParams,
) -> Result<Evaluation> {
    let k = cluster_count(train, labels)?;
    let progress = Progress::new(params.verbose());

    let affinity = if !params.train_c() || params.give_c() {
        let stage = progress.stage("Finding affinity matrix");
        let c = engine
            .ssc(SscRequest::affinity(train.view(), k, params.alpha1()).seed(params.seed()))?
            .into_coefficients()?;
        stage.finish();

        Some(if params.symm_c() { &c + &c.t() } else { c })
    } else {
        None
    };

    let stage = progress.stage("Training Autoencoder");
    let autoencoder = params.autoencoder().check()?;
    let job = TrainingJob::new(train.view(), validation.view(), &autoencoder)
        .coefficients(affinity.as_ref().map(|c| c.view()));
    let trained = train_embedding(trainer, job)?;
    stage.finish();

    let stage = progress.stage("Clustering with SSC");
    let input = if params.train_c() {
        let c = trained
            .coefficients
            .as_ref()
            .ok_or(AutoencoderError::MissingCoefficients)?;
        SscInput::Coefficients(c.view())
    } else {
        SscInput::Features(trained.embedding.view())
    };
    let labels_pred = engine
        .ssc(SscRequest::cluster(input, k, params.alpha2()).seed(params.seed()))?
        .into_labels()?;
    stage.finish();

    Ok(report(evaluate(labels, &labels_pred)?))
}

/// Plain autoencoder followed by sparse subspace clustering of its hidden layer
pub fn run_ae(
    engine: &mut dyn SubspaceEngine,
    trainer: &mut dyn Autoencoder,
    train: &Array2<f64>,
    validation: &Array2<f64>,
    labels: &Labels,
    params: &AeValidParams,
) -> Result<Evaluation> {
    let k = cluster_count(train, labels)?;
    let progress = Progress::new(params.verbose());

    let stage = progress.stage("Training Autoencoder");
    let autoencoder = params.autoencoder().check()?;
    let trained = train_embedding(
        trainer,
        TrainingJob::new(train.view(), validation.view(), &autoencoder),
    )?;
    stage.finish();

    let stage = progress.stage("Clustering with SSC");
    let labels_pred = engine
        .ssc(
            SscRequest::cluster(
                SscInput::Features(trained.embedding.view()),
                k,
                params.alpha2(),
            )
            .seed(params.seed()),
        )?
        .into_labels()?;
    stage.finish();

    Ok(report(evaluate(labels, &labels_pred)?))
}

/// Sparse subspace clustering of the features themselves
pub fn run_ssc(
    engine: &mut dyn SubspaceEngine,
    features: &Array2<f64>,
    labels: &Labels,
    params: &SscValidParams,
) -> Result<Evaluation> {
    let k = cluster_count(features, labels)?;
    let progress = Progress::new(params.verbose());

    let stage = progress.stage("Clustering with SSC");
    let labels_pred = engine
        .ssc(
            SscRequest::cluster(SscInput::Features(features.view()), k, params.alpha())
                .seed(params.seed()),
        )?
        .into_labels()?;
    stage.finish();

    Ok(report(evaluate(labels, &labels_pred)?))
}
