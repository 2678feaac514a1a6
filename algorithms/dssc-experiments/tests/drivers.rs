use approx::assert_abs_diff_eq;
use dssc::param_guard::ParamGuard;
use dssc::Labels;
use dssc_autoencoder::{Autoencoder, TrainedEmbedding, TrainingJob};
use dssc_datasets::generate::blobs;
use dssc_engine::{SscMode, SscRequest, SscResponse, SubspaceEngine};
use dssc_experiments::{run_ae, run_model, run_ssc, AeParams, ModelParams, SscParams};
use ndarray::{array, s, Array1, Array2, ArrayView2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

const BANDWIDTH: f64 = 10.0;

fn kernel(records: &ArrayView2<f64>) -> Array2<f64> {
    let n = records.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| {
        let d = &records.row(i) - &records.row(j);
        (-d.dot(&d) / (2.0 * BANDWIDTH * BANDWIDTH)).exp()
    })
}

/// Greedy farthest-point k-center clustering of the rows
fn k_center(records: &ArrayView2<f64>, k: usize) -> Labels {
    let distance = |a: usize, b: usize| {
        let d = &records.row(a) - &records.row(b);
        d.dot(&d)
    };

    let n = records.nrows();
    let mut centers = vec![0];
    while centers.len() < k {
        let next = (0..n)
            .max_by(|&a, &b| {
                let da = centers.iter().map(|&c| distance(a, c)).fold(f64::MAX, f64::min);
                let db = centers.iter().map(|&c| distance(b, c)).fold(f64::MAX, f64::min);
                da.total_cmp(&db)
            })
            .unwrap();
        centers.push(next);
    }

    Array1::from_shape_fn(n, |i| {
        (0..k)
            .min_by(|&a, &b| distance(i, centers[a]).total_cmp(&distance(i, centers[b])))
            .unwrap()
    })
}

/// Stands in for the solver: a Gaussian kernel as affinity and k-center clustering of the rows
#[derive(Default)]
struct KCenterEngine {
    modes: Vec<SscMode>,
}

impl SubspaceEngine for KCenterEngine {
    fn ssc(&mut self, request: SscRequest<'_>) -> dssc_engine::Result<SscResponse> {
        request.validate()?;
        self.modes.push(request.mode);

        let records = request.input.matrix();
        Ok(match request.mode {
            SscMode::Affinity => SscResponse::Coefficients(kernel(records)),
            SscMode::Cluster => SscResponse::Labels(k_center(records, request.n_clusters)),
        })
    }
}

/// Embeds the samples into their leading coordinates
struct Leading;

impl Autoencoder for Leading {
    fn train(&mut self, job: TrainingJob<'_>) -> dssc_autoencoder::Result<TrainedEmbedding> {
        let dim = job.params.embedding_dim().min(job.train.ncols());
        let embedding = job.train.slice(s![.., ..dim]).to_owned();
        let coefficients = if job.params.train_c() {
            Some(match job.coefficients {
                Some(c) => c.to_owned(),
                None => kernel(&embedding.view()),
            })
        } else {
            None
        };

        Ok(TrainedEmbedding {
            embedding,
            coefficients,
        })
    }
}

fn dataset(seed: u64) -> (Array2<f64>, Array2<f64>, Labels) {
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    let centroids = array![[0., 0., 0.], [50., 0., 10.], [100., 50., 0.]];
    let (train, labels) = blobs(20, &centroids, &mut rng);
    let (validation, _) = blobs(4, &centroids, &mut rng);

    (train, validation, labels)
}

#[test]
fn ssc_separates_two_blobs() {
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let (features, labels) = blobs(25, &array![[0., 0.], [60., 60.]], &mut rng);

    let mut engine = KCenterEngine::default();
    let params = SscParams::default().seed(Some(1)).verbose(false).check().unwrap();
    let evaluation = run_ssc(&mut engine, &features, &labels, &params).unwrap();

    let (error_rate, one_minus_nmi, one_minus_ari) = evaluation.as_tuple();
    assert_abs_diff_eq!(error_rate, 0.0);
    assert_abs_diff_eq!(one_minus_nmi, 0.0, epsilon = 1e-10);
    assert_abs_diff_eq!(one_minus_ari, 0.0, epsilon = 1e-10);
    assert_eq!(engine.modes, vec![SscMode::Cluster]);
}

#[test]
fn model_clusters_the_embedding() {
    let (train, validation, labels) = dataset(7);

    let mut engine = KCenterEngine::default();
    let params = ModelParams::new(vec![16, 2])
        .symm_c(true)
        .verbose(false)
        .check()
        .unwrap();
    let evaluation = run_model(
        &mut engine,
        &mut Leading,
        &train,
        &validation,
        &labels,
        &params,
    )
    .unwrap();

    assert_abs_diff_eq!(evaluation.error_rate, 0.0);
    assert_eq!(engine.modes, vec![SscMode::Affinity, SscMode::Cluster]);
}

#[test]
fn model_clusters_learned_coefficients() {
    let (train, validation, labels) = dataset(8);

    let mut engine = KCenterEngine::default();
    let params = ModelParams::new(vec![3])
        .train_c(true)
        .verbose(false)
        .check()
        .unwrap();
    let evaluation = run_model(
        &mut engine,
        &mut Leading,
        &train,
        &validation,
        &labels,
        &params,
    )
    .unwrap();

    assert_abs_diff_eq!(evaluation.one_minus_ari, 0.0, epsilon = 1e-10);
    assert_eq!(engine.modes, vec![SscMode::Cluster]);
}

#[test]
fn autoencoder_alone_clusters_the_embedding() {
    let (train, validation, labels) = dataset(9);

    let mut engine = KCenterEngine::default();
    let params = AeParams::new(vec![8, 2]).verbose(false).check().unwrap();
    let evaluation = run_ae(
        &mut engine,
        &mut Leading,
        &train,
        &validation,
        &labels,
        &params,
    )
    .unwrap();

    assert_abs_diff_eq!(evaluation.one_minus_nmi, 0.0, epsilon = 1e-10);
    assert_eq!(engine.modes, vec![SscMode::Cluster]);
}
