use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueHint};
use dssc::param_guard::ParamGuard;
use dssc::Evaluation;
use dssc_autoencoder::CommandTrainer;
use dssc_datasets::Partitioned;
use dssc_engine::{EngineConfig, EngineKind, OutputPolicy, ProcessEngine, ENGINE_VAR};
use dssc_experiments::{
    merged, prepare, run_ae, run_model, run_ssc, AeParams, Features, ModelParams, SscParams,
    DEFAULT_ALPHA,
};
use dssc_preprocessing::{DenseSift, DEFAULT_COMPONENTS};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dssc",
    author,
    version,
    about = "Deep sparse subspace clustering experiments"
)]
struct Cli {
    /// Numeric engine hosting the SSC solver
    #[arg(long, global = true, env = ENGINE_VAR, default_value = "MATLAB")]
    engine: EngineKind,

    /// Engine executable, instead of `matlab` or `octave` on the PATH
    #[arg(long, global = true, value_hint = ValueHint::ExecutablePath)]
    engine_exe: Option<PathBuf>,

    /// Directory holding the SSC solver scripts
    #[arg(long, global = true, default_value = "./SSC_ADMM_v1.1", value_hint = ValueHint::DirPath)]
    solver_dir: PathBuf,

    /// Only report warnings and the final scores
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute features of a labelled image dataset and hold out a validation part
    Prepare(PrepareArgs),

    /// Train a deep subspace clustering autoencoder and cluster its result
    Model(ModelArgs),

    /// Train a plain autoencoder and cluster its hidden layer
    Ae(AeArgs),

    /// Cluster features directly
    Ssc(SscArgs),

    /// Score predicted labels against the ground truth
    Evaluate(EvaluateArgs),
}

#[derive(Args)]
struct PrepareArgs {
    /// Image batch with the sample axis first
    #[arg(long, value_hint = ValueHint::FilePath)]
    images: PathBuf,

    /// Ground truth labels of the images
    #[arg(long, value_hint = ValueHint::FilePath)]
    labels: PathBuf,

    /// Directory receiving X.npy, Y.npy, X_val.npy and Y_val.npy
    #[arg(long, value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,

    /// Fraction of the samples held out for validation
    #[arg(long, default_value_t = 0.2)]
    validation: f32,

    #[arg(long)]
    seed: Option<u64>,

    /// Use dense descriptors reduced by PCA instead of rescaled pixels
    #[arg(long)]
    dsift: bool,

    /// Principal components kept with --dsift
    #[arg(long, default_value_t = DEFAULT_COMPONENTS)]
    components: usize,
}

#[derive(Args)]
struct TrainerArgs {
    /// Directory written by `dssc prepare`
    #[arg(long, value_hint = ValueHint::DirPath)]
    data_dir: PathBuf,

    /// Sizes of the encoder's hidden layers, innermost last
    #[arg(long, value_delimiter = ',', required = true)]
    hidden_dims: Vec<usize>,

    /// Program training the autoencoder, called with its work directory as last argument
    #[arg(long, value_hint = ValueHint::CommandName)]
    trainer: PathBuf,

    /// Arguments passed to the trainer before the work directory
    #[arg(long = "trainer-arg", allow_hyphen_values = true)]
    trainer_args: Vec<String>,

    /// Keep the trainer's files in this directory
    #[arg(long, value_hint = ValueHint::DirPath)]
    work_dir: Option<PathBuf>,

    /// Pre-trained weights to start from
    #[arg(long, value_hint = ValueHint::FilePath)]
    load_path: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 10000)]
    epochs: usize,

    #[arg(long, default_value_t = 0.001)]
    lr: f64,

    #[arg(long, default_value_t = 100)]
    batch_num: usize,

    /// Weight regularization
    #[arg(long, default_value_t = 1e-3)]
    lambda2: f64,

    /// Solver regularization of the final clustering
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha2: f64,
}

impl TrainerArgs {
    fn trainer(&self) -> CommandTrainer {
        let trainer = CommandTrainer::new(&self.trainer).args(&self.trainer_args);
        match &self.work_dir {
            Some(dir) => trainer.work_dir(dir),
            None => trainer,
        }
    }
}

#[derive(Args)]
struct ModelArgs {
    #[command(flatten)]
    common: TrainerArgs,

    /// Solver regularization of the initial affinity
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha1: f64,

    /// Self-expressiveness weight
    #[arg(long, default_value_t = 1e-4)]
    lambda1: f64,

    /// Sparsity weight of a learned C
    #[arg(long, default_value_t = 0.0)]
    lambda3: f64,

    /// Learn C together with the network and cluster it
    #[arg(long)]
    train_c: bool,

    /// Compute the initial affinity even when learning C
    #[arg(long)]
    give_c: bool,

    /// Symmetrize the initial affinity
    #[arg(long)]
    symm_c: bool,
}

#[derive(Args)]
struct AeArgs {
    #[command(flatten)]
    common: TrainerArgs,
}

#[derive(Args)]
struct SscArgs {
    /// Feature matrix, one sample per row
    #[arg(long, value_hint = ValueHint::FilePath, required_unless_present = "data_dir")]
    features: Option<PathBuf>,

    #[arg(long, value_hint = ValueHint::FilePath, requires = "features")]
    labels: Option<PathBuf>,

    /// Cluster both parts of a directory written by `dssc prepare`
    #[arg(long, value_hint = ValueHint::DirPath, conflicts_with = "features")]
    data_dir: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    alpha: f64,
}

#[derive(Args)]
struct EvaluateArgs {
    #[arg(long, value_hint = ValueHint::FilePath)]
    labels: PathBuf,

    #[arg(long, value_hint = ValueHint::FilePath)]
    predicted: PathBuf,
}

impl Cli {
    fn start_engine(&self) -> Result<ProcessEngine> {
        let params = EngineConfig::params(self.engine)
            .solver_dir(&self.solver_dir)
            .output(OutputPolicy::from_verbose(!self.quiet));
        let params = match &self.engine_exe {
            Some(exe) => params.executable(exe),
            None => params,
        };

        ProcessEngine::start(params.check()?)
            .with_context(|| format!("failed to start {}", self.engine))
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print(evaluation: Evaluation) {
    let (error_rate, one_minus_nmi, one_minus_ari) = evaluation.as_tuple();
    println!("{} {} {}", error_rate, one_minus_nmi, one_minus_ari);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet);
    let verbose = !cli.quiet;

    match &cli.command {
        Command::Prepare(args) => {
            let (images, labels) = dssc_datasets::load_labelled(&args.images, &args.labels)
                .context("failed to load the image dataset")?;
            let mut rng = match args.seed {
                Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
                None => Xoshiro256Plus::from_entropy(),
            };

            let extractor = DenseSift::default();
            let features = if args.dsift {
                Features::Descriptors {
                    extractor: &extractor,
                    n_components: args.components,
                }
            } else {
                Features::Pixels
            };
            let dataset = prepare(&images, &labels, features, 1.0 - args.validation, &mut rng)?;
            dataset.save(&args.out_dir)?;
            info!(out_dir = ?args.out_dir, "dataset written");
        }
        Command::Model(args) => {
            let common = &args.common;
            let dataset = Partitioned::load(&common.data_dir)?;
            let params = ModelParams::new(common.hidden_dims.clone())
                .load_path(common.load_path.clone())
                .seed(common.seed)
                .epochs(common.epochs)
                .learning_rate(common.lr)
                .batch_num(common.batch_num)
                .alpha1(args.alpha1)
                .lambda1(args.lambda1)
                .lambda2(common.lambda2)
                .lambda3(args.lambda3)
                .alpha2(common.alpha2)
                .train_c(args.train_c)
                .give_c(args.give_c)
                .symm_c(args.symm_c)
                .verbose(verbose)
                .check()?;

            let mut engine = cli.start_engine()?;
            let evaluation = run_model(
                &mut engine,
                &mut common.trainer(),
                &dataset.train,
                &dataset.validation,
                &dataset.labels,
                &params,
            )?;
            print(evaluation);
        }
        Command::Ae(args) => {
            let common = &args.common;
            let dataset = Partitioned::load(&common.data_dir)?;
            let params = AeParams::new(common.hidden_dims.clone())
                .load_path(common.load_path.clone())
                .seed(common.seed)
                .epochs(common.epochs)
                .learning_rate(common.lr)
                .batch_num(common.batch_num)
                .lambda2(common.lambda2)
                .alpha2(common.alpha2)
                .verbose(verbose)
                .check()?;

            let mut engine = cli.start_engine()?;
            let evaluation = run_ae(
                &mut engine,
                &mut common.trainer(),
                &dataset.train,
                &dataset.validation,
                &dataset.labels,
                &params,
            )?;
            print(evaluation);
        }
        Command::Ssc(args) => {
            let (features, labels) = match (&args.data_dir, &args.features, &args.labels) {
                (Some(dir), _, _) => merged(&Partitioned::load(dir)?)?,
                (None, Some(features), Some(labels)) => (
                    dssc_datasets::load_features(features)?,
                    dssc_datasets::load_labels(labels)?,
                ),
                _ => anyhow::bail!("--features needs --labels"),
            };
            let params = SscParams::default()
                .seed(args.seed)
                .alpha(args.alpha)
                .verbose(verbose)
                .check()?;

            let mut engine = cli.start_engine()?;
            print(run_ssc(&mut engine, &features, &labels, &params)?);
        }
        Command::Evaluate(args) => {
            let labels = dssc_datasets::load_labels(&args.labels)?;
            let predicted = dssc_datasets::load_labels(&args.predicted)?;
            print(dssc::evaluate(&labels, &predicted)?);
        }
    }

    Ok(())
}
