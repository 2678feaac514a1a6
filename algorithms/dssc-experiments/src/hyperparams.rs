use std::path::{Path, PathBuf};

use dssc::param_guard::ParamGuard;
use dssc_autoencoder::AutoencoderParams;

use crate::error::{ExperimentError, Result};

/// Regularization strength of the solver when none is given
pub const DEFAULT_ALPHA: f64 = 20.0;

fn check_alpha(name: &str, alpha: f64) -> Result<()> {
    if alpha.is_finite() && alpha > 0.0 {
        Ok(())
    } else {
        Err(ExperimentError::InvalidParams(format!(
            "{} must be positive and finite, got {}",
            name, alpha
        )))
    }
}

/// Checked parameters of a full deep subspace clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelValidParams {
    hidden_dims: Vec<usize>,
    load_path: Option<PathBuf>,
    seed: Option<u64>,
    epochs: usize,
    learning_rate: f64,
    batch_num: usize,
    alpha1: f64,
    lambda1: f64,
    lambda2: f64,
    lambda3: f64,
    alpha2: f64,
    train_c: bool,
    give_c: bool,
    symm_c: bool,
    verbose: bool,
}

impl ModelValidParams {
    /// Hyperparameters handed to the autoencoder
    pub fn autoencoder(&self) -> AutoencoderParams {
        AutoencoderParams::new(self.hidden_dims.clone())
            .load_path(self.load_path.clone())
            .seed(self.seed)
            .epochs(self.epochs)
            .learning_rate(self.learning_rate)
            .batch_num(self.batch_num)
            .lambda1(self.lambda1)
            .lambda2(self.lambda2)
            .lambda3(self.lambda3)
            .train_c(self.train_c)
            .verbose(self.verbose)
    }

    pub fn hidden_dims(&self) -> &[usize] {
        &self.hidden_dims
    }

    pub fn load_path(&self) -> Option<&Path> {
        self.load_path.as_deref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Solver regularization when computing the initial affinity
    pub fn alpha1(&self) -> f64 {
        self.alpha1
    }

    /// Solver regularization of the final clustering
    pub fn alpha2(&self) -> f64 {
        self.alpha2
    }

    /// Learn `C` together with the network and cluster it instead of the embedding
    pub fn train_c(&self) -> bool {
        self.train_c
    }

    /// Also compute the initial affinity when `C` is learned
    pub fn give_c(&self) -> bool {
        self.give_c
    }

    /// Symmetrize the initial affinity to `C + C^T`
    pub fn symm_c(&self) -> bool {
        self.symm_c
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Parameters of `run_model`
///
/// Defaults: `epochs=10000`, `lr=0.001`, `batch_num=100`, `alpha1=20`, `lambda1=1e-4`,
/// `lambda2=1e-3`, `lambda3=0`, `alpha2=20`, `train_c=false`, `give_c=false`, `symm_c=false`,
/// `verbose=true` and no seed.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams(ModelValidParams);

impl ModelParams {
    pub fn new(hidden_dims: Vec<usize>) -> Self {
        ModelParams(ModelValidParams {
            hidden_dims,
            load_path: None,
            seed: None,
            epochs: 10000,
            learning_rate: 0.001,
            batch_num: 100,
            alpha1: DEFAULT_ALPHA,
            lambda1: 1e-4,
            lambda2: 1e-3,
            lambda3: 0.0,
            alpha2: DEFAULT_ALPHA,
            train_c: false,
            give_c: false,
            symm_c: false,
            verbose: true,
        })
    }

    /// Start the autoencoder from pre-trained weights
    pub fn load_path(mut self, load_path: Option<PathBuf>) -> Self {
        self.0.load_path = load_path;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.0.seed = seed;
        self
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.0.epochs = epochs;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.0.learning_rate = learning_rate;
        self
    }

    pub fn batch_num(mut self, batch_num: usize) -> Self {
        self.0.batch_num = batch_num;
        self
    }

    pub fn alpha1(mut self, alpha1: f64) -> Self {
        self.0.alpha1 = alpha1;
        self
    }

    pub fn lambda1(mut self, lambda1: f64) -> Self {
        self.0.lambda1 = lambda1;
        self
    }

    pub fn lambda2(mut self, lambda2: f64) -> Self {
        self.0.lambda2 = lambda2;
        self
    }

    pub fn lambda3(mut self, lambda3: f64) -> Self {
        self.0.lambda3 = lambda3;
        self
    }

    pub fn alpha2(mut self, alpha2: f64) -> Self {
        self.0.alpha2 = alpha2;
        self
    }

    pub fn train_c(mut self, train_c: bool) -> Self {
        self.0.train_c = train_c;
        self
    }

    pub fn give_c(mut self, give_c: bool) -> Self {
        self.0.give_c = give_c;
        self
    }

    pub fn symm_c(mut self, symm_c: bool) -> Self {
        self.0.symm_c = symm_c;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.0.verbose = verbose;
        self
    }
}

impl ParamGuard for ModelParams {
    type Checked = ModelValidParams;
    type Error = ExperimentError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        self.0.autoencoder().check()?;
        check_alpha("alpha1", self.0.alpha1)?;
        check_alpha("alpha2", self.0.alpha2)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Checked parameters of a plain autoencoder run
#[derive(Debug, Clone, PartialEq)]
pub struct AeValidParams {
    hidden_dims: Vec<usize>,
    load_path: Option<PathBuf>,
    seed: Option<u64>,
    epochs: usize,
    learning_rate: f64,
    batch_num: usize,
    lambda2: f64,
    alpha2: f64,
    verbose: bool,
}

impl AeValidParams {
    /// Hyperparameters handed to the autoencoder
    ///
    /// The network never learns `C` and only the weight regularization applies.
    pub fn autoencoder(&self) -> AutoencoderParams {
        AutoencoderParams::new(self.hidden_dims.clone())
            .load_path(self.load_path.clone())
            .seed(self.seed)
            .epochs(self.epochs)
            .learning_rate(self.learning_rate)
            .batch_num(self.batch_num)
            .lambda1(0.0)
            .lambda2(self.lambda2)
            .lambda3(0.0)
            .train_c(false)
            .verbose(self.verbose)
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn alpha2(&self) -> f64 {
        self.alpha2
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Parameters of `run_ae`
///
/// Defaults: `epochs=10000`, `lr=0.001`, `batch_num=100`, `lambda2=1e-3`, `alpha2=20`,
/// `verbose=true` and no seed.
#[derive(Debug, Clone, PartialEq)]
pub struct AeParams(AeValidParams);

impl AeParams {
    pub fn new(hidden_dims: Vec<usize>) -> Self {
        AeParams(AeValidParams {
            hidden_dims,
            load_path: None,
            seed: None,
            epochs: 10000,
            learning_rate: 0.001,
            batch_num: 100,
            lambda2: 1e-3,
            alpha2: DEFAULT_ALPHA,
            verbose: true,
        })
    }

    pub fn load_path(mut self, load_path: Option<PathBuf>) -> Self {
        self.0.load_path = load_path;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.0.seed = seed;
        self
    }

    pub fn epochs(mut self, epochs: usize) -> Self {
        self.0.epochs = epochs;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.0.learning_rate = learning_rate;
        self
    }

    pub fn batch_num(mut self, batch_num: usize) -> Self {
        self.0.batch_num = batch_num;
        self
    }

    pub fn lambda2(mut self, lambda2: f64) -> Self {
        self.0.lambda2 = lambda2;
        self
    }

    pub fn alpha2(mut self, alpha2: f64) -> Self {
        self.0.alpha2 = alpha2;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.0.verbose = verbose;
        self
    }
}

impl ParamGuard for AeParams {
    type Checked = AeValidParams;
    type Error = ExperimentError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        self.0.autoencoder().check()?;
        check_alpha("alpha2", self.0.alpha2)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Checked parameters of a direct solver run
#[derive(Debug, Clone, PartialEq)]
pub struct SscValidParams {
    seed: Option<u64>,
    alpha: f64,
    verbose: bool,
}

impl SscValidParams {
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Parameters of `run_ssc`, defaulting to `alpha=20`, `verbose=true` and no seed
#[derive(Debug, Clone, PartialEq)]
pub struct SscParams(SscValidParams);

impl Default for SscParams {
    fn default() -> Self {
        SscParams(SscValidParams {
            seed: None,
            alpha: DEFAULT_ALPHA,
            verbose: true,
        })
    }
}

impl SscParams {
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.0.seed = seed;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.0.alpha = alpha;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.0.verbose = verbose;
        self
    }
}

impl ParamGuard for SscParams {
    type Checked = SscValidParams;
    type Error = ExperimentError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        check_alpha("alpha", self.0.alpha)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
