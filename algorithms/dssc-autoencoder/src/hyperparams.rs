use std::path::{Path, PathBuf};

use dssc::param_guard::ParamGuard;
use serde::{Deserialize, Serialize};

use crate::error::AutoencoderParamsError;

/// Nonlinearity of the hidden layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Tanh,
    Sigmoid,
    Relu,
}

/// Gradient based optimizer used during training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Optimizer {
    Adam,
    Momentum,
    #[serde(rename = "GD")]
    GradientDescent,
}

/// Checked autoencoder hyperparameters
///
/// The loss of the deep subspace clustering autoencoder combines the reconstruction error with
/// three weighted terms:
/// * `lambda1` weights the self-expressiveness of the hidden representation `H ≈ H C`,
/// * `lambda2` weights the regularization of the network weights,
/// * `lambda3` weights the sparsity of a learned `C`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderValidParams {
    hidden_dims: Vec<usize>,
    load_path: Option<PathBuf>,
    seed: Option<u64>,
    epochs: usize,
    learning_rate: f64,
    batch_num: usize,
    lambda1: f64,
    lambda2: f64,
    lambda3: f64,
    activation: Activation,
    optimizer: Optimizer,
    print_step: usize,
    validation_step: usize,
    stop_criteria: usize,
    train_c: bool,
    verbose: bool,
}

impl AutoencoderValidParams {
    pub fn hidden_dims(&self) -> &[usize] {
        &self.hidden_dims
    }

    /// Dimension of the innermost layer, i.e. of the embedding
    pub fn embedding_dim(&self) -> usize {
        self.hidden_dims.last().copied().unwrap_or(0)
    }

    pub fn load_path(&self) -> Option<&Path> {
        self.load_path.as_deref()
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn batch_num(&self) -> usize {
        self.batch_num
    }

    pub fn lambda1(&self) -> f64 {
        self.lambda1
    }

    pub fn lambda2(&self) -> f64 {
        self.lambda2
    }

    pub fn lambda3(&self) -> f64 {
        self.lambda3
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn optimizer(&self) -> Optimizer {
        self.optimizer
    }

    pub fn print_step(&self) -> usize {
        self.print_step
    }

    pub fn validation_step(&self) -> usize {
        self.validation_step
    }

    pub fn stop_criteria(&self) -> usize {
        self.stop_criteria
    }

    /// Whether the trainer learns the coefficient matrix alongside the network
    pub fn train_c(&self) -> bool {
        self.train_c
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

/// Autoencoder hyperparameter builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderParams(AutoencoderValidParams);

impl AutoencoderParams {
    /// Default hyperparameters for a network with the given hidden layer sizes
    ///
    /// * epochs: 10000
    /// * learning rate: 0.001
    /// * batch count: 100
    /// * lambda1, lambda2, lambda3: 1e-4, 1e-3, 0
    /// * tanh activation, Adam optimizer
    /// * report every 100 epochs, validate every 10 and stop after 3 validations without
    ///   improvement
    pub fn new(hidden_dims: Vec<usize>) -> Self {
        AutoencoderParams(AutoencoderValidParams {
            hidden_dims,
            load_path: None,
            seed: None,
            epochs: 10000,
            learning_rate: 0.001,
            batch_num: 100,
            lambda1: 1e-4,
            lambda2: 1e-3,
            lambda3: 0.0,
            activation: Activation::Tanh,
            optimizer: Optimizer::Adam,
            print_step: 100,
            validation_step: 10,
            stop_criteria: 3,
            train_c: false,
            verbose: true,
        })
    }

    /// Start from the weights stored at `load_path`
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

    pub fn activation(mut self, activation: Activation) -> Self {
        self.0.activation = activation;
        self
    }

    pub fn optimizer(mut self, optimizer: Optimizer) -> Self {
        self.0.optimizer = optimizer;
        self
    }

    pub fn print_step(mut self, print_step: usize) -> Self {
        self.0.print_step = print_step;
        self
    }

    pub fn validation_step(mut self, validation_step: usize) -> Self {
        self.0.validation_step = validation_step;
        self
    }

    pub fn stop_criteria(mut self, stop_criteria: usize) -> Self {
        self.0.stop_criteria = stop_criteria;
        self
    }

    pub fn train_c(mut self, train_c: bool) -> Self {
        self.0.train_c = train_c;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.0.verbose = verbose;
        self
    }
}

impl ParamGuard for AutoencoderParams {
    type Checked = AutoencoderValidParams;
    type Error = AutoencoderParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let p = &self.0;
        if p.hidden_dims.is_empty() {
            return Err(AutoencoderParamsError::NoHiddenLayers);
        }
        if let Some(layer) = p.hidden_dims.iter().position(|d| *d == 0) {
            return Err(AutoencoderParamsError::EmptyHiddenLayer(layer));
        }
        if !(p.learning_rate.is_finite() && p.learning_rate > 0.0) {
            return Err(AutoencoderParamsError::LearningRate(p.learning_rate));
        }
        for (name, value) in &[
            ("lambda1", p.lambda1),
            ("lambda2", p.lambda2),
            ("lambda3", p.lambda3),
        ] {
            if !(value.is_finite() && *value >= 0.0) {
                return Err(AutoencoderParamsError::Regularization(*name, *value));
            }
        }
        for (name, value) in &[
            ("epochs", p.epochs),
            ("batch_num", p.batch_num),
            ("print_step", p.print_step),
            ("validation_step", p.validation_step),
            ("stop_criteria", p.stop_criteria),
        ] {
            if *value == 0 {
                return Err(AutoencoderParamsError::ZeroCount(*name));
            }
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = AutoencoderParams::new(vec![200, 150]).check().unwrap();
        assert_eq!(params.epochs(), 10000);
        assert_eq!(params.learning_rate(), 0.001);
        assert_eq!(params.batch_num(), 100);
        assert_eq!(
            (params.lambda1(), params.lambda2(), params.lambda3()),
            (1e-4, 1e-3, 0.0)
        );
        assert_eq!(params.activation(), Activation::Tanh);
        assert_eq!(params.optimizer(), Optimizer::Adam);
        assert_eq!(
            (
                params.print_step(),
                params.validation_step(),
                params.stop_criteria()
            ),
            (100, 10, 3)
        );
        assert_eq!(params.embedding_dim(), 150);
        assert!(!params.train_c());
        assert!(params.verbose());
    }

    #[test]
    fn invalid_layers_are_rejected() {
        assert!(matches!(
            AutoencoderParams::new(vec![]).check(),
            Err(AutoencoderParamsError::NoHiddenLayers)
        ));
        assert!(matches!(
            AutoencoderParams::new(vec![10, 0]).check(),
            Err(AutoencoderParamsError::EmptyHiddenLayer(1))
        ));
    }

    #[test]
    fn invalid_scalars_are_rejected() {
        assert!(matches!(
            AutoencoderParams::new(vec![4]).learning_rate(0.0).check(),
            Err(AutoencoderParamsError::LearningRate(_))
        ));
        assert!(matches!(
            AutoencoderParams::new(vec![4]).lambda2(-1.0).check(),
            Err(AutoencoderParamsError::Regularization("lambda2", _))
        ));
        assert!(matches!(
            AutoencoderParams::new(vec![4]).batch_num(0).check(),
            Err(AutoencoderParamsError::ZeroCount("batch_num"))
        ));
    }

    #[test]
    fn serializes_with_the_trainer_names() {
        let params = AutoencoderParams::new(vec![8])
            .optimizer(Optimizer::GradientDescent)
            .check()
            .unwrap();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["activation"], "tanh");
        assert_eq!(json["optimizer"], "GD");
        assert_eq!(json["hidden_dims"], serde_json::json!([8]));
        assert_eq!(json["load_path"], serde_json::Value::Null);
    }
}
