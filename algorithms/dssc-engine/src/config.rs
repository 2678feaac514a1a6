use std::path::{Path, PathBuf};

use dssc::param_guard::ParamGuard;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::kind::EngineKind;

/// What happens to the console output of the engine
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// Relay every console line to the log
    Forward,
    /// Discard console output
    Suppress,
}

impl OutputPolicy {
    /// `Forward` when verbose, `Suppress` otherwise
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            OutputPolicy::Forward
        } else {
            OutputPolicy::Suppress
        }
    }
}

/// Checked engine configuration
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    kind: EngineKind,
    executable: Option<PathBuf>,
    solver_dir: PathBuf,
    scratch_dir: Option<PathBuf>,
    exchange_file: PathBuf,
    output: OutputPolicy,
}

/// Engine configuration builder
///
/// Defaults: the solver lives in `./SSC_ADMM_v1.1`, matrices are staged for it in `./temp.mat`,
/// interchange files go to a fresh temporary directory and console output is forwarded.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParams(EngineConfig);

impl EngineConfig {
    pub fn params(kind: EngineKind) -> EngineParams {
        EngineParams(EngineConfig {
            kind,
            executable: None,
            solver_dir: PathBuf::from("./SSC_ADMM_v1.1"),
            scratch_dir: None,
            exchange_file: PathBuf::from("./temp.mat"),
            output: OutputPolicy::Forward,
        })
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// The executable to launch, either the override or the engine's default program
    pub fn program(&self) -> &Path {
        self.executable
            .as_deref()
            .unwrap_or_else(|| Path::new(self.kind.program()))
    }

    pub fn solver_dir(&self) -> &Path {
        &self.solver_dir
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }

    /// MAT-file through which the solver receives `X` or `C` and returns `C`
    pub fn exchange_file(&self) -> &Path {
        &self.exchange_file
    }

    pub fn output(&self) -> OutputPolicy {
        self.output
    }
}

impl EngineParams {
    /// Launch this executable instead of `matlab` or `octave`
    pub fn executable<P: Into<PathBuf>>(mut self, executable: P) -> Self {
        self.0.executable = Some(executable.into());
        self
    }

    /// Directory containing `SSC_modified`
    pub fn solver_dir<P: Into<PathBuf>>(mut self, solver_dir: P) -> Self {
        self.0.solver_dir = solver_dir.into();
        self
    }

    /// Keep interchange files in this directory instead of a temporary one
    pub fn scratch_dir<P: Into<PathBuf>>(mut self, scratch_dir: P) -> Self {
        self.0.scratch_dir = Some(scratch_dir.into());
        self
    }

    pub fn exchange_file<P: Into<PathBuf>>(mut self, exchange_file: P) -> Self {
        self.0.exchange_file = exchange_file.into();
        self
    }

    pub fn output(mut self, output: OutputPolicy) -> Self {
        self.0.output = output;
        self
    }
}

impl ParamGuard for EngineParams {
    type Checked = EngineConfig;
    type Error = EngineError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let config = &self.0;
        if config.solver_dir.as_os_str().is_empty() {
            Err(EngineError::Config("solver directory is empty".to_string()))
        } else if config.exchange_file.file_name().is_none() {
            Err(EngineError::Config(format!(
                "exchange file {:?} has no file name",
                config.exchange_file
            )))
        } else if matches!(&config.executable, Some(exe) if exe.as_os_str().is_empty()) {
            Err(EngineError::Config("executable is empty".to_string()))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
