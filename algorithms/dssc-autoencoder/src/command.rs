//! Training through an external program
//!
//! [`CommandTrainer`] hands a job to any program that understands the following protocol. The
//! program is invoked with the work directory as its last argument. That directory holds
//!
//! | file               | content                                     |
//! |--------------------|---------------------------------------------|
//! | `train.bin`        | training samples                            |
//! | `val.bin`          | validation samples                          |
//! | `c.bin`            | precomputed coefficient matrix, if any      |
//! | `params.json`      | hyperparameters and the names of the files  |
//!
//! Matrices use the interchange container of [`dssc::container`]. On success the program writes
//! `embedding.bin` and, when asked to learn `C`, `coefficients.bin` into the same directory and
//! exits with status zero.
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use dssc::container;
use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{AutoencoderError, Result};
use crate::hyperparams::AutoencoderValidParams;
use crate::trainer::{Autoencoder, TrainedEmbedding, TrainingJob};

pub const TRAIN_FILE: &str = "train.bin";
pub const VALIDATION_FILE: &str = "val.bin";
pub const COEFFICIENTS_IN_FILE: &str = "c.bin";
pub const PARAMS_FILE: &str = "params.json";
pub const EMBEDDING_FILE: &str = "embedding.bin";
pub const COEFFICIENTS_OUT_FILE: &str = "coefficients.bin";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    train: &'static str,
    validation: &'static str,
    coefficients: Option<&'static str>,
    embedding: &'static str,
    learned_coefficients: Option<&'static str>,
    n_train: usize,
    n_validation: usize,
    n_features: usize,
    params: &'a AutoencoderValidParams,
}

/// Runs an external trainer program for every job
#[derive(Debug, Clone)]
pub struct CommandTrainer {
    program: PathBuf,
    args: Vec<OsString>,
    work_dir: Option<PathBuf>,
}

impl CommandTrainer {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        CommandTrainer {
            program: program.into(),
            args: Vec::new(),
            work_dir: None,
        }
    }

    /// Arguments placed before the work directory
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Exchange files in this directory instead of a temporary one, keeping them after training
    pub fn work_dir<P: Into<PathBuf>>(mut self, work_dir: P) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    fn stage(&self, dir: &Path, job: &TrainingJob<'_>) -> Result<()> {
        container::save(dir.join(TRAIN_FILE), &job.train)?;
        container::save(dir.join(VALIDATION_FILE), &job.validation)?;

        let coefficients_in = dir.join(COEFFICIENTS_IN_FILE);
        match &job.coefficients {
            Some(c) => container::save(&coefficients_in, c)?,
            None if coefficients_in.exists() => std::fs::remove_file(&coefficients_in)?,
            None => {}
        }
        for stale in &[EMBEDDING_FILE, COEFFICIENTS_OUT_FILE] {
            let path = dir.join(stale);
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }

        let manifest = Manifest {
            train: TRAIN_FILE,
            validation: VALIDATION_FILE,
            coefficients: job.coefficients.as_ref().map(|_| COEFFICIENTS_IN_FILE),
            embedding: EMBEDDING_FILE,
            learned_coefficients: if job.params.train_c() {
                Some(COEFFICIENTS_OUT_FILE)
            } else {
                None
            },
            n_train: job.train.nrows(),
            n_validation: job.validation.nrows(),
            n_features: job.train.ncols(),
            params: job.params,
        };
        let writer = BufWriter::new(File::create(dir.join(PARAMS_FILE))?);
        serde_json::to_writer_pretty(writer, &manifest)?;

        Ok(())
    }

    fn run(&self, dir: &Path, verbose: bool) -> Result<()> {
        let (stdout, stderr) = if verbose {
            (Stdio::inherit(), Stdio::inherit())
        } else {
            (Stdio::null(), Stdio::null())
        };
        debug!(program = ?self.program, work_dir = ?dir, "launching trainer");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .map_err(|source| AutoencoderError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(AutoencoderError::Trainer(status));
        }

        Ok(())
    }

    fn collect(&self, dir: &Path, train_c: bool) -> Result<TrainedEmbedding> {
        let embedding = container::load_matrix(dir.join(EMBEDDING_FILE))?;
        let coefficients_out = dir.join(COEFFICIENTS_OUT_FILE);
        let coefficients = if train_c && coefficients_out.exists() {
            Some(container::load_matrix(coefficients_out)?)
        } else {
            None
        };

        Ok(TrainedEmbedding {
            embedding,
            coefficients,
        })
    }
}

impl Autoencoder for CommandTrainer {
    fn train(&mut self, job: TrainingJob<'_>) -> Result<TrainedEmbedding> {
        let scratch;
        let dir = match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dir.as_path()
            }
            None => {
                scratch = TempDir::new()?;
                scratch.path()
            }
        };

        self.stage(dir, &job)?;
        info!(
            hidden_dims = ?job.params.hidden_dims(),
            epochs = job.params.epochs(),
            train_c = job.params.train_c(),
            "training autoencoder"
        );
        self.run(dir, job.params.verbose())?;

        self.collect(dir, job.params.train_c())
    }
}
