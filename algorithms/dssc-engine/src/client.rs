use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use dssc::container;
use ndarray::Ix2;
use tempfile::TempDir;
use tracing::debug;

use crate::config::OutputPolicy;
use crate::error::{EngineError, Result};
use crate::kind::{quote, EngineKind};
use crate::request::{SscMode, SscRequest, SscResponse, SubspaceEngine};
use crate::script::{solver_body, READ_HELPER, WRITE_HELPER};
use crate::session::Session;

const INPUT_FILE: &str = "input.bin";
const OUTPUT_FILE: &str = "output.bin";

/// Resolves `path` against the current directory of this process
///
/// The engine changes its own working directory, so every path handed to it is absolute.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[derive(Debug)]
enum Scratch {
    Temporary(TempDir),
    Fixed(PathBuf),
}

/// Files shared between client and engine
///
/// The interchange files live in a scratch directory owned by one client and are overwritten
/// on every call.
#[derive(Debug)]
pub struct Staging {
    scratch: Scratch,
    exchange: PathBuf,
}

impl Staging {
    /// Uses `scratch_dir` when given and a fresh temporary directory otherwise
    pub fn new(scratch_dir: Option<&Path>, exchange: &Path) -> Result<Self> {
        let scratch = match scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Scratch::Fixed(absolute(dir)?)
            }
            None => Scratch::Temporary(tempfile::Builder::new().prefix("dssc-").tempdir()?),
        };

        Ok(Staging {
            scratch,
            exchange: absolute(exchange)?,
        })
    }

    pub fn dir(&self) -> &Path {
        match &self.scratch {
            Scratch::Temporary(dir) => dir.path(),
            Scratch::Fixed(dir) => dir,
        }
    }

    pub fn input(&self) -> PathBuf {
        self.dir().join(INPUT_FILE)
    }

    pub fn output(&self) -> PathBuf {
        self.dir().join(OUTPUT_FILE)
    }

    /// MAT-file read and written by the solver
    pub fn exchange(&self) -> &Path {
        &self.exchange
    }

    /// Writes the container readers and writers the engine calls
    pub fn install_helpers(&self) -> Result<()> {
        for (name, source) in &[READ_HELPER, WRITE_HELPER] {
            std::fs::write(self.dir().join(name), source)?;
        }
        Ok(())
    }

    fn clear_output(&self) -> Result<()> {
        match std::fs::remove_file(self.output()) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

/// Solver client over any line-oriented connection to an engine
#[derive(Debug)]
pub struct EngineClient<W, R> {
    session: Session<W, R>,
    staging: Staging,
}

impl<W: Write, R: BufRead> EngineClient<W, R> {
    pub fn new(
        kind: EngineKind,
        writer: W,
        reader: R,
        output: OutputPolicy,
        staging: Staging,
    ) -> Self {
        EngineClient {
            session: Session::new(kind, writer, reader, output),
            staging,
        }
    }

    pub fn staging(&self) -> &Staging {
        &self.staging
    }

    pub fn session_mut(&mut self) -> &mut Session<W, R> {
        &mut self.session
    }

    /// Moves the engine into the solver directory and makes the container helpers callable
    pub fn prepare(&mut self, solver_dir: &Path) -> Result<()> {
        let kind = self.session.kind();
        self.staging.install_helpers()?;

        let solver_dir = absolute(solver_dir)?;
        self.session
            .eval(&format!("cd({})", quote(&solver_dir.to_string_lossy())))?;
        for script in kind.startup_scripts() {
            self.session.eval(script)?;
        }
        self.session.eval(&format!(
            "addpath({})",
            quote(&self.staging.dir().to_string_lossy())
        ))
    }
}

impl<W: Write, R: BufRead> SubspaceEngine for EngineClient<W, R> {
    fn ssc(&mut self, request: SscRequest<'_>) -> Result<SscResponse> {
        request.validate()?;
        let n = request.input.nsamples();
        let (input, output) = (self.staging.input(), self.staging.output());

        self.staging.clear_output()?;
        container::save(&input, request.input.matrix())?;

        let body = solver_body(
            self.session.kind(),
            &request,
            &input,
            &output,
            self.staging.exchange(),
        );
        debug!(
            n_clusters = request.n_clusters,
            alpha = request.alpha,
            mode = ?request.mode,
            nsamples = n,
            "calling the solver"
        );
        self.session.eval(&body)?;

        let result = container::load(&output)?;
        match request.mode {
            SscMode::Affinity => {
                let c = result.into_dimensionality::<Ix2>().map_err(|_| {
                    EngineError::UnexpectedResponse("coefficients are not a matrix".to_string())
                })?;
                if c.dim() != (n, n) {
                    return Err(EngineError::UnexpectedResponse(format!(
                        "coefficient matrix of shape {:?} for {} samples",
                        c.dim(),
                        n
                    )));
                }
                Ok(SscResponse::Coefficients(c))
            }
            SscMode::Cluster => {
                let grps = container::labels_from_values(result)?;
                if grps.len() != n {
                    return Err(EngineError::UnexpectedResponse(format!(
                        "{} labels for {} samples",
                        grps.len(),
                        n
                    )));
                }
                if grps.iter().any(|l| *l == 0) {
                    return Err(EngineError::UnexpectedResponse(
                        "cluster labels must start at 1".to_string(),
                    ));
                }
                Ok(SscResponse::Labels(grps.mapv(|l| l - 1)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SscInput;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2, ArrayD};
    use std::collections::VecDeque;
    use std::io::{BufReader, Read};

    /// Plays the engine: writes a prepared result to the output file, then reports completion
    struct Scripted {
        output: PathBuf,
        replies: VecDeque<(Option<ArrayD<f64>>, &'static str)>,
        pending: Vec<u8>,
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pending.is_empty() {
                match self.replies.pop_front() {
                    Some((result, line)) => {
                        if let Some(result) = result {
                            container::save(&self.output, &result).unwrap();
                        }
                        self.pending = line.as_bytes().to_vec();
                    }
                    None => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    fn client<'a>(
        written: &'a mut Vec<u8>,
        replies: Vec<(Option<ArrayD<f64>>, &'static str)>,
    ) -> (EngineClient<&'a mut Vec<u8>, BufReader<Scripted>>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let staging = Staging::new(Some(dir.path()), &dir.path().join("temp.mat")).unwrap();
        let engine = Scripted {
            output: staging.output(),
            replies: replies.into(),
            pending: Vec::new(),
        };
        let client = EngineClient::new(
            EngineKind::Octave,
            written,
            BufReader::new(engine),
            OutputPolicy::Suppress,
            staging,
        );
        (client, dir)
    }

    #[test]
    fn labels_become_zero_based() {
        let grps = array![[1.], [1.], [2.], [2.]].into_dyn();
        let mut written = Vec::new();
        let (mut client, dir) = client(&mut written, vec![(Some(grps), "__DSSC_DONE__\n")]);

        let x = Array2::from_shape_fn((4, 3), |(i, j)| (i + j) as f64);
        let labels = client
            .ssc(SscRequest::cluster(SscInput::Features(x.view()), 2, 20.0))
            .unwrap()
            .into_labels()
            .unwrap();
        assert_eq!(labels, array![0, 0, 1, 1]);

        // the features were staged for the engine
        let staged = container::load_matrix(dir.path().join("input.bin")).unwrap();
        assert_abs_diff_eq!(staged, x);

        drop(client);
        let written = String::from_utf8(written).unwrap();
        assert!(written.contains("grps = SSC_modified(2, 0, false, 20.0, false, 1, 1e-20, 100, true, -1, false)"));
        assert!(written.contains("save('-v7', "));
    }

    #[test]
    fn affinity_returns_the_square_matrix() {
        let c = Array2::from_shape_fn((3, 3), |(i, j)| if i == j { 0. } else { 0.5 });
        let mut written = Vec::new();
        let (mut client, _dir) = client(
            &mut written,
            vec![(Some(c.clone().into_dyn()), "__DSSC_DONE__\n")],
        );

        let x = Array2::<f64>::ones((3, 5));
        let response = client
            .ssc(SscRequest::affinity(x.view(), 2, 20.0).seed(Some(4)))
            .unwrap();
        assert_eq!(response, SscResponse::Coefficients(c));
    }

    #[test]
    fn wrong_shapes_are_unexpected() {
        let c = Array2::<f64>::zeros((2, 2)).into_dyn();
        let mut written = Vec::new();
        let (mut client, _dir) = client(&mut written, vec![(Some(c), "__DSSC_DONE__\n")]);

        let x = Array2::<f64>::ones((3, 5));
        assert!(matches!(
            client.ssc(SscRequest::affinity(x.view(), 2, 20.0)),
            Err(EngineError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn zero_labels_are_unexpected() {
        let grps = Array1::from(vec![0., 1., 1.]).into_dyn();
        let mut written = Vec::new();
        let (mut client, _dir) = client(&mut written, vec![(Some(grps), "__DSSC_DONE__\n")]);

        let x = Array2::<f64>::ones((3, 2));
        assert!(client
            .ssc(SscRequest::cluster(SscInput::Features(x.view()), 2, 20.0))
            .is_err());
    }

    #[test]
    fn stale_output_is_never_read() {
        let grps = array![1., 2.].into_dyn();
        let mut written = Vec::new();
        let (mut client, _dir) = client(
            &mut written,
            vec![
                (Some(grps), "__DSSC_DONE__\n"),
                (None, "__DSSC_ERROR__ solver failed\n"),
            ],
        );

        let x = array![[0., 1.], [1., 0.]];
        let request = || SscRequest::cluster(SscInput::Features(x.view()), 2, 20.0);
        assert!(client.ssc(request()).is_ok());
        assert!(matches!(
            client.ssc(request()),
            Err(EngineError::Engine(message)) if message == "solver failed"
        ));
        assert!(!client.staging().output().exists());
    }

    #[test]
    fn invalid_requests_never_reach_the_engine() {
        let mut written = Vec::new();
        let (mut client, _dir) = client(&mut written, vec![]);

        let x = Array2::<f64>::ones((3, 2));
        assert!(matches!(
            client.ssc(SscRequest::affinity(x.view(), 0, 20.0)),
            Err(EngineError::InvalidRequest(_))
        ));
        drop(client);
        assert!(written.is_empty());
    }

    #[test]
    fn preparation_enters_the_solver_directory() {
        let mut written = Vec::new();
        let (mut client, dir) = client(
            &mut written,
            vec![
                (None, "__DSSC_DONE__\n"),
                (None, "__DSSC_DONE__\n"),
                (None, "__DSSC_DONE__\n"),
            ],
        );
        client.prepare(Path::new("/opt/SSC_ADMM_v1.1")).unwrap();
        assert!(dir.path().join("dssc_read.m").exists());
        assert!(dir.path().join("dssc_write.m").exists());

        drop(client);
        let lines = String::from_utf8(written).unwrap();
        let lines = lines.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("try, cd('/opt/SSC_ADMM_v1.1');"));
        assert!(lines[1].starts_with("try, svdDriversCompare;"));
        assert!(lines[2].starts_with("try, addpath("));
    }
}
