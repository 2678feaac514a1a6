use std::io::BufReader;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use dssc::progress::Progress;
use tracing::{info, warn};

use crate::client::{EngineClient, Staging};
use crate::config::{EngineConfig, OutputPolicy};
use crate::error::{EngineError, Result};
use crate::request::{SscRequest, SscResponse, SubspaceEngine};

/// A MATLAB or Octave session running as a child process
///
/// The session is started once and reused for every solver call. Dropping the handle asks the
/// engine to exit and waits for it.
#[derive(Debug)]
pub struct ProcessEngine {
    child: Child,
    client: EngineClient<ChildStdin, BufReader<ChildStdout>>,
}

impl ProcessEngine {
    /// Launches the engine and moves it into the solver directory
    pub fn start(config: EngineConfig) -> Result<Self> {
        let kind = config.kind();
        let stage = Progress::new(true).stage(kind.startup_title());

        let stderr = match config.output() {
            OutputPolicy::Forward => Stdio::inherit(),
            OutputPolicy::Suppress => Stdio::null(),
        };
        let mut child = Command::new(config.program())
            .args(kind.launch_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(stderr)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: config.program().to_path_buf(),
                source,
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                return Err(EngineError::Closed);
            }
        };
        let staging = match Staging::new(config.scratch_dir(), config.exchange_file()) {
            Ok(staging) => staging,
            Err(err) => {
                let _ = child.kill();
                return Err(err);
            }
        };

        let mut engine = ProcessEngine {
            child,
            client: EngineClient::new(
                kind,
                stdin,
                BufReader::new(stdout),
                config.output(),
                staging,
            ),
        };
        engine.client.prepare(config.solver_dir())?;
        stage.finish();
        info!(engine = %kind, pid = engine.child.id(), "engine ready");

        Ok(engine)
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl SubspaceEngine for ProcessEngine {
    fn ssc(&mut self, request: SscRequest<'_>) -> Result<SscResponse> {
        self.client.ssc(request)
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        if self.client.session_mut().send("exit").is_err() {
            let _ = self.child.kill();
        }
        if let Err(err) = self.child.wait() {
            warn!(%err, "failed to reap the engine process");
        }
    }
}
