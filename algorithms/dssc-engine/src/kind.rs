//! Supported numeric engines
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Environment variable selecting the engine
pub const ENGINE_VAR: &str = "ENGINE_CHOICE";

/// The numeric engine hosting the solver
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    Matlab,
    Octave,
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::Matlab
    }
}

impl EngineKind {
    /// Reads the engine choice from `ENGINE_CHOICE`, defaulting to MATLAB when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var(ENGINE_VAR) {
            Ok(value) => value.parse(),
            Err(std::env::VarError::NotPresent) => Ok(EngineKind::default()),
            Err(std::env::VarError::NotUnicode(value)) => {
                Err(EngineError::UnknownEngine(value.to_string_lossy().into_owned()))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Matlab => "MATLAB",
            EngineKind::Octave => "OCTAVE",
        }
    }

    /// Executable launched when no override is configured
    pub fn program(&self) -> &'static str {
        match self {
            EngineKind::Matlab => "matlab",
            EngineKind::Octave => "octave",
        }
    }

    /// Command line flags for a headless session reading commands from stdin
    pub fn launch_args(&self) -> &'static [&'static str] {
        match self {
            EngineKind::Matlab => &["-nodesktop", "-nosplash", "-nodisplay"],
            EngineKind::Octave => &["--no-gui", "--quiet", "--norc"],
        }
    }

    /// Scripts evaluated once the session sits in the solver directory
    pub fn startup_scripts(&self) -> &'static [&'static str] {
        match self {
            EngineKind::Matlab => &[],
            EngineKind::Octave => &["svdDriversCompare"],
        }
    }

    pub(crate) fn startup_title(&self) -> &'static str {
        match self {
            EngineKind::Matlab => "Starting MATLAB engine",
            EngineKind::Octave => "Starting Octave",
        }
    }

    /// Statement storing `variable` in a MAT-file readable by the solver
    pub fn save_statement(&self, path: &Path, variable: &str) -> String {
        let path = quote(&path.to_string_lossy());
        match self {
            EngineKind::Matlab => format!("save({}, '{}', '-v7')", path, variable),
            EngineKind::Octave => format!("save('-v7', {}, '{}')", path, variable),
        }
    }

    /// Statement pushing buffered console output through a pipe
    pub fn flush_statement(&self) -> Option<&'static str> {
        match self {
            EngineKind::Matlab => None,
            EngineKind::Octave => Some("fflush(stdout)"),
        }
    }
}

impl FromStr for EngineKind {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "MATLAB" => Ok(EngineKind::Matlab),
            "OCTAVE" => Ok(EngineKind::Octave),
            other => Err(EngineError::UnknownEngine(other.to_string())),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Single-quoted string literal with embedded quotes doubled
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
