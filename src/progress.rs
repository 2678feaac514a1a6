//! Verbose progress reporting with elapsed-time measurement
use std::time::{Duration, Instant};

use tracing::info;

/// Reports pipeline stages when verbose, stays silent otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    verbose: bool,
}

impl Progress {
    pub fn new(verbose: bool) -> Self {
        Progress { verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Starts timing a named stage
    pub fn stage(&self, title: &'static str) -> Stage {
        if self.verbose {
            info!(stage = title, "{}...", title);
        }

        Stage {
            title,
            verbose: self.verbose,
            start: Instant::now(),
        }
    }
}

/// A running pipeline stage, see [`Progress::stage`]
#[must_use = "a stage reports its elapsed time only when finished"]
#[derive(Debug)]
pub struct Stage {
    title: &'static str,
    verbose: bool,
    start: Instant,
}

impl Stage {
    /// Ends the stage, logging the elapsed time when verbose
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        if self.verbose {
            info!(
                stage = self.title,
                elapsed = elapsed.as_secs_f64(),
                "Elapsed: {:.2} sec",
                elapsed.as_secs_f64()
            );
        }

        elapsed
    }
}
