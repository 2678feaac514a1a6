//! Line protocol with a running engine
use std::io::{BufRead, Write};

use tracing::{debug, info};

use crate::config::OutputPolicy;
use crate::error::{EngineError, Result};
use crate::kind::EngineKind;
use crate::script::{wrap, DONE_MARKER, ERROR_MARKER};

/// Sends statements to an engine and waits for their completion markers
#[derive(Debug)]
pub struct Session<W, R> {
    kind: EngineKind,
    writer: W,
    reader: R,
    output: OutputPolicy,
}

impl<W: Write, R: BufRead> Session<W, R> {
    pub fn new(kind: EngineKind, writer: W, reader: R, output: OutputPolicy) -> Self {
        Session {
            kind,
            writer,
            reader,
            output,
        }
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Evaluates `body` and blocks until the engine reports back
    ///
    /// Console lines printed in the meantime are relayed according to the [`OutputPolicy`].
    pub fn eval(&mut self, body: &str) -> Result<()> {
        debug!(engine = %self.kind, command = body, "evaluating");
        writeln!(self.writer, "{}", wrap(self.kind, body))?;
        self.writer.flush()?;

        // engines print in the locale's encoding, so lines are decoded lossily
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                return Err(EngineError::Closed);
            }
            let line = String::from_utf8_lossy(&buf);

            if line.contains(DONE_MARKER) {
                return Ok(());
            }
            if let Some(pos) = line.find(ERROR_MARKER) {
                let message = line[pos + ERROR_MARKER.len()..].trim();
                return Err(EngineError::Engine(message.to_string()));
            }

            if self.output == OutputPolicy::Forward {
                let line = line.trim_end();
                if !line.is_empty() {
                    info!(target: "dssc_engine::console", "{}", line);
                }
            }
        }
    }

    /// Sends a raw line without waiting for an answer
    pub fn send(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn session<'a>(
        written: &'a mut Vec<u8>,
        replies: &'static [u8],
        output: OutputPolicy,
    ) -> Session<&'a mut Vec<u8>, Cursor<&'static [u8]>> {
        Session::new(EngineKind::Matlab, written, Cursor::new(replies), output)
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Runs one statement against `replies` and returns what was logged on the way
    fn logged(replies: &'static [u8], output: OutputPolicy) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();

        let mut written = Vec::new();
        tracing::subscriber::with_default(subscriber, || {
            session(&mut written, replies, output).eval("disp(1)").unwrap()
        });

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn waits_for_the_done_marker() {
        let mut written = Vec::new();
        let mut session = session(
            &mut written,
            b">> \nans = 3\n>> __DSSC_DONE__\n",
            OutputPolicy::Suppress,
        );
        session.eval("x = 3").unwrap();

        let written = String::from_utf8(written).unwrap();
        assert!(written.starts_with("try, x = 3;"));
        assert!(written.ends_with('\n'));
    }

    #[test]
    fn engine_errors_carry_the_message() {
        let mut written = Vec::new();
        let mut session = session(
            &mut written,
            b"__DSSC_ERROR__ Undefined function 'SSC_modified'\n",
            OutputPolicy::Suppress,
        );
        match session.eval("SSC_modified(1)") {
            Err(EngineError::Engine(message)) => {
                assert_eq!(message, "Undefined function 'SSC_modified'")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn end_of_stream_means_the_engine_is_gone() {
        let mut written = Vec::new();
        let mut session = session(&mut written, b"some output\n", OutputPolicy::Suppress);
        assert!(matches!(session.eval("exit"), Err(EngineError::Closed)));
    }

    #[test]
    fn consecutive_statements_consume_their_own_markers() {
        let mut written = Vec::new();
        let mut session = session(
            &mut written,
            b"__DSSC_DONE__\n__DSSC_ERROR__ boom\n",
            OutputPolicy::Suppress,
        );
        assert!(session.eval("a = 1").is_ok());
        assert!(session.eval("b = a").is_err());
    }

    #[test]
    fn latin1_console_output_keeps_the_session_in_sync() {
        let mut written = Vec::new();
        let mut session = session(
            &mut written,
            b"Warnung: Datei ge\xf6ffnet\n__DSSC_DONE__\n__DSSC_ERROR__ second failed\n",
            OutputPolicy::Forward,
        );
        assert!(session.eval("load('temp.mat')").is_ok());
        match session.eval("SSC_modified(1)") {
            Err(EngineError::Engine(message)) => assert_eq!(message, "second failed"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn forwarded_console_lines_are_logged() {
        let replies: &'static [u8] = b"ans = 1\n\n__DSSC_DONE__\n";

        let forwarded = logged(replies, OutputPolicy::Forward);
        assert!(forwarded.contains("dssc_engine::console"));
        assert!(forwarded.contains("ans = 1"));
        assert_eq!(forwarded.lines().count(), 1);

        assert!(!logged(replies, OutputPolicy::Suppress).contains("ans = 1"));
    }
}
