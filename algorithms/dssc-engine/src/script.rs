//! Rendering of engine statements
//!
//! Everything sent to the engine is a single line. A statement is wrapped in a `try`/`catch` that
//! prints a completion marker on success and an error marker followed by the message on failure,
//! so the client knows when the engine is idle again.
use std::path::Path;

use crate::kind::{quote, EngineKind};
use crate::request::{SscInput, SscMode, SscRequest};

pub const DONE_MARKER: &str = "__DSSC_DONE__";
pub const ERROR_MARKER: &str = "__DSSC_ERROR__";

/// Engine-side reader of the interchange container
pub const READ_HELPER: (&str, &str) = ("dssc_read.m", include_str!("../matlab/dssc_read.m"));
/// Engine-side writer of the interchange container
pub const WRITE_HELPER: (&str, &str) = ("dssc_write.m", include_str!("../matlab/dssc_write.m"));

/// Splits a marker so that an echoed command line never contains it verbatim
fn split_literal(marker: &str) -> String {
    let (head, tail) = marker.split_at(marker.len() / 2);
    format!("['{}' '{}']", head, tail)
}

/// Wraps `body` into a single line reporting completion or failure
pub fn wrap(kind: EngineKind, body: &str) -> String {
    let flush = kind
        .flush_statement()
        .map(|s| format!(" {};", s))
        .unwrap_or_default();

    format!(
        "try, {}; disp({}); catch dssc_err, disp([{} ' ' strrep(dssc_err.message, char(10), ' ')]); end;{}",
        body,
        split_literal(DONE_MARKER),
        split_literal(ERROR_MARKER),
        flush
    )
}

/// The positional solver call
///
/// `SSC_modified(k, 0, false, alpha, false, 1, 1e-20, 100, cluster, seed, read_c)`, where a
/// missing seed is passed as `-1`.
pub fn solver_call(request: &SscRequest<'_>) -> String {
    let seed = match request.seed {
        Some(seed) => seed.to_string(),
        None => "-1".to_string(),
    };

    format!(
        "SSC_modified({}, 0, false, {:?}, false, 1, 1e-20, 100, {}, {}, {})",
        request.n_clusters,
        request.alpha,
        request.mode == SscMode::Cluster,
        seed,
        request.input.is_coefficients()
    )
}

/// Stages the input for the solver, runs it and writes its result to `output`
pub fn solver_body(
    kind: EngineKind,
    request: &SscRequest<'_>,
    input: &Path,
    output: &Path,
    exchange: &Path,
) -> String {
    let variable = match request.input {
        SscInput::Features(_) => "X",
        SscInput::Coefficients(_) => "C",
    };
    let input = quote(&input.to_string_lossy());
    let output = quote(&output.to_string_lossy());

    let mut statements = vec![
        format!("{} = dssc_read({})", variable, input),
        kind.save_statement(exchange, variable),
    ];
    match request.mode {
        SscMode::Affinity => {
            // the solver leaves C next to X in the exchange file
            statements.push(solver_call(request));
            statements.push(format!(
                "dssc_s = load({})",
                quote(&exchange.to_string_lossy())
            ));
            statements.push(format!("dssc_write({}, dssc_s.C)", output));
        }
        SscMode::Cluster => {
            statements.push(format!("grps = {}", solver_call(request)));
            statements.push(format!("dssc_write({}, double(grps))", output));
        }
    }

    statements.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn positional_parameters_are_fixed() {
        let x = Array2::<f64>::zeros((4, 3));
        let request = SscRequest::cluster(SscInput::Features(x.view()), 2, 20.0);
        assert_eq!(
            solver_call(&request),
            "SSC_modified(2, 0, false, 20.0, false, 1, 1e-20, 100, true, -1, false)"
        );

        let request = SscRequest::affinity(x.view(), 3, 12.5).seed(Some(7));
        assert_eq!(
            solver_call(&request),
            "SSC_modified(3, 0, false, 12.5, false, 1, 1e-20, 100, false, 7, false)"
        );
    }

    #[test]
    fn precomputed_coefficients_are_read_by_the_solver() {
        let c = Array2::<f64>::eye(4);
        let request = SscRequest::cluster(SscInput::Coefficients(c.view()), 2, 20.0);
        let body = solver_body(
            EngineKind::Matlab,
            &request,
            Path::new("/s/input.bin"),
            Path::new("/s/output.bin"),
            Path::new("/w/temp.mat"),
        );
        assert_eq!(
            body,
            "C = dssc_read('/s/input.bin'); save('/w/temp.mat', 'C', '-v7'); \
             grps = SSC_modified(2, 0, false, 20.0, false, 1, 1e-20, 100, true, -1, true); \
             dssc_write('/s/output.bin', double(grps))"
        );
    }

    #[test]
    fn affinity_reads_c_back_from_the_exchange_file() {
        let x = Array2::<f64>::zeros((4, 3));
        let request = SscRequest::affinity(x.view(), 2, 20.0);
        let body = solver_body(
            EngineKind::Octave,
            &request,
            Path::new("/s/input.bin"),
            Path::new("/s/output.bin"),
            Path::new("/w/temp.mat"),
        );
        assert!(body.starts_with("X = dssc_read('/s/input.bin'); save('-v7', '/w/temp.mat', 'X')"));
        assert!(body.ends_with("dssc_s = load('/w/temp.mat'); dssc_write('/s/output.bin', dssc_s.C)"));
    }

    #[test]
    fn wrapped_lines_never_contain_the_markers() {
        for kind in &[EngineKind::Matlab, EngineKind::Octave] {
            let line = wrap(*kind, "cd('/tmp')");
            assert!(!line.contains(DONE_MARKER));
            assert!(!line.contains(ERROR_MARKER));
            assert!(!line.contains('\n'));
            assert!(line.starts_with("try, cd('/tmp');"));
        }
        assert!(wrap(EngineKind::Octave, "x").ends_with("fflush(stdout);"));
    }

    #[test]
    fn helpers_define_their_functions() {
        assert!(READ_HELPER.1.starts_with("function A = dssc_read(path)"));
        assert!(WRITE_HELPER.1.starts_with("function dssc_write(path, A)"));
    }
}
