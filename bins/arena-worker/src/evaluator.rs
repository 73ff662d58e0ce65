/// Verdict Classifier - Language-Agnostic Judging Logic
///
/// **Core Responsibility:**
/// Turn the backend's raw compile/run result into exactly one verdict.
///
/// **Critical Properties:**
/// - Knows nothing about HTTP
/// - Knows nothing about language runtimes or harness templates
/// - Pure function: raw execution result → verdict
///
/// **Decision Order (first match wins):**
/// 1. Compile phase with a non-empty error stream → Compilation Error
/// 2. No run phase → `ClassifyError::MissingRunPhase`
/// 3. Stdout is the harness's JSON status record → the harness decides
///    - `"Accepted"` → Accepted
///    - any other known status → that status
///    - missing or empty status → Wrong Answer
/// 4. Anything else (harness crashed or never ran)
///    - non-zero exit or non-empty stderr → Runtime Error, reporting stderr,
///      then stdout, then the terminating signal
///    - clean exit → Wrong Answer
///
/// **Why Two Tiers:**
/// The harness can tell a wrong value from a crash; an exit code cannot. The
/// process-signal tier only catches runs that never reached the harness's
/// final print.

use crate::piston::{RawExecutionResult, RunPhase};
use arena_common::types::{Verdict, VerdictKind};
use serde_json::Value as Json;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("execution backend returned no run phase")]
    MissingRunPhase,
}

/// Diagnostic used when the backend produced neither a compile error nor a run
pub const MISSING_RUN_DIAGNOSTIC: &str = "Execution produced no run result";

pub fn classify(raw: &RawExecutionResult) -> Result<Verdict, ClassifyError> {
    if let Some(compile) = &raw.compile {
        if !compile.stderr.is_empty() {
            return Ok(Verdict::new(VerdictKind::CompilationError, compile.stderr.clone()));
        }
    }

    let run = raw.run.as_ref().ok_or(ClassifyError::MissingRunPhase)?;

    let kind = match harness_status(&run.stdout) {
        Some(status) => status_verdict(status.as_deref()),
        None => return Ok(with_usage(process_verdict(run), run)),
    };

    Ok(with_usage(Verdict::new(kind, run.stdout.clone()), run))
}

/// Parse stdout as the harness's status record.
///
/// Returns `None` when stdout is not a JSON object, `Some(None)` when it is
/// one without a usable `status` string.
fn harness_status(stdout: &str) -> Option<Option<String>> {
    match serde_json::from_str::<Json>(stdout.trim()) {
        Ok(Json::Object(record)) => Some(
            record
                .get("status")
                .and_then(Json::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        ),
        _ => None,
    }
}

/// The harness is the authority on granular verdicts. Labels outside the
/// closed set still mean the run did not pass.
fn status_verdict(status: Option<&str>) -> VerdictKind {
    status
        .and_then(VerdictKind::from_label)
        .unwrap_or(VerdictKind::WrongAnswer)
}

fn process_verdict(run: &RunPhase) -> Verdict {
    if run.exit_code() != 0 || !run.stderr.is_empty() {
        let diagnostic = match (&run.stderr, &run.stdout, &run.signal) {
            (stderr, _, _) if !stderr.is_empty() => stderr.clone(),
            (_, stdout, _) if !stdout.is_empty() => stdout.clone(),
            (_, _, Some(signal)) => format!("Process terminated by {}", signal),
            _ => String::new(),
        };
        Verdict::new(VerdictKind::RuntimeError, diagnostic)
    } else {
        Verdict::new(VerdictKind::WrongAnswer, run.stdout.clone())
    }
}

fn with_usage(mut verdict: Verdict, run: &RunPhase) -> Verdict {
    verdict.execution_time = run.time;
    verdict.memory_usage = run.memory;
    verdict
}
