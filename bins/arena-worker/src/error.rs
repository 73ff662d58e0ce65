use crate::renderer::TemplateError;
use arena_common::types::FailureKind;
use thiserror::Error;

/// Failures that stop a judging run before it produces a verdict.
///
/// These are "the judge failed" conditions. A user's code failing is a
/// `Verdict`, never a `JudgeError`.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("problem not found: {0}")]
    ProblemNotFound(String),

    #[error("language not found: {0}")]
    LanguageNotFound(String),

    #[error("harness configuration error: {0}")]
    Template(#[from] TemplateError),

    #[error("execution backend unavailable: {0}")]
    ExecutionUnavailable(String),

    #[error("problem store unavailable: {0}")]
    StoreUnavailable(String),
}

impl JudgeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            JudgeError::InvalidRequest(_) => FailureKind::InvalidRequest,
            JudgeError::ProblemNotFound(_) => FailureKind::ProblemNotFound,
            JudgeError::LanguageNotFound(_) => FailureKind::LanguageNotFound,
            JudgeError::Template(_) => FailureKind::Template,
            JudgeError::ExecutionUnavailable(_) => FailureKind::ExecutionUnavailable,
            JudgeError::StoreUnavailable(_) => FailureKind::StoreUnavailable,
        }
    }

    /// Only infrastructure failures are worth retrying; everything else will
    /// fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            JudgeError::ExecutionUnavailable(_) | JudgeError::StoreUnavailable(_)
        )
    }
}
