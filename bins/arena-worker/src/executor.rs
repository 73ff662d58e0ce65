/// Judging Orchestrator - High-Level Sequencing
///
/// **Responsibility:**
/// Run one submission through the pipeline and return its verdict.
///
/// **Architecture:**
/// 1. Select test cases by mode (renderer input)
/// 2. Render the driver source (renderer.rs)
/// 3. Execute it on the backend (piston.rs)
/// 4. Classify the raw result (evaluator.rs)
/// 5. In submit mode, hand the verdict to the submission store
///
/// This module is the glue layer - it knows nothing about:
/// - Literal syntax or harness templates (renderer's job)
/// - The backend's wire format (client's job)
/// - How verdicts are derived (evaluator's job)
///
/// It holds no per-run state, so one `Judge` serves concurrent submissions.

use crate::error::JudgeError;
use crate::evaluator::{self, MISSING_RUN_DIAGNOSTIC};
use crate::piston::{ExecuteRequest, ExecutionBackend, ExecutionLimits, SourceFile};
use crate::renderer;
use crate::store::SubmissionStore;
use arena_common::types::{
    JudgeMode, LanguageProfile, Problem, SubmissionRecord, TestCase, Verdict, VerdictKind,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Run mode previews at most this many cases
pub const RUN_MODE_CASE_LIMIT: usize = 5;

/// Caller-supplied cases only apply to run mode; a submission is always
/// graded against the problem's own set.
pub fn available_test_cases<'a>(
    problem: &'a Problem,
    requested: Option<&'a [TestCase]>,
    mode: JudgeMode,
) -> &'a [TestCase] {
    match (mode, requested) {
        (JudgeMode::Run, Some(requested)) => requested,
        (JudgeMode::Submit, Some(_)) => {
            warn!(problem = %problem.slug, "Ignoring caller test cases in submit mode");
            &problem.signature.test_cases
        }
        (_, None) => &problem.signature.test_cases,
    }
}

/// Run mode takes a prefix, submit mode takes everything, order preserved.
pub fn select_test_cases(cases: &[TestCase], mode: JudgeMode) -> &[TestCase] {
    match mode {
        JudgeMode::Run => &cases[..cases.len().min(RUN_MODE_CASE_LIMIT)],
        JudgeMode::Submit => cases,
    }
}

/// Everything one judging run reads
pub struct JudgeTask<'a> {
    pub problem: &'a Problem,
    pub profile: &'a LanguageProfile,
    pub code: &'a str,
    pub version: &'a str,
    pub mode: JudgeMode,
    pub user: Option<&'a str>,
    /// Replaces the problem's test cases in run mode only
    pub test_cases: Option<&'a [TestCase]>,
}

#[derive(Debug)]
pub struct Judgement {
    pub verdict: Verdict,
    pub submission_id: Option<Uuid>,
    /// Detached submission write; the caller awaits it before releasing its slot
    pub persistence: Option<JoinHandle<()>>,
}

pub struct Judge<B> {
    backend: B,
    submissions: Arc<dyn SubmissionStore>,
    limits: ExecutionLimits,
}

impl<B: ExecutionBackend> Judge<B> {
    pub fn new(backend: B, submissions: Arc<dyn SubmissionStore>) -> Self {
        Self {
            backend,
            submissions,
            limits: ExecutionLimits::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn judge(&self, task: JudgeTask<'_>) -> Result<Judgement, JudgeError> {
        if task.code.trim().is_empty() {
            return Err(JudgeError::InvalidRequest("code is required".to_string()));
        }

        let signature = &task.problem.signature;
        let available = available_test_cases(task.problem, task.test_cases, task.mode);
        let cases = select_test_cases(available, task.mode);

        info!(
            problem = %task.problem.slug,
            language = %task.profile.slug,
            mode = %task.mode,
            test_cases = cases.len(),
            source_size = task.code.len(),
            "Judging submission"
        );

        let source = renderer::render(task.profile, task.code, signature, cases)?;
        debug!(language = %task.profile.slug, driver = %source, "Rendered driver source");

        let request = ExecuteRequest::single_file(
            &task.profile.slug,
            task.version,
            SourceFile {
                name: task.profile.extension.as_ref().map(|ext| format!("main.{}", ext)),
                content: source,
            },
            self.limits.for_problem(task.problem),
        );

        let start = std::time::Instant::now();
        let raw = self.backend.execute(&request).await?;
        let execution_ms = start.elapsed().as_millis();

        let verdict = evaluator::classify(&raw).unwrap_or_else(|e| {
            warn!(problem = %task.problem.slug, error = %e, "Degenerate execution result");
            Verdict::new(VerdictKind::RuntimeError, MISSING_RUN_DIAGNOSTIC)
        });

        info!(
            problem = %task.problem.slug,
            language = %task.profile.slug,
            status = %verdict.kind,
            execution_ms = execution_ms as u64,
            "Judging completed"
        );

        let (submission_id, persistence) = match task.mode {
            JudgeMode::Submit => {
                let record = SubmissionRecord {
                    id: Uuid::new_v4(),
                    user: task.user.map(str::to_string),
                    problem: task.problem.slug.clone(),
                    language: task.profile.slug.clone(),
                    code: task.code.to_string(),
                    status: verdict.kind,
                    output: verdict.output.clone(),
                    execution_time: verdict.execution_time,
                    memory_usage: verdict.memory_usage,
                    created_at: chrono::Utc::now(),
                };
                (Some(record.id), Some(self.persist(record)))
            }
            JudgeMode::Run => (None, None),
        };

        Ok(Judgement {
            verdict,
            submission_id,
            persistence,
        })
    }

    /// Best-effort write off the response path. Failures are logged, not retried.
    fn persist(&self, record: SubmissionRecord) -> JoinHandle<()> {
        let store = Arc::clone(&self.submissions);
        tokio::spawn(async move {
            match store.create_submission(&record).await {
                Ok(()) => info!(submission_id = %record.id, "Submission persisted"),
                Err(e) => error!(submission_id = %record.id, error = %e, "Failed to persist submission"),
            }
        })
    }
}
