// Request handling: resolve collaborators, judge, shape the reply
use crate::config::LanguageConfigManager;
use crate::error::JudgeError;
use crate::executor::{Judge, JudgeTask};
use crate::piston::ExecutionBackend;
use crate::store::ProblemStore;
use arena_common::redis::MalformedRequest;
use arena_common::types::{
    FailureKind, JudgeFailure, JudgeReply, JudgeRequest, JudgeResponse, LanguageProfile,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

/// Reply for one request, plus the submission write still in flight
#[derive(Debug)]
pub struct Handled {
    pub reply: JudgeReply,
    /// Must be awaited before shutdown or the promised submission is lost
    pub persistence: Option<JoinHandle<()>>,
}

pub struct Worker<B> {
    judge: Judge<B>,
    problems: Arc<dyn ProblemStore>,
    languages: LanguageConfigManager,
}

impl<B: ExecutionBackend> Worker<B> {
    pub fn new(judge: Judge<B>, problems: Arc<dyn ProblemStore>, languages: LanguageConfigManager) -> Self {
        Self { judge, problems, languages }
    }

    /// Judge one request. Never fails: judge failures become a failure reply.
    #[instrument(skip(self, request), fields(request_id = %request.id, language = %request.language))]
    pub async fn handle(&self, request: &JudgeRequest) -> Handled {
        match self.process(request).await {
            Ok((response, persistence)) => Handled {
                reply: JudgeReply::Verdict(response),
                persistence,
            },
            Err(e) => {
                warn!(
                    error_kind = ?e.kind(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Judging failed"
                );
                Handled {
                    reply: JudgeReply::Failure(JudgeFailure {
                        request_id: request.id,
                        error_kind: e.kind(),
                        error: e.to_string(),
                        retryable: e.is_retryable(),
                    }),
                    persistence: None,
                }
            }
        }
    }

    async fn process(
        &self,
        request: &JudgeRequest,
    ) -> Result<(JudgeResponse, Option<JoinHandle<()>>), JudgeError> {
        for (field, value) in [
            ("problem_slug", &request.problem_slug),
            ("language", &request.language),
            ("code", &request.code),
        ] {
            if value.trim().is_empty() {
                return Err(JudgeError::InvalidRequest(format!("{} is required", field)));
            }
        }

        let problem = self
            .problems
            .get_problem(&request.problem_slug)
            .await
            .map_err(|e| JudgeError::StoreUnavailable(format!("{:#}", e)))?
            // Private problems are indistinguishable from missing ones
            .filter(|problem| problem.visible_to(request.user.as_deref()))
            .ok_or_else(|| JudgeError::ProblemNotFound(request.problem_slug.clone()))?;

        let profile = self
            .languages
            .get_profile(&request.language)
            .ok_or_else(|| JudgeError::LanguageNotFound(request.language.clone()))?;

        let judgement = self
            .judge
            .judge(JudgeTask {
                problem: &problem,
                profile,
                code: &request.code,
                version: backend_version(request, profile),
                mode: request.mode,
                user: request.user.as_deref(),
                test_cases: request.test_cases.as_deref(),
            })
            .await?;

        if let Some(submission_id) = judgement.submission_id {
            info!(submission_id = %submission_id, "Submission recorded");
        }

        let response = JudgeResponse {
            request_id: request.id,
            mode: request.mode,
            status: judgement.verdict.kind,
            output: judgement.verdict.output,
            execution_time: judgement.verdict.execution_time,
            memory_usage: judgement.verdict.memory_usage,
            submission_id: judgement.submission_id,
        };

        Ok((response, judgement.persistence))
    }
}

/// Failure reply for a payload that never decoded. Without a readable id
/// there is nowhere to publish it.
pub fn malformed_reply(malformed: &MalformedRequest) -> Option<JudgeReply> {
    malformed.request_id.map(|request_id| {
        JudgeReply::Failure(JudgeFailure {
            request_id,
            error_kind: FailureKind::InvalidRequest,
            error: format!("invalid request: {}", malformed.error),
            retryable: false,
        })
    })
}

/// A request pinning a version wins over the profile's default
fn backend_version<'a>(request: &'a JudgeRequest, profile: &'a LanguageProfile) -> &'a str {
    if request.version.trim().is_empty() || request.version == "*" {
        &profile.version
    } else {
        &request.version
    }
}
