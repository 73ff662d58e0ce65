/// Execution Client - Piston HTTP Backend
///
/// **Core Responsibility:**
/// Send one compile/run request to the sandboxed execution backend and hand
/// back its raw result.
///
/// **Boundary:**
/// - Knows the backend's wire format and nothing about verdicts
/// - Transport problems (unreachable, non-2xx, unparseable body) become
///   `JudgeError::ExecutionUnavailable`
/// - Compile and runtime failures reported *by* the backend are data, not errors
/// - No retries here; retry policy belongs to callers

use crate::error::JudgeError;
use arena_common::types::Problem;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RUN_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 128_000_000;

/// HTTP timeout for calls that run no user code
const LISTING_TIMEOUT_SECS: u64 = 30;

/// Slack on top of an execution's own limits, covering queueing and
/// container setup on the backend, so the backend's timeout fires first.
const EXECUTION_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    pub compile_timeout_ms: u64,
    pub run_timeout_ms: u64,
    pub memory_limit_bytes: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            compile_timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
            run_timeout_ms: DEFAULT_RUN_TIMEOUT_MS,
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
        }
    }
}

impl ExecutionLimits {
    /// Apply a problem's own limits on top of these
    pub fn for_problem(self, problem: &Problem) -> Self {
        Self {
            run_timeout_ms: problem
                .time_limit
                .filter(|secs| *secs > 0.0)
                .map(|secs| (secs * 1000.0).round() as u64)
                .unwrap_or(self.run_timeout_ms),
            memory_limit_bytes: problem
                .memory_limit
                .filter(|kb| *kb > 0)
                .map(|kb| kb.saturating_mul(1000))
                .unwrap_or(self.memory_limit_bytes),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecuteRequest {
    pub language: String,
    pub version: String,
    pub files: Vec<SourceFile>,
    pub stdin: String,
    pub args: Vec<String>,
    pub compile_timeout: u64,
    pub run_timeout: u64,
    pub memory_limit: u64,
}

impl ExecuteRequest {
    /// Single-file request with empty stdin; test inputs live in the source.
    pub fn single_file(language: &str, version: &str, file: SourceFile, limits: ExecutionLimits) -> Self {
        Self {
            language: language.to_string(),
            version: version.to_string(),
            files: vec![file],
            stdin: String::new(),
            args: Vec::new(),
            compile_timeout: limits.compile_timeout_ms,
            run_timeout: limits.run_timeout_ms,
            memory_limit: limits.memory_limit_bytes,
        }
    }

    /// HTTP deadline for this request, derived from its compile and run limits
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout.saturating_add(self.run_timeout))
            .saturating_add(EXECUTION_TIMEOUT_MARGIN)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompilePhase {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunPhase {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub signal: Option<String>,
    #[serde(default, alias = "wall_time")]
    pub time: Option<f64>,
    #[serde(default)]
    pub memory: Option<u64>,
}

impl RunPhase {
    /// Killed processes report no code; treat that as a failure
    pub fn exit_code(&self) -> i64 {
        self.code.unwrap_or(1)
    }
}

/// Backend answer for one execution call
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawExecutionResult {
    #[serde(default)]
    pub compile: Option<CompilePhase>,
    #[serde(default)]
    pub run: Option<RunPhase>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Runtime {
    pub language: String,
    pub version: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl Runtime {
    pub fn serves(&self, slug: &str) -> bool {
        self.language == slug || self.aliases.iter().any(|alias| alias == slug)
    }
}

/// Seam between the orchestrator and whatever runs the code
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, request: &ExecuteRequest) -> Result<RawExecutionResult, JudgeError>;
}

pub struct PistonClient {
    client: Client,
    base_url: String,
}

impl PistonClient {
    pub fn new(base_url: &str) -> Result<Self, JudgeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(LISTING_TIMEOUT_SECS))
            .build()
            .map_err(|e| JudgeError::ExecutionUnavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /runtimes
    pub async fn runtimes(&self) -> Result<Vec<Runtime>, JudgeError> {
        let url = format!("{}/runtimes", self.base_url);
        let response = self.client.get(&url).send().await.map_err(unreachable)?;
        let response = ensure_success(response).await?;

        response.json().await.map_err(malformed)
    }
}

#[async_trait]
impl ExecutionBackend for PistonClient {
    async fn execute(&self, request: &ExecuteRequest) -> Result<RawExecutionResult, JudgeError> {
        let url = format!("{}/execute", self.base_url);
        debug!(
            language = %request.language,
            version = %request.version,
            run_timeout_ms = request.run_timeout,
            "Dispatching execution request"
        );

        let response = self
            .client
            .post(&url)
            .timeout(request.http_timeout())
            .json(request)
            .send()
            .await
            .map_err(unreachable)?;
        let response = ensure_success(response).await?;

        response.json().await.map_err(malformed)
    }
}

fn unreachable(e: reqwest::Error) -> JudgeError {
    JudgeError::ExecutionUnavailable(format!("execution backend unreachable: {}", e))
}

fn malformed(e: reqwest::Error) -> JudgeError {
    JudgeError::ExecutionUnavailable(format!("malformed execution backend response: {}", e))
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, JudgeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(JudgeError::ExecutionUnavailable(format!(
        "execution backend returned {}: {}",
        status,
        body.trim()
    )))
}
