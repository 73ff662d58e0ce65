// In-memory collaborators shared by unit tests
use crate::error::JudgeError;
use crate::piston::{ExecuteRequest, ExecutionBackend, RawExecutionResult, RunPhase};
use crate::store::{ProblemStore, SubmissionStore};
use arena_common::types::{LanguageProfile, Problem, SubmissionRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Backend returning a canned result and recording what it was sent
pub struct FakeBackend {
    result: Option<RawExecutionResult>,
    requests: Mutex<Vec<ExecuteRequest>>,
}

impl FakeBackend {
    pub fn returning(result: RawExecutionResult) -> Self {
        Self { result: Some(result), requests: Mutex::new(Vec::new()) }
    }

    pub fn unreachable() -> Self {
        Self { result: None, requests: Mutex::new(Vec::new()) }
    }

    pub fn sent(&self) -> Vec<ExecuteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionBackend for FakeBackend {
    async fn execute(&self, request: &ExecuteRequest) -> Result<RawExecutionResult, JudgeError> {
        self.requests.lock().unwrap().push(request.clone());
        self.result
            .clone()
            .ok_or_else(|| JudgeError::ExecutionUnavailable("connection refused".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub problems: HashMap<String, Problem>,
    pub records: Mutex<Vec<SubmissionRecord>>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn with_problem(mut self, problem: Problem) -> Self {
        self.problems.insert(problem.slug.clone(), problem);
        self
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }
}

#[async_trait]
impl ProblemStore for MemoryStore {
    async fn get_problem(&self, slug: &str) -> anyhow::Result<Option<Problem>> {
        if self.fail {
            anyhow::bail!("database is down");
        }
        Ok(self.problems.get(slug).cloned())
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn create_submission(&self, record: &SubmissionRecord) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("database is down");
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub fn accepted() -> RawExecutionResult {
    RawExecutionResult {
        compile: None,
        run: Some(RunPhase {
            stdout: "{\"status\": \"Accepted\"}\n".to_string(),
            code: Some(0),
            time: Some(0.05),
            memory: Some(4096),
            ..Default::default()
        }),
    }
}

/// `double(n) = 2n` with `count` cases
pub fn problem_with_cases(count: i64) -> Problem {
    let cases: Vec<String> = (0..count)
        .map(|n| format!(r#"{{"input": [{}], "output": {}}}"#, n, n * 2))
        .collect();
    serde_json::from_str(&format!(
        r#"{{"slug": "double", "function_name": "double", "return_type": "int",
            "argument_types": ["int"], "test_cases": [{}]}}"#,
        cases.join(", ")
    ))
    .unwrap()
}

pub fn python(harness: &str) -> LanguageProfile {
    LanguageProfile {
        slug: "python".to_string(),
        name: "Python".to_string(),
        version: "*".to_string(),
        harness: harness.to_string(),
        boilerplate: String::new(),
        extension: Some("py".to_string()),
        fallback_element_type: None,
    }
}
