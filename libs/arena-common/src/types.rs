use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A test-case value as stored by the problem store.
///
/// Deserialized untagged from plain JSON, so `[1, 2]` is a `List` of `Int`s
/// and `2.5` is a `Float`. JSON objects are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Number of nested list levels, following the first element.
    pub fn list_depth(&self) -> usize {
        match self {
            Value::List(items) => 1 + items.first().map(Value::list_depth).unwrap_or(0),
            _ => 0,
        }
    }
}

/// Type vocabulary used by problem signatures.
///
/// Signatures are authored once and shared by every language, so the names
/// here are language-neutral; each target dialect maps them to its own
/// spelling. Unknown names survive as `Named` and are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    Int,
    Long,
    Float,
    String,
    Boolean,
    Void,
    Array(Box<DataType>),
    Named(String),
}

impl DataType {
    pub fn array_of(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    pub fn element(&self) -> Option<&DataType> {
        match self {
            DataType::Array(inner) => Some(inner),
            _ => None,
        }
    }
}

impl FromStr for DataType {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let name = raw.trim();
        if let Some(inner) = name.strip_suffix("[]") {
            return Ok(DataType::array_of(inner.parse()?));
        }

        Ok(match name {
            "int" | "integer" => DataType::Int,
            "long" => DataType::Long,
            "float" | "double" => DataType::Float,
            "string" | "str" | "String" => DataType::String,
            "boolean" | "bool" => DataType::Boolean,
            "void" => DataType::Void,
            other => DataType::Named(other.to_string()),
        })
    }
}

impl TryFrom<String> for DataType {
    type Error = std::convert::Infallible;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<DataType> for String {
    fn from(data_type: DataType) -> Self {
        data_type.to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Long => write!(f, "long"),
            DataType::Float => write!(f, "float"),
            DataType::String => write!(f, "string"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Void => write!(f, "void"),
            DataType::Array(inner) => write!(f, "{}[]", inner),
            DataType::Named(name) => write!(f, "{}", name),
        }
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Void
    }
}

/// One input/expected-output pair. Order inside a problem is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Vec<Value>,
    #[serde(default)]
    pub output: Value,
}

/// What the harness needs to call the user's entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSignature {
    pub function_name: String,
    #[serde(default)]
    pub return_type: DataType,
    #[serde(default)]
    pub argument_types: Vec<DataType>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Problem-store record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(flatten)]
    pub signature: ProblemSignature,
    #[serde(default = "default_public")]
    pub is_public: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    /// Seconds
    #[serde(default)]
    pub time_limit: Option<f64>,
    /// Kilobytes
    #[serde(default)]
    pub memory_limit: Option<u64>,
}

fn default_public() -> bool {
    true
}

impl Problem {
    /// Private problems are only visible to their author.
    pub fn visible_to(&self, user: Option<&str>) -> bool {
        self.is_public || (user.is_some() && self.created_by.as_deref() == user)
    }
}

/// A language as the language store knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub slug: String,
    pub name: String,
    /// Execution-backend version selector; `*` means latest.
    pub version: String,
    /// Harness template text. Empty means "run the user code as-is".
    pub harness: String,
    /// Starter-code template filled from the signature. Empty means no stub.
    #[serde(default)]
    pub boilerplate: String,
    pub extension: Option<String>,
    pub fallback_element_type: Option<DataType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JudgeMode {
    #[default]
    Run,
    Submit,
}

impl fmt::Display for JudgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JudgeMode::Run => write!(f, "run"),
            JudgeMode::Submit => write!(f, "submit"),
        }
    }
}

/// Closed set of judging outcomes.
///
/// Serialized with the spelling harnesses print in their status records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictKind {
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
    #[serde(rename = "Runtime Error")]
    RuntimeError,
    #[serde(rename = "Compilation Error")]
    CompilationError,
    #[serde(rename = "Time Limit Exceeded")]
    TimeLimitExceeded,
    Pending,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Accepted => "Accepted",
            VerdictKind::WrongAnswer => "Wrong Answer",
            VerdictKind::RuntimeError => "Runtime Error",
            VerdictKind::CompilationError => "Compilation Error",
            VerdictKind::TimeLimitExceeded => "Time Limit Exceeded",
            VerdictKind::Pending => "Pending",
        }
    }

    /// Parse a status label, ignoring case, spaces, underscores and dashes,
    /// so `"Wrong Answer"`, `"WrongAnswer"` and `"wrong_answer"` all match.
    pub fn from_label(label: &str) -> Option<Self> {
        let folded: String = label
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "accepted" => Some(VerdictKind::Accepted),
            "wronganswer" => Some(VerdictKind::WrongAnswer),
            "runtimeerror" => Some(VerdictKind::RuntimeError),
            "compilationerror" => Some(VerdictKind::CompilationError),
            "timelimitexceeded" => Some(VerdictKind::TimeLimitExceeded),
            "pending" => Some(VerdictKind::Pending),
            _ => None,
        }
    }
}

impl fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal output of one judging run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub kind: VerdictKind,
    pub output: String,
    pub execution_time: Option<f64>,
    pub memory_usage: Option<u64>,
}

impl Verdict {
    pub fn new(kind: VerdictKind, output: impl Into<String>) -> Self {
        Self {
            kind,
            output: output.into(),
            execution_time: None,
            memory_usage: None,
        }
    }
}

/// Queue payload asking a worker to judge one piece of code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeRequest {
    pub id: Uuid,
    /// Missing text fields decode as empty and are rejected by the worker,
    /// so the caller still gets a reply.
    #[serde(default)]
    pub problem_slug: String,
    #[serde(default)]
    pub language: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub mode: JudgeMode,
    #[serde(default)]
    pub user: Option<String>,
    /// Replaces the problem's own test cases in run mode; ignored on submit.
    #[serde(default)]
    pub test_cases: Option<Vec<TestCase>>,
}

pub fn default_version() -> String {
    "*".to_string()
}

/// Caller-facing verdict shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResponse {
    pub request_id: Uuid,
    pub mode: JudgeMode,
    pub status: VerdictKind,
    pub output: String,
    pub execution_time: Option<f64>,
    pub memory_usage: Option<u64>,
    pub submission_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidRequest,
    ProblemNotFound,
    LanguageNotFound,
    Template,
    ExecutionUnavailable,
    StoreUnavailable,
}

/// Caller-facing shape for "the judge failed", as opposed to "your code failed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeFailure {
    pub request_id: Uuid,
    pub error_kind: FailureKind,
    pub error: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JudgeReply {
    Verdict(JudgeResponse),
    Failure(JudgeFailure),
}

impl JudgeReply {
    pub fn request_id(&self) -> Uuid {
        match self {
            JudgeReply::Verdict(response) => response.request_id,
            JudgeReply::Failure(failure) => failure.request_id,
        }
    }
}

/// Submission-store write, produced in submit mode only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub user: Option<String>,
    pub problem: String,
    pub language: String,
    pub code: String,
    pub status: VerdictKind,
    pub output: String,
    pub execution_time: Option<f64>,
    pub memory_usage: Option<u64>,
    pub created_at: DateTime<Utc>,
}
