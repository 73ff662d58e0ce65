use crate::types::{JudgeReply, JudgeRequest, Problem, SubmissionRecord};
use redis::{AsyncCommands, RedisResult};
use uuid::Uuid;

/// Redis semantics shared by the worker and whoever enqueues requests.
/// Keys are deterministic so producers and consumers never drift.

pub const QUEUE_PREFIX: &str = "arena:queue";
pub const REPLY_PREFIX: &str = "arena:reply";
pub const PROBLEM_PREFIX: &str = "arena:problem";
pub const SUBMISSION_PREFIX: &str = "arena:submission";
pub const USER_SUBMISSIONS_PREFIX: &str = "arena:submissions";

/// Replies expire after 24 hours
pub const REPLY_TTL_SECONDS: u64 = 86400;

/// Queue for a language slug
pub fn queue_name(language: &str) -> String {
    format!("{}:{}", QUEUE_PREFIX, language)
}

pub fn reply_key(request_id: &Uuid) -> String {
    format!("{}:{}", REPLY_PREFIX, request_id)
}

pub fn problem_key(slug: &str) -> String {
    format!("{}:{}", PROBLEM_PREFIX, slug)
}

pub fn submission_key(submission_id: &Uuid) -> String {
    format!("{}:{}", SUBMISSION_PREFIX, submission_id)
}

/// Per-user index of submission ids, newest first
pub fn user_submissions_key(user: &str) -> String {
    format!("{}:{}", USER_SUBMISSIONS_PREFIX, user)
}

fn serialization_error(e: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::TypeError, "serialization error", e.to_string()))
}

fn deserialization_error(e: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::TypeError, "deserialization error", e.to_string()))
}

/// A queue payload that is not a valid `JudgeRequest`.
/// `request_id` is recovered when the payload still carries a readable `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRequest {
    pub request_id: Option<Uuid>,
    pub error: String,
}

/// Decode a queue payload, keeping enough of a bad one to answer it
pub fn decode_request(payload: &str) -> Result<JudgeRequest, MalformedRequest> {
    serde_json::from_str(payload).map_err(|e| MalformedRequest {
        request_id: serde_json::from_str::<serde_json::Value>(payload)
            .ok()
            .and_then(|raw| raw.get("id").and_then(|id| id.as_str()).map(str::to_string))
            .and_then(|id| Uuid::parse_str(&id).ok()),
        error: e.to_string(),
    })
}

/// Pop the next payload from any of the given language queues.
/// Uses BLPOP with timeout so the caller can observe shutdown.
pub async fn pop_request(
    conn: &mut redis::aio::ConnectionManager,
    languages: &[String],
    timeout_seconds: f64,
) -> RedisResult<Option<Result<JudgeRequest, MalformedRequest>>> {
    let queues: Vec<String> = languages.iter().map(|l| queue_name(l)).collect();
    let result: Option<(String, String)> = conn.blpop(queues, timeout_seconds).await?;

    Ok(result.map(|(_key, payload)| decode_request(&payload)))
}

/// Publish the caller-facing reply for a request
pub async fn store_reply(
    conn: &mut redis::aio::ConnectionManager,
    reply: &JudgeReply,
) -> RedisResult<()> {
    let key = reply_key(&reply.request_id());
    let payload = serde_json::to_string(reply).map_err(serialization_error)?;

    conn.set_ex(&key, payload, REPLY_TTL_SECONDS).await
}

pub async fn get_problem(
    conn: &mut redis::aio::ConnectionManager,
    slug: &str,
) -> RedisResult<Option<Problem>> {
    let payload: Option<String> = conn.get(problem_key(slug)).await?;

    payload
        .map(|data| serde_json::from_str(&data).map_err(deserialization_error))
        .transpose()
}

/// Persist a submission and index it under its user
pub async fn store_submission(
    conn: &mut redis::aio::ConnectionManager,
    submission: &SubmissionRecord,
) -> RedisResult<()> {
    let payload = serde_json::to_string(submission).map_err(serialization_error)?;
    let _: () = conn.set(submission_key(&submission.id), payload).await?;

    if let Some(user) = &submission.user {
        let _: () = conn
            .lpush(user_submissions_key(user), submission.id.to_string())
            .await?;
    }

    Ok(())
}
