// Problem and submission store collaborators, backed by Redis

use anyhow::{Context, Result};
use arena_common::redis;
use arena_common::types::{Problem, SubmissionRecord};
use async_trait::async_trait;
use ::redis::aio::ConnectionManager;

/// Read-only access to problem definitions
#[async_trait]
pub trait ProblemStore: Send + Sync {
    async fn get_problem(&self, slug: &str) -> Result<Option<Problem>>;
}

/// Write side for submit-mode results
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create_submission(&self, record: &SubmissionRecord) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ProblemStore for RedisStore {
    async fn get_problem(&self, slug: &str) -> Result<Option<Problem>> {
        let mut conn = self.conn.clone();
        redis::get_problem(&mut conn, slug)
            .await
            .with_context(|| format!("Failed to load problem '{}'", slug))
    }
}

#[async_trait]
impl SubmissionStore for RedisStore {
    async fn create_submission(&self, record: &SubmissionRecord) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::store_submission(&mut conn, record)
            .await
            .with_context(|| format!("Failed to store submission {}", record.id))
    }
}
