mod config;
mod error;
mod evaluator;
mod executor;
mod literal;
mod piston;
mod renderer;
mod store;
mod worker;

#[cfg(test)]
mod testing;

use anyhow::Context;
use arena_common::config::Config;
use arena_common::redis;
use arena_common::types::JudgeReply;
use config::LanguageConfigManager;
use executor::Judge;
use piston::PistonClient;
use std::path::Path;
use std::sync::Arc;
use store::RedisStore;
use tokio::signal;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;
use worker::Worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.json_logs);

    info!("Arena Worker booting...");

    let languages = LanguageConfigManager::load(Path::new(&config.languages_config))
        .map_err(|e| {
            error!("Failed to load language configurations: {:#}", e);
            error!("Make sure {} exists", config.languages_config);
            e
        })?;

    info!("Loaded language configurations for: {:?}", languages.list_languages());

    let served = served_languages(&config, &languages)?;
    info!("Worker serving languages: {:?}", served);

    let piston = PistonClient::new(&config.piston_url)?;
    check_runtimes(&piston, &served).await;

    let client = ::redis::Client::open(config.redis_url.as_str())
        .with_context(|| format!("Invalid REDIS_URL: {}", config.redis_url))?;
    let mut redis_conn = ::redis::aio::ConnectionManager::new(client)
        .await
        .context("Failed to connect to Redis")?;

    info!("Connected to Redis: {}", config.redis_url);

    let store = Arc::new(RedisStore::new(redis_conn.clone()));
    let worker = Arc::new(Worker::new(Judge::new(piston, store.clone()), store, languages));

    // Setup graceful shutdown
    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => warn!("Received shutdown signal, finishing in-flight requests..."),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    };

    let permits = Arc::new(Semaphore::new(config.concurrency));

    tokio::select! {
        _ = worker_loop(&mut redis_conn, worker, &served, permits.clone(), config.poll_timeout_seconds) => {},
        _ = shutdown => {},
    }

    // Wait for in-flight judging tasks to release their permits
    let _drained = permits.acquire_many(config.concurrency as u32).await;

    info!("Worker shutdown complete");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// WORKER_LANGUAGES narrows the configured set; every entry must be configured
fn served_languages(config: &Config, languages: &LanguageConfigManager) -> anyhow::Result<Vec<String>> {
    if config.worker_languages.is_empty() {
        return Ok(languages.list_languages());
    }

    for slug in &config.worker_languages {
        if languages.get_profile(slug).is_none() {
            anyhow::bail!(
                "Language '{}' is not configured (available: {:?})",
                slug,
                languages.list_languages()
            );
        }
    }

    Ok(config.worker_languages.clone())
}

/// Boot-time sanity check; the backend may gain runtimes later, so only warn
async fn check_runtimes(piston: &PistonClient, served: &[String]) {
    match piston.runtimes().await {
        Ok(runtimes) => {
            for slug in served {
                if !runtimes.iter().any(|runtime| runtime.serves(slug)) {
                    warn!(language = %slug, backend = %piston.base_url(), "Execution backend has no runtime for language");
                }
            }
        }
        Err(e) => warn!(backend = %piston.base_url(), error = %e, "Could not list backend runtimes"),
    }
}

#[instrument(skip_all, fields(languages = ?served))]
async fn worker_loop(
    redis_conn: &mut ::redis::aio::ConnectionManager,
    worker: Arc<Worker<PistonClient>>,
    served: &[String],
    permits: Arc<Semaphore>,
    poll_timeout_seconds: f64,
) {
    loop {
        // Hold a permit before popping so queued work stays in Redis while saturated
        let permit = match permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        // BLPOP with timeout for graceful shutdown
        match redis::pop_request(redis_conn, served, poll_timeout_seconds).await {
            Ok(Some(Ok(request))) => {
                info!(
                    request_id = %request.id,
                    language = %request.language,
                    problem = %request.problem_slug,
                    mode = %request.mode,
                    source_size = request.code.len(),
                    "Received judge request"
                );

                let worker = worker.clone();
                let mut conn = redis_conn.clone();
                tokio::spawn(async move {
                    let handled = worker.handle(&request).await;
                    publish_reply(&mut conn, request.id, &handled.reply).await;
                    // Hold the permit until the submission write lands so shutdown waits for it
                    if let Some(persistence) = handled.persistence {
                        if let Err(e) = persistence.await {
                            error!(request_id = %request.id, error = %e, "Submission write panicked");
                        }
                    }
                    drop(permit);
                });
            }
            Ok(Some(Err(malformed))) => match worker::malformed_reply(&malformed) {
                Some(reply) => {
                    warn!(request_id = %reply.request_id(), error = %malformed.error, "Rejected malformed request");
                    publish_reply(redis_conn, reply.request_id(), &reply).await;
                }
                None => error!(error = %malformed.error, "Dropped request without a readable id"),
            },
            Ok(None) => {
                // Timeout - check for shutdown
                continue;
            }
            Err(e) => {
                error!(error = %e, "Redis error");
                tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
            }
        }
    }
}

async fn publish_reply(
    conn: &mut ::redis::aio::ConnectionManager,
    request_id: Uuid,
    reply: &JudgeReply,
) {
    if let JudgeReply::Verdict(response) = reply {
        debug!(request_id = %request_id, status = %response.status, "Publishing verdict");
    }

    match redis::store_reply(conn, reply).await {
        Ok(()) => info!(request_id = %request_id, "Reply persisted to Redis"),
        // Non-fatal - worker continues
        Err(e) => error!(request_id = %request_id, error = %e, "Failed to persist reply"),
    }
}
