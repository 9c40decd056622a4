//! # taskrec-server
//!
//! Service entry point: configuration, logging, PostgreSQL repository,
//! Redis cache, in-process ingestion queue and the axum HTTP surface.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use taskrec::cache::LruTaskCache;
use taskrec::config::ConfigManager;
use taskrec::logging::init_structured_logging;
use taskrec::messaging::{InProcessQueue, MessageQueue, TaskConsumer};
use taskrec::repository::PostgresTaskRepository;
use taskrec::services::TaskService;
use taskrec::web::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let manager = ConfigManager::load().context("failed to load configuration")?;
    let config = manager.config().clone();
    info!(environment = manager.environment(), "starting taskrec-server");

    let repository = PostgresTaskRepository::connect(&config.database)
        .await
        .context("failed to connect to postgres")?;
    repository
        .ensure_schema()
        .await
        .context("failed to bootstrap database schema")?;

    let cache = LruTaskCache::connect(&config.redis)
        .await
        .context("failed to connect to redis cache")?;

    let service = Arc::new(TaskService::new(Arc::new(repository), Arc::new(cache)));

    let (queue, queue_rx) = InProcessQueue::new(config.messaging.channel_capacity);
    let queue = Arc::new(queue);
    let consumer = TaskConsumer::spawn(service.clone(), queue_rx);

    let state = AppState::new(service, queue.clone(), config.server.clone());
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Close the ingestion queue and let the consumer drain.
    queue.close();
    let _ = consumer.await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
