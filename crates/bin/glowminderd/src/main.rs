//! # glowminderd — glowminder daemon
//!
//! Composition root that wires all adapters together, starts the delivery
//! engine and serves the HTTP API.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository and queue implementations (adapters)
//! - Pick the device: HTTP lamp controller or the virtual lamp
//! - Construct application services, injecting adapters via port traits
//! - Start the reminder scheduler
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT): drain HTTP, then stop the
//!   scheduler and wait for in-flight cycles
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod device;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use glowminder_adapter_http_axum::state::AppState;
use glowminder_adapter_storage_sqlite_sqlx::{SqliteReminderRepository, SqliteTaskQueue};
use glowminder_app::clock::SystemClock;
use glowminder_app::ports::TaskQueue;
use glowminder_app::scheduler::ReminderScheduler;
use glowminder_app::services::conversation_service::ConversationService;
use glowminder_app::services::reminder_service::ReminderService;

use crate::config::Config;
use crate::device::Lamp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = config
        .storage()
        .build()
        .await
        .context("opening the database")?;
    let pool = db.pool().clone();

    // Stores
    let repo = Arc::new(SqliteReminderRepository::new(pool.clone()));
    let queue = Arc::new(SqliteTaskQueue::new(pool));
    let pending = queue.len().await.context("counting pending tasks")?;
    tracing::info!(pending, "task queue ready");

    // Device
    let lamp = Lamp::from_config(config.device().as_ref()).context("building the device client")?;
    tracing::info!(device = lamp.describe(), "device selected");

    // Services
    let clock = SystemClock;
    let settings = config
        .conversation()
        .context("reading conversation settings")?;
    let reminder_service = Arc::new(ReminderService::new(Arc::clone(&repo), Arc::clone(&queue)));
    let conversation_service = Arc::new(ConversationService::new(
        Arc::clone(&reminder_service),
        clock,
        settings,
    ));

    // Scheduler
    let scheduler = ReminderScheduler::new(queue, repo, lamp, clock, config.scheduler());
    scheduler.start().context("starting the scheduler")?;
    tracing::info!(
        cycle_secs = config.scheduler().cycle_duration.as_secs(),
        "scheduler started"
    );

    // HTTP
    let state = AppState::new(reminder_service, conversation_service, Arc::new(clock));
    let app = glowminder_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!("glowminderd listening on http://{bind_addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http");

    tracing::info!("http server stopped, waiting for in-flight cycles");
    match scheduler.stop().await {
        Ok(()) => tracing::info!("scheduler stopped"),
        Err(err) => tracing::error!(error = %err, "scheduler stopped with an error"),
    }
    db.close().await;

    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
