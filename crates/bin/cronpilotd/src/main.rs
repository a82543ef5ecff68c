//! # cronpilotd
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository and provider implementations (adapters)
//! - Build the orchestrator and register the triggers of every enabled
//!   automation, replaying missed fires
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT) and stop every timer
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer, no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cronpilot_adapter_ai_openai::OpenAiProvider;
use cronpilot_adapter_http_axum::router;
use cronpilot_adapter_http_axum::state::AppState;
use cronpilot_adapter_storage_sqlite_sqlx::{
    SqliteAutomationRepository, SqliteExecutionRepository, SqliteInbox,
};
use cronpilot_app::actions::{ActionPipeline, InboxActionHandler};
use cronpilot_app::orchestrator::Orchestrator;
use cronpilot_app::ports::AiProvider;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    // Database
    let db = cronpilot_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to open database")?;
    let pool = db.pool().clone();

    // Repositories
    let automations = Arc::new(SqliteAutomationRepository::new(pool.clone()));
    let executions = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    let inbox = Arc::new(SqliteInbox::new(pool));

    // AI provider
    let provider = OpenAiProvider::new(&config.ai_config())?;
    if !provider.is_available() {
        tracing::warn!("no AI API key configured, executions will store a placeholder result");
    }

    // Orchestrator
    let actions = ActionPipeline::new().with_handler(InboxActionHandler::new(
        Arc::clone(&inbox),
        Arc::clone(&executions),
    ));
    let orchestrator = Orchestrator::new(
        Arc::clone(&automations),
        Arc::clone(&executions),
        provider,
        actions,
        config.scheduler_config()?,
    );
    orchestrator
        .initialize()
        .await
        .context("failed to initialize orchestrator")?;

    // HTTP
    let state = AppState::new(automations, executions, inbox, Arc::clone(&orchestrator));
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "cronpilotd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    orchestrator.cleanup();
    tracing::info!("cronpilotd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
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
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
