//! Router construction and server lifecycle.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::grammar_check;
use super::types::HealthResponse;
use crate::config::Config;
use crate::grammar::GrammarChecker;
use crate::tasks::{TaskManager, TaskStats};

/// Shared application state.
pub struct AppState {
    pub tasks: TaskManager,
}

impl AppState {
    pub fn new(tasks: TaskManager) -> Self {
        Self { tasks }
    }

    /// Wire the completion client and task manager described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let checker = GrammarChecker::new(config.llm_client(), config.retry.clone());
        Self::new(TaskManager::new(checker))
    }
}

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(get_stats))
        .route("/grammar-check", post(grammar_check::submit))
        .route("/grammar-check/tasks", get(grammar_check::list))
        .route("/grammar-check/status/:task_id", get(grammar_check::status))
        .route(
            "/grammar-check/status/:task_id/stream",
            get(grammar_check::stream),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(&config));
    tracing::info!(
        backend = ?config.backend,
        model = %state.tasks.model(),
        max_attempts = config.retry.max_attempts,
        "Grammar checker ready"
    );

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM. Pending tasks are dropped with the process.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.tasks.model().to_string(),
    })
}

/// Task counts by status.
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<TaskStats> {
    Json(state.tasks.stats().await)
}
