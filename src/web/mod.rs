// Web server: Axum-based single-user dashboard backend.
//
// All routes serve JSON (plus one CSV download). A dashboard front-end
// uploads a file to POST /api/analyze, polls GET /api/status while the
// batch runs, then reads results, summary and distributions.
//
// No auth: the server is meant to run locally for one user.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::completion::groq::GroqClient;
use crate::completion::throttle::Throttle;
use crate::completion::traits::CompletionClient;
use crate::config::Config;

pub mod analysis_job;
pub mod handlers;

/// Largest upload accepted by POST /api/analyze.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn CompletionClient>,
    /// One throttle for the whole server, so back-to-back jobs stay spaced too
    pub throttle: Throttle,
    pub job: Arc<RwLock<analysis_job::AnalysisJob>>,
}

impl AppState {
    pub fn new(client: Arc<dyn CompletionClient>, throttle: Throttle) -> Self {
        Self {
            client,
            throttle,
            job: Arc::new(RwLock::new(analysis_job::AnalysisJob::default())),
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let client = GroqClient::new(
        config.groq_api_key.clone(),
        config.model.clone(),
        config.api_url.clone(),
        config.http_timeout,
    )?;
    info!(model = client.model(), "Using Groq chat completions");

    let state = AppState::new(Arc::new(client), Throttle::default());
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("toxiscan dashboard API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze", post(handlers::analyze::start_analysis))
        .route("/api/status", get(handlers::status::get_status))
        .route("/api/results", get(handlers::results::list_results))
        .route("/api/results.csv", get(handlers::results::download_csv))
        .route("/api/summary", get(handlers::results::get_summary))
        .route("/api/distribution", get(handlers::results::get_distribution))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check: always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn not_found() -> Response {
    api_error(StatusCode::NOT_FOUND, "Not found")
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}
