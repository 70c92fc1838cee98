// Result handlers.
//
// GET /api/results: every ClassificationResult of the last job
// GET /api/summary: SummaryStats, recomputed on each request
// GET /api/distribution: per-category score values for plotting
// GET /api/results.csv: CSV export as a download

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::output::export::{to_csv_bytes, DEFAULT_EXPORT_NAME};
use crate::stats::{summarize, toxicity_distribution};
use crate::web::{api_error, AppState};

pub async fn list_results(State(state): State<AppState>) -> impl IntoResponse {
    let job = state.job.read().await;
    Json(serde_json::json!({
        "results": job.results,
        "total": job.results.len(),
    }))
}

pub async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let job = state.job.read().await;
    Json(summarize(&job.results))
}

pub async fn get_distribution(State(state): State<AppState>) -> impl IntoResponse {
    let job = state.job.read().await;
    Json(toxicity_distribution(&job.results))
}

pub async fn download_csv(State(state): State<AppState>) -> Response {
    let job = state.job.read().await;
    match to_csv_bytes(&job.results) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DEFAULT_EXPORT_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build CSV export");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to build CSV export")
        }
    }
}
