// GET /api/status: progress of the current or last analysis.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::web::AppState;

pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let job = state.job.read().await;

    Json(serde_json::json!({
        "running": job.running,
        "file_name": job.file_name,
        "started_at": job.started_at,
        "finished_at": job.finished_at,
        "processed": job.processed,
        "total": job.total,
        "progress": job.fraction(),
        "progress_message": job.progress_message,
        "last_error": job.last_error,
        "results_available": !job.results.is_empty(),
    }))
}
