// POST /api/analyze: upload a comments file and start a background batch.
//
// The request body is the raw file. `?format=csv|json` picks the parser;
// without it the extension of `?name=` is used.
//
// Returns 202 Accepted if the batch starts, 400 if the upload is unusable,
// 409 Conflict if a batch is already running.

use std::path::Path;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::input::{parse_comments, InputFormat};
use crate::web::analysis_job::{launch_analysis, AnalysisJob};
use crate::web::{api_error, AppState};

#[derive(Deserialize, Default)]
pub struct AnalyzeQuery {
    /// `csv` or `json`
    pub format: Option<String>,
    /// Original file name, shown in status
    pub name: Option<String>,
}

/// POST /api/analyze: parse the upload and start classifying.
pub async fn start_analysis(
    State(state): State<AppState>,
    Query(params): Query<AnalyzeQuery>,
    body: Bytes,
) -> Response {
    let format = params
        .format
        .as_deref()
        .and_then(InputFormat::from_name)
        .or_else(|| {
            params
                .name
                .as_deref()
                .and_then(|n| InputFormat::from_path(Path::new(n)).ok())
        });
    let Some(format) = format else {
        return api_error(
            StatusCode::BAD_REQUEST,
            "Unknown upload format. Pass ?format=csv or ?format=json.",
        );
    };

    let comments = match parse_comments(&body, format) {
        Ok(comments) => comments,
        Err(e) => return api_error(StatusCode::BAD_REQUEST, &format!("{e:#}")),
    };
    let total = comments.len();

    let mut job = state.job.write().await;
    if job.running {
        return api_error(StatusCode::CONFLICT, "An analysis is already running");
    }
    *job = AnalysisJob::starting(params.name.clone(), total);
    drop(job);

    info!(total, file = ?params.name, "Starting analysis");
    launch_analysis(&state, comments);

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "message": "Analysis started", "total": total })),
    )
        .into_response()
}
