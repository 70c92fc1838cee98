// Background analysis job: runs the batch pipeline when triggered via
// POST /api/analyze.
//
// Only one job runs at a time; the handler returns 409 if one is active.
// Progress is written into the shared AnalysisJob with try_write so the
// batch never waits on a status reader.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::classifier::LlmClassifier;
use crate::models::ClassificationResult;
use crate::pipeline::batch::process_all;
use crate::pipeline::progress::ProgressObserver;

use super::AppState;

/// Live state of the current (or last) analysis, exposed via GET /api/status.
#[derive(Debug, Clone, Default)]
pub struct AnalysisJob {
    /// True while a batch is in progress.
    pub running: bool,
    /// Name of the uploaded file, if the client sent one.
    pub file_name: Option<String>,
    /// RFC 3339 timestamp of when the current/last job started.
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub processed: usize,
    pub total: usize,
    /// Human-readable progress message updated as comments complete.
    pub progress_message: String,
    /// Error that halted the last job, if any.
    pub last_error: Option<String>,
    /// Results of the last job (partial if it halted).
    pub results: Vec<ClassificationResult>,
}

impl AnalysisJob {
    /// Fresh state for a job about to start on `total` comments.
    pub fn starting(file_name: Option<String>, total: usize) -> Self {
        Self {
            running: true,
            file_name,
            started_at: Some(Utc::now().to_rfc3339()),
            total,
            progress_message: format!("Starting analysis for {total} comments…"),
            ..Self::default()
        }
    }

    /// Fraction of comments processed, 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// Bridges pipeline progress into the shared job state.
struct JobProgress {
    job: Arc<RwLock<AnalysisJob>>,
    halted: Mutex<Option<String>>,
}

impl ProgressObserver for JobProgress {
    fn on_progress(&self, processed: usize, total: usize) {
        // Skip the update rather than wait if a reader holds the lock.
        if let Ok(mut job) = self.job.try_write() {
            job.processed = processed;
            job.total = total;
            job.progress_message = format!("Processed {processed} of {total} comments");
        }
    }

    fn on_halted(&self, _processed: usize, error: &str) {
        if let Ok(mut halted) = self.halted.lock() {
            *halted = Some(error.to_string());
        }
    }
}

/// Launch the batch in a background tokio task.
/// Returns immediately. Callers poll `job.running` to track progress.
pub fn launch_analysis(state: &AppState, comments: Vec<String>) {
    let classifier = LlmClassifier::new(state.client.clone(), state.throttle.clone());
    let job = state.job.clone();

    let handle = tokio::spawn(run_analysis(classifier, job.clone(), comments));
    tokio::spawn(clear_if_failed(job, handle));
}

async fn run_analysis(
    classifier: LlmClassifier,
    job: Arc<RwLock<AnalysisJob>>,
    comments: Vec<String>,
) {
    let progress = JobProgress {
        job: job.clone(),
        halted: Mutex::new(None),
    };

    let results = process_all(&classifier, &comments, &progress).await;
    let halted = progress.halted.lock().ok().and_then(|mut h| h.take());

    let mut status = job.write().await;
    status.running = false;
    status.finished_at = Some(Utc::now().to_rfc3339());
    status.processed = results.len();

    match halted {
        Some(e) => {
            error!(error = %e, processed = results.len(), "Analysis halted");
            status.progress_message = format!(
                "Stopped after {} of {} comments, partial results kept",
                results.len(),
                status.total
            );
            status.last_error = Some(e);
        }
        None => {
            info!(processed = results.len(), "Analysis completed");
            status.progress_message =
                format!("Analysis complete for {} comments", results.len());
            status.last_error = None;
        }
    }
    status.results = results;
}

/// Wait for the job task. If it died before writing its final state, mark
/// the job stopped so new uploads are not refused with 409 forever.
async fn clear_if_failed(job: Arc<RwLock<AnalysisJob>>, handle: JoinHandle<()>) {
    let Err(e) = handle.await else {
        return;
    };

    error!(error = %e, "Analysis task failed");
    let mut status = job.write().await;
    if status.running {
        status.running = false;
        status.finished_at = Some(Utc::now().to_rfc3339());
        status.progress_message = "Analysis task failed".to_string();
        status.last_error = Some(format!("Analysis task failed: {e}"));
    }
}
