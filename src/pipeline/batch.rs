// Sequential batch driver.
//
// Comments are classified strictly in input order, one at a time. The
// throttle inside the classifier is only meaningful under that ordering.
// If a classification errors or panics, the batch stops and whatever was
// already classified is returned; partial results beat none.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::{error, info};

use super::progress::ProgressObserver;
use crate::classifier::CommentClassifier;
use crate::models::ClassificationResult;

/// Classify every comment in order, reporting progress after each one.
///
/// Returns one result per comment unless the batch halted early, in which
/// case the prefix that completed is returned.
pub async fn process_all(
    classifier: &dyn CommentClassifier,
    comments: &[String],
    progress: &dyn ProgressObserver,
) -> Vec<ClassificationResult> {
    let total = comments.len();
    let mut results = Vec::with_capacity(total);

    if total == 0 {
        return results;
    }

    info!(total, "Processing comments");

    for comment in comments {
        let outcome = AssertUnwindSafe(classifier.classify(comment))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(result)) => {
                results.push(result);
                progress.on_progress(results.len(), total);
                continue;
            }
            Ok(Err(e)) => format!("{e:#}"),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!(
            processed = results.len(),
            total,
            error = %failure,
            "Error during processing, returning partial results"
        );
        progress.on_halted(results.len(), &failure);
        return results;
    }

    info!(processed = results.len(), "Finished processing comments");
    results
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("classifier panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("classifier panicked: {s}")
    } else {
        "classifier panicked".to_string()
    }
}
