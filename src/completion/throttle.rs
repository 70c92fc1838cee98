// Start-to-start request throttle.
//
// The completion API is rate-limited, so calls are spaced at least
// `interval` apart measured from the start of one call to the start of the
// next. The baseline is stamped when a caller is let through, before the
// call is made, so a slow call does not shorten the gap to the next one.
//
// Time comes from tokio::time, which lets tests drive the throttle with a
// paused clock instead of real sleeps.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Minimum spacing between the starts of two completion calls.
pub const REQUEST_INTERVAL: Duration = Duration::from_secs(3);

/// Enforces a minimum interval between the starts of successive calls.
#[derive(Clone)]
pub struct Throttle {
    inner: Arc<Mutex<ThrottleInner>>,
}

struct ThrottleInner {
    interval: Duration,
    /// When the previous call was let through
    last_call: Option<Instant>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(REQUEST_INTERVAL)
    }
}

impl Throttle {
    /// Create a throttle with the given start-to-start interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ThrottleInner {
                interval,
                last_call: None,
            })),
        }
    }

    /// Wait until `interval` has passed since the previous call started,
    /// then record now as the new baseline.
    ///
    /// Returns immediately on the first call.
    pub async fn wait_if_needed(&self) {
        // The lock stays held across the sleep: a second caller queues behind
        // it and measures its own wait from the baseline stamped below.
        let mut inner = self.inner.lock().await;

        if let Some(last) = inner.last_call {
            let elapsed = Instant::now().duration_since(last);
            if elapsed < inner.interval {
                let wait = inner.interval - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "Throttling next request");
                tokio::time::sleep(wait).await;
            }
        }

        inner.last_call = Some(Instant::now());
    }
}
