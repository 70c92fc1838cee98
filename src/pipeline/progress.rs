use indicatif::{ProgressBar, ProgressStyle};

/// Receives progress notifications from the batch driver.
///
/// Called inline on the processing flow, so implementations must return
/// quickly and never block.
pub trait ProgressObserver: Send + Sync {
    /// `processed` of `total` comments have a result.
    fn on_progress(&self, processed: usize, total: usize);

    /// The batch stopped early after `processed` comments.
    fn on_halted(&self, _processed: usize, _error: &str) {}
}

/// No-op observer for tests and callers that don't track progress.
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_progress(&self, _processed: usize, _total: usize) {}
}

/// Terminal progress bar for the CLI.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("  Analyzing [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for TerminalProgress {
    fn on_progress(&self, processed: usize, _total: usize) {
        self.bar.set_position(processed as u64);
    }

    fn on_halted(&self, processed: usize, error: &str) {
        self.bar
            .abandon_with_message(format!("stopped after {processed}: {error}"));
    }
}
