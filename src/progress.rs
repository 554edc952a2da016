//! Terminal progress display for exports.
//!
//! Draws a transient bar on stderr so stdout only ever carries the rendered
//! document. The bar is cleared when fetching ends or the sink is dropped.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::export::ProgressSink;

/// Progress sink backed by an `indicatif` progress bar.
pub struct ProgressBarSink {
    bar: ProgressBar,
}

impl ProgressBarSink {
    /// Create a bar drawing to stderr. The length is set once the
    /// approximate issue count is known.
    pub fn stderr() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Create a bar that never draws.
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message("Fetching issues...");
        Self { bar }
    }

    /// Current position of the bar.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Current length of the bar, if known.
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl ProgressSink for ProgressBarSink {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn advance(&self, count: u64) {
        self.bar.inc(count);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for ProgressBarSink {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
