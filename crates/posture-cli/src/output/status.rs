//! Live status line using indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use posture_core::{EventHandler, Posture, PostureEvent};

/// Spinner on stderr showing the sample count and the latest posture.
pub struct StatusLine {
    bar: ProgressBar,
}

impl StatusLine {
    /// Creates and starts the spinner.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} sample(s), {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message("waiting for first sample");
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar }
    }

    /// Stops the spinner, leaving the last status visible.
    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler<PostureEvent> for StatusLine {
    fn handle(&self, event: &PostureEvent) -> anyhow::Result<()> {
        self.bar.inc(1);
        self.bar.set_message(describe(&event.posture));
        Ok(())
    }
}

fn describe(posture: &Posture) -> String {
    if posture.is_unknown() {
        return String::from("nobody in view");
    }
    format!(
        "{} posture ({:.0}%)",
        posture.posture_type(),
        posture.confidence() * 100.0
    )
}
