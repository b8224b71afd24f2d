//! Progress indicators using indicatif

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::application::ports::ProgressSink;
use crate::domain::api::ProgressUpdate;

/// Create a spinner for indeterminate progress.
///
/// # Panics
///
/// Panics if the spinner template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Renders operation progress as a single overwritten status line.
///
/// Disabled (all methods no-ops) when output is suppressed or stdout is
/// not a terminal.
pub struct OperationProgress {
    pb: Option<ProgressBar>,
}

impl OperationProgress {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            pb: enabled.then(|| spinner("Retrieving image")),
        }
    }
}

impl ProgressSink for OperationProgress {
    fn update(&self, update: &ProgressUpdate) {
        if let Some(pb) = &self.pb {
            pb.set_message(format!("Retrieving image: {}", update.message));
        }
    }

    fn done(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}
