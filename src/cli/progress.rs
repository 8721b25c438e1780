//! CLI-specific progress handling for traffic-phase
//!
//! Provides the progress bar shown while a command file is replayed.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use traffic_phase::ProgressCallback;

/// Creates a progress bar counting processed commands
pub fn create_progress_bar(total_commands: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_commands);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} commands ({percent}%) ETA: {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Progress manager for a simulation run
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_commands: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_commands);

        // Print initial message to stderr
        eprintln!("{message}");

        Self { pb }
    }

    /// Callback driving the bar, finishing it after the last command
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |processed: u64, total: u64| {
            if pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            pb.set_position(processed);
            if processed >= total {
                pb.finish_with_message("✅ Simulation completed!");
            }
        })
    }
}
