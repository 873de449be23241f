use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr while a single domain is being checked.
///
/// Shows the elapsed time next to the probe timeout, so a stalled probe is
/// visibly waiting rather than hung.
pub struct Spinner {
    progress: ProgressBar,
}

impl Spinner {
    pub fn checking(domain: &str, timeout: Duration) -> Self {
        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.set_message(format!(
            "Checking {} (DNS, HTTP, HTTPS; timeout {} ms)",
            domain.trim(),
            timeout.as_millis()
        ));
        progress.enable_steady_tick(Duration::from_millis(80));

        Self { progress }
    }

    /// Stop the spinner. A rejected input leaves a short note behind; a
    /// finished check clears the line so the report prints cleanly.
    pub fn finish(self, checked: bool) {
        if checked {
            self.progress.finish_and_clear();
        } else {
            self.progress.abandon_with_message("Check not started");
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.progress.is_finished() {
            self.progress.finish_and_clear();
        }
    }
}
