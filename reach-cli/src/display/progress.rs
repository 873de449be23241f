//! Bulk progress bar with tracing integration.
//!
//! While a [`BulkProgress`] is alive, log lines are printed through the bar
//! so they don't tear its display.

use std::io::Write;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use reach_core::bulk::ProgressCallback;

static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().ok().and_then(|guard| guard.clone())
}

/// Progress bar for a bulk run. Deregisters itself when dropped.
pub struct BulkProgress {
    bar: ProgressBar,
}

impl BulkProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("progress bar template is valid")
                .progress_chars("█▓░"),
        );

        if let Ok(mut guard) = ACTIVE_BAR.lock() {
            *guard = Some(bar.clone());
        }

        Self { bar }
    }

    /// Callback for [`reach_core::BulkExecutor::execute`].
    pub fn callback(&self) -> ProgressCallback {
        let bar = self.bar.clone();
        Box::new(move |current, _total, domain| {
            bar.set_position(current as u64);
            bar.set_message(domain.to_string());
        })
    }
}

impl Drop for BulkProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
        if let Ok(mut guard) = ACTIVE_BAR.lock() {
            *guard = None;
        }
    }
}

/// Line-buffered writer that goes through the active bar, or stderr.
#[derive(Default)]
pub struct ProgressWriter {
    buffer: Vec<u8>,
}

impl ProgressWriter {
    fn emit(line: &str) -> std::io::Result<()> {
        match active_bar() {
            Some(bar) => {
                bar.println(line);
                Ok(())
            }
            None => writeln!(std::io::stderr(), "{}", line),
        }
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            Self::emit(String::from_utf8_lossy(&line).trim_end_matches('\n'))?;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            let rest = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
            self.buffer.clear();
            if !rest.is_empty() {
                Self::emit(&rest)?;
            }
        }
        Ok(())
    }
}

impl Drop for ProgressWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// A MakeWriter for tracing-subscriber that creates ProgressWriters.
#[derive(Default)]
pub struct ProgressWriterFactory;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for ProgressWriterFactory {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ProgressWriter::default()
    }
}
