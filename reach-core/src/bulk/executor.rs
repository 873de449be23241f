use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::probe::{ReachabilityProber, ReachabilityReport};

pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkResult {
    /// The entry as it appeared in the input
    pub input: String,
    pub success: bool,
    pub report: Option<ReachabilityReport>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Checks many domains with bounded concurrency. Results keep input order.
#[derive(Debug, Clone)]
pub struct BulkExecutor {
    concurrency: usize,
    prober: ReachabilityProber,
}

impl Default for BulkExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl BulkExecutor {
    pub fn new() -> Self {
        Self {
            concurrency: 10,
            prober: ReachabilityProber::new(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_prober(mut self, prober: ReachabilityProber) -> Self {
        self.prober = prober;
        self
    }

    pub async fn execute(
        &self,
        domains: Vec<String>,
        progress: Option<ProgressCallback>,
    ) -> Vec<BulkResult> {
        let total = domains.len();
        let completed = Arc::new(AtomicUsize::new(0));

        debug!(
            total = total,
            concurrency = self.concurrency,
            "Starting bulk execution"
        );

        stream::iter(domains)
            .map(|input| {
                let completed = completed.clone();
                let progress = progress.as_ref();
                let prober = &self.prober;

                async move {
                    let start = Instant::now();
                    let result = prober.check_raw(&input).await;
                    let duration_ms = start.elapsed().as_millis() as u64;

                    let count = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(progress) = progress {
                        progress(count, total, &input);
                    }

                    match result {
                        Ok(report) => BulkResult {
                            input,
                            success: true,
                            report: Some(report),
                            error: None,
                            duration_ms,
                        },
                        Err(e) => {
                            warn!(input = %input, error = %e, "Bulk entry rejected");
                            BulkResult {
                                input,
                                success: false,
                                report: None,
                                error: Some(e.to_string()),
                                duration_ms,
                            }
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

pub fn parse_domains_from_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            // Handle CSV format (take first column)
            line.split(',').next().unwrap_or(line).trim().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domains_from_file() {
        let content = r#"
# This is a comment
example.com
https://Google.com/search
  whitespace.com
localhost
csv,format,example.org
"#;

        let domains = parse_domains_from_file(content);
        assert_eq!(
            domains,
            vec![
                "example.com",
                "https://Google.com/search",
                "whitespace.com",
                "localhost",
                "csv",
            ]
        );
    }

    #[test]
    fn test_parse_keeps_empty_csv_column_for_rejection() {
        let domains = parse_domains_from_file(" ,example.org\n");
        assert_eq!(domains, vec![""]);
    }

    #[tokio::test]
    async fn test_execute_rejects_blank_entries_without_probing() {
        let executor = BulkExecutor::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let callback: ProgressCallback = Box::new(move |_current, total, _domain| {
            assert_eq!(total, 2);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let results = executor
            .execute(vec![String::new(), "   ".to_string()], Some(callback))
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success && r.report.is_none()));
        assert_eq!(results[0].error.as_deref(), Some("missing domain"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
