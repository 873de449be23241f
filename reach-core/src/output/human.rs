use colored::Colorize;

use super::OutputFormatter;
use crate::bulk::BulkResult;
use crate::colors::CatppuccinExt;
use crate::probe::{ReachabilityReport, Scheme};

pub struct HumanFormatter {
    use_colors: bool,
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn label(&self, text: &str) -> String {
        if self.use_colors {
            text.sky().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn value(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_white().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn warning(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.use_colors {
            text.ctp_red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(&self, text: &str) -> String {
        if self.use_colors {
            format!("\n{}\n{}", text.lavender().bold(), "─".repeat(text.len()).subtext0())
        } else {
            format!("\n{}\n{}", text, "-".repeat(text.len()))
        }
    }

    fn probe_line(&self, report: &ReachabilityReport, scheme: Scheme) -> String {
        let probe = report.probe(scheme);
        let outcome = match (probe.status_code, probe.error.as_deref()) {
            (Some(status), _) if probe.ok && status < 300 => {
                format!("{} {}", self.success("✓"), self.success(&status.to_string()))
            }
            (Some(status), _) if probe.ok => {
                format!("{} {}", self.success("✓"), self.warning(&status.to_string()))
            }
            (Some(status), _) => {
                format!("{} {}", self.error("✗"), self.error(&status.to_string()))
            }
            (None, error) => format!(
                "{} {}",
                self.error("✗"),
                self.error(error.unwrap_or("no response"))
            ),
        };

        format!(
            "  {}: {}  {}",
            self.label(&scheme.as_str().to_uppercase()),
            outcome,
            self.value(&probe.url)
        )
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_report(&self, report: &ReachabilityReport) -> String {
        let mut output = Vec::new();

        output.push(self.header(&format!("Reachability: {}", report.domain)));

        let dns = match report.ip {
            Some(ip) => format!("{} resolves to {}", self.success("✓"), self.value(&ip.to_string())),
            None => format!("{} {}", self.error("✗"), self.error("does not resolve")),
        };
        output.push(format!("  {}: {}", self.label("DNS"), dns));

        for scheme in [Scheme::Http, Scheme::Https] {
            output.push(self.probe_line(report, scheme));
        }

        output.join("\n")
    }

    fn format_bulk(&self, results: &[BulkResult]) -> String {
        let mut output = Vec::new();

        for result in results {
            match (&result.report, &result.error) {
                (Some(report), _) => output.push(self.format_report(report)),
                (None, error) => {
                    output.push(self.header(&format!("Reachability: {}", result.input)));
                    output.push(format!(
                        "  {}: {}",
                        self.label("Error"),
                        self.error(error.as_deref().unwrap_or("unknown error"))
                    ));
                }
            }
        }

        let reachable = results
            .iter()
            .filter(|r| r.report.as_ref().is_some_and(|report| report.is_reachable()))
            .count();
        output.push(format!(
            "\n{}: {}/{} reachable",
            self.label("Summary"),
            reachable,
            results.len()
        ));

        output.join("\n")
    }
}
