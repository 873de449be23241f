//! Domain reachability probing
//!
//! Combines one DNS lookup with concurrent HTTP and HTTPS GET probes:
//! - DNS resolution (system resolver or a chosen nameserver)
//! - HTTP and HTTPS status, following redirects, each with its own timeout

mod client;
mod types;

pub use client::ReachabilityProber;
pub use types::{is_ok_status, ProbeFailure, ProbeResult, ReachabilityReport, Scheme};

use crate::error::Result;

/// Normalize `raw` and probe it with default settings.
pub async fn check_domain(raw: &str) -> Result<ReachabilityReport> {
    ReachabilityProber::new().check_raw(raw).await
}
