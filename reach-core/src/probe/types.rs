use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dns::DnsOutcome;
use crate::validation::NormalizedDomain;

/// URL scheme probed by a single HTTP check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an HTTP probe did not receive a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("connection timed out after {0} ms")]
    ConnectTimeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("redirect failed: {0}")]
    Redirect(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client unavailable: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Request(String),
}

/// Result of one HTTP GET probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// True iff a response arrived with a status in [200, 400)
    pub ok: bool,
    /// Final status code after redirects, absent when no response arrived
    pub status_code: Option<u16>,
    /// The URL that was probed
    pub url: String,
    /// Transport failure message, absent when a response arrived
    pub error: Option<String>,
}

impl ProbeResult {
    /// A probe that received a response. 4xx and 5xx are received, not failed.
    pub fn received(url: String, status_code: u16) -> Self {
        Self {
            ok: is_ok_status(status_code),
            status_code: Some(status_code),
            url,
            error: None,
        }
    }

    /// A probe that never received a response.
    pub fn failed(url: String, failure: &ProbeFailure) -> Self {
        Self {
            ok: false,
            status_code: None,
            url,
            error: Some(failure.to_string()),
        }
    }
}

/// Statuses in [200, 400) count as reachable.
pub fn is_ok_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

/// Complete reachability report for a domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityReport {
    /// The normalized domain that was checked
    pub domain: String,
    /// Whether the DNS lookup returned an address
    pub dns_resolves: bool,
    /// Resolved address, present iff `dns_resolves`
    pub ip: Option<IpAddr>,
    pub http: ProbeResult,
    pub https: ProbeResult,
}

impl ReachabilityReport {
    pub fn new(
        domain: &NormalizedDomain,
        dns: DnsOutcome,
        http: ProbeResult,
        https: ProbeResult,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            dns_resolves: dns.resolves(),
            ip: dns.ip(),
            http,
            https,
        }
    }

    /// Whether either scheme answered with a non-error status.
    pub fn is_reachable(&self) -> bool {
        self.http.ok || self.https.ok
    }

    pub fn probe(&self, scheme: Scheme) -> &ProbeResult {
        match scheme {
            Scheme::Http => &self.http,
            Scheme::Https => &self.https,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn domain() -> NormalizedDomain {
        NormalizedDomain::parse(Some("example.com")).unwrap()
    }

    #[test]
    fn test_ok_status_range() {
        assert!(!is_ok_status(199));
        assert!(is_ok_status(200));
        assert!(is_ok_status(301));
        assert!(is_ok_status(399));
        assert!(!is_ok_status(400));
        assert!(!is_ok_status(503));
    }

    #[test]
    fn test_received_error_status_is_not_a_failure() {
        let result = ProbeResult::received("http://example.com/".to_string(), 404);
        assert!(!result.ok);
        assert_eq!(result.status_code, Some(404));
        assert_eq!(result.error, None);
    }

    #[test]
    fn test_failed_probe_has_message_and_no_status() {
        let result = ProbeResult::failed(
            "https://example.com/".to_string(),
            &ProbeFailure::Timeout(5000),
        );
        assert!(!result.ok);
        assert_eq!(result.status_code, None);
        assert_eq!(result.error.as_deref(), Some("request timed out after 5000 ms"));
    }

    #[test]
    fn test_connect_timeout_message_names_the_phase() {
        let result = ProbeResult::failed(
            "https://example.com/".to_string(),
            &ProbeFailure::ConnectTimeout(3000),
        );
        assert_eq!(
            result.error.as_deref(),
            Some("connection timed out after 3000 ms")
        );
    }

    #[test]
    fn test_report_ip_follows_dns_outcome() {
        let http = ProbeResult::received("http://example.com/".to_string(), 200);
        let https = ProbeResult::received("https://example.com/".to_string(), 200);

        let resolved = ReachabilityReport::new(
            &domain(),
            DnsOutcome::Resolved {
                ip: IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            },
            http.clone(),
            https.clone(),
        );
        assert!(resolved.dns_resolves);
        assert!(resolved.ip.is_some());

        let unresolved = ReachabilityReport::new(
            &domain(),
            DnsOutcome::Unresolved {
                reason: "no such host".to_string(),
            },
            http,
            https,
        );
        assert!(!unresolved.dns_resolves);
        assert!(unresolved.ip.is_none());
        assert!(unresolved.is_reachable());
    }

    #[test]
    fn test_probe_by_scheme() {
        let report = ReachabilityReport::new(
            &domain(),
            DnsOutcome::Unresolved {
                reason: "nxdomain".to_string(),
            },
            ProbeResult::received("http://example.com/".to_string(), 200),
            ProbeResult::received("https://example.com/".to_string(), 404),
        );

        assert_eq!(report.probe(Scheme::Http).status_code, Some(200));
        assert_eq!(report.probe(Scheme::Https).status_code, Some(404));
    }

    #[test]
    fn test_report_json_shape() {
        let report = ReachabilityReport::new(
            &domain(),
            DnsOutcome::Resolved {
                ip: IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
            },
            ProbeResult::received("http://example.com/".to_string(), 200),
            ProbeResult::failed(
                "https://example.com/".to_string(),
                &ProbeFailure::Connect("Connection refused".to_string()),
            ),
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "domain": "example.com",
                "dns_resolves": true,
                "ip": "93.184.216.34",
                "http": { "ok": true, "status_code": 200, "url": "http://example.com/", "error": null },
                "https": {
                    "ok": false,
                    "status_code": null,
                    "url": "https://example.com/",
                    "error": "connection failed: Connection refused"
                }
            })
        );
    }

    #[test]
    fn test_unresolved_report_serializes_null_ip() {
        let report = ReachabilityReport::new(
            &domain(),
            DnsOutcome::Unresolved {
                reason: "nxdomain".to_string(),
            },
            ProbeResult::failed("http://example.com/".to_string(), &ProbeFailure::Timeout(5)),
            ProbeResult::failed("https://example.com/".to_string(), &ProbeFailure::Timeout(5)),
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["dns_resolves"], false);
        assert!(json["ip"].is_null());
        assert!(json["http"]["status_code"].is_null());
    }
}
