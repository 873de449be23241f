use std::error::Error as StdError;
use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::{debug, instrument};

use super::types::{ProbeFailure, ProbeResult, ReachabilityReport, Scheme};
use crate::dns::{HostResolver, Resolution};
use crate::error::Result;
use crate::validation::NormalizedDomain;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const DEFAULT_MAX_REDIRECTS: usize = 10;
const DEFAULT_USER_AGENT: &str = concat!("reach/", env!("CARGO_PKG_VERSION"));

/// Checks DNS resolution plus HTTP and HTTPS reachability of a domain
///
/// Every check runs exactly once per call. Network failures never escape:
/// they are recorded in the returned [`ReachabilityReport`].
#[derive(Debug, Clone)]
pub struct ReachabilityProber {
    timeout: Duration,
    connect_timeout: Duration,
    max_redirects: usize,
    user_agent: String,
    http_port: u16,
    https_port: u16,
    use_system_proxy: bool,
    resolver: HostResolver,
}

impl Default for ReachabilityProber {
    fn default() -> Self {
        Self::new()
    }
}

impl ReachabilityProber {
    /// Create a new ReachabilityProber with default settings
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_port: Scheme::Http.default_port(),
            https_port: Scheme::Https.default_port(),
            use_system_proxy: true,
            resolver: HostResolver::new(),
        }
    }

    /// Set the overall timeout of each HTTP probe, measured from request start
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the TCP connect timeout of each HTTP probe
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set how many redirect hops are followed before giving up
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Probe non-standard ports. Default ports are left out of the URL.
    pub fn with_ports(mut self, http_port: u16, https_port: u16) -> Self {
        self.http_port = http_port;
        self.https_port = https_port;
        self
    }

    /// Choose the resolver used for the DNS check
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolver = self.resolver.with_resolution(resolution);
        self
    }

    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` from the environment
    pub fn without_system_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Normalize `raw` and check it. Only validation errors are returned.
    pub async fn check_raw(&self, raw: &str) -> Result<ReachabilityReport> {
        let domain = NormalizedDomain::parse(Some(raw))?;
        Ok(self.check(&domain).await)
    }

    /// Check the reachability of a domain
    #[instrument(skip_all, fields(domain = %domain))]
    pub async fn check(&self, domain: &NormalizedDomain) -> ReachabilityReport {
        debug!("Checking reachability");

        // One client per invocation, shared by both probes only
        let client = self.build_client();

        let (dns, http, https) = tokio::join!(
            self.resolver.resolve(domain.as_str()),
            self.fetch(client.as_ref(), domain, Scheme::Http),
            self.fetch(client.as_ref(), domain, Scheme::Https)
        );

        ReachabilityReport::new(domain, dns, http, https)
    }

    /// The URL probed for `scheme`
    pub fn target_url(&self, domain: &NormalizedDomain, scheme: Scheme) -> String {
        let port = match scheme {
            Scheme::Http => self.http_port,
            Scheme::Https => self.https_port,
        };

        if port == scheme.default_port() {
            format!("{}://{}/", scheme, domain)
        } else {
            format!("{}://{}:{}/", scheme, domain, port)
        }
    }

    fn build_client(&self) -> std::result::Result<reqwest::Client, ProbeFailure> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::limited(self.max_redirects))
            .user_agent(self.user_agent.as_str());

        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }

        builder
            .build()
            .map_err(|e| ProbeFailure::Client(root_cause(&e)))
    }

    /// Issue one GET, bounded by the probe timeout
    async fn fetch(
        &self,
        client: std::result::Result<&reqwest::Client, &ProbeFailure>,
        domain: &NormalizedDomain,
        scheme: Scheme,
    ) -> ProbeResult {
        let url = self.target_url(domain, scheme);

        let client = match client {
            Ok(client) => client,
            Err(failure) => return ProbeResult::failed(url, failure),
        };

        // Expiry drops the request future, which aborts the in-flight request
        let outcome = tokio::time::timeout(self.timeout, client.get(&url).send()).await;

        match outcome {
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                debug!(%scheme, status, "Probe received response");
                ProbeResult::received(url, status)
            }
            Ok(Err(e)) => {
                let failure = self.classify_error(&e);
                debug!(%scheme, error = %failure, "Probe failed");
                ProbeResult::failed(url, &failure)
            }
            Err(_) => {
                let failure = ProbeFailure::Timeout(self.timeout.as_millis() as u64);
                debug!(%scheme, error = %failure, "Probe timed out");
                ProbeResult::failed(url, &failure)
            }
        }
    }

    /// The client has no overall timeout of its own, so a reqwest timeout
    /// can only come from the connect phase, which includes the TLS handshake.
    fn classify_error(&self, error: &reqwest::Error) -> ProbeFailure {
        let cause = root_cause(error);

        if error.is_builder() {
            ProbeFailure::InvalidUrl(cause)
        } else if error.is_redirect() {
            ProbeFailure::Redirect(cause)
        } else if error.is_timeout() {
            ProbeFailure::ConnectTimeout(self.connect_timeout.as_millis() as u64)
        } else if error.is_connect() {
            ProbeFailure::Connect(cause)
        } else {
            ProbeFailure::Request(cause)
        }
    }
}

/// Innermost message of an error chain, e.g. "Connection refused (os error 111)"
fn root_cause(error: &(dyn StdError + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(raw: &str) -> NormalizedDomain {
        NormalizedDomain::parse(Some(raw)).unwrap()
    }

    #[test]
    fn test_target_url_default_ports() {
        let prober = ReachabilityProber::new();
        assert_eq!(
            prober.target_url(&domain("example.com"), Scheme::Http),
            "http://example.com/"
        );
        assert_eq!(
            prober.target_url(&domain("example.com"), Scheme::Https),
            "https://example.com/"
        );
    }

    #[test]
    fn test_target_url_custom_ports() {
        let prober = ReachabilityProber::new().with_ports(8080, 8443);
        assert_eq!(
            prober.target_url(&domain("127.0.0.1"), Scheme::Http),
            "http://127.0.0.1:8080/"
        );
        assert_eq!(
            prober.target_url(&domain("127.0.0.1"), Scheme::Https),
            "https://127.0.0.1:8443/"
        );
    }

    #[test]
    fn test_defaults() {
        let prober = ReachabilityProber::default();
        assert_eq!(prober.timeout(), Duration::from_secs(5));
        assert_eq!(prober.max_redirects, 10);
        assert!(prober.user_agent.starts_with("reach/"));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct SendError(#[source] std::io::Error);

    #[test]
    fn test_root_cause_walks_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(root_cause(&SendError(inner)), "refused");
    }

    #[tokio::test]
    async fn test_check_raw_rejects_blank_input() {
        let prober = ReachabilityProber::new();
        let err = prober.check_raw("   ").await.unwrap_err();
        assert!(err.is_client_error());
    }
}
