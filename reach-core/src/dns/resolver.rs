use std::net::{IpAddr, SocketAddr};

use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ReachError, Result};

/// Where host lookups are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    /// The operating system resolver (`getaddrinfo`), with whatever timeout
    /// behavior the platform applies.
    #[default]
    System,
    /// A single nameserver queried over UDP port 53.
    Nameserver(IpAddr),
}

impl Resolution {
    /// Parses a nameserver argument such as `8.8.8.8` or `@1.1.1.1`.
    pub fn nameserver(ns: &str) -> Result<Self> {
        let ns = ns.trim().trim_start_matches('@');
        ns.parse::<IpAddr>()
            .map(Resolution::Nameserver)
            .map_err(|_| ReachError::InvalidNameserver(ns.to_string()))
    }
}

/// Outcome of a single host lookup. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DnsOutcome {
    Resolved { ip: IpAddr },
    Unresolved { reason: String },
}

impl DnsOutcome {
    pub fn resolves(&self) -> bool {
        matches!(self, DnsOutcome::Resolved { .. })
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            DnsOutcome::Resolved { ip } => Some(*ip),
            DnsOutcome::Unresolved { .. } => None,
        }
    }
}

/// Resolves a domain to one address, swallowing every failure into a
/// [`DnsOutcome`].
#[derive(Debug, Clone, Default)]
pub struct HostResolver {
    resolution: Resolution,
}

impl HostResolver {
    /// Creates a resolver backed by the system resolver.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Resolves `domain` exactly once.
    ///
    /// A `host:port` input is looked up by its host part. When several
    /// addresses come back the first IPv4 address wins, falling back to the
    /// first address of any family.
    #[instrument(skip(self), fields(domain = %domain))]
    pub async fn resolve(&self, domain: &str) -> DnsOutcome {
        let host = host_part(domain);

        let lookup = match self.resolution {
            Resolution::System => self.lookup_system(host).await,
            Resolution::Nameserver(ns) => self.lookup_nameserver(host, ns).await,
        };

        let outcome = match lookup {
            Ok(addrs) => match pick_address(&addrs) {
                Some(ip) => DnsOutcome::Resolved { ip },
                None => DnsOutcome::Unresolved {
                    reason: "no addresses returned".to_string(),
                },
            },
            Err(e) => DnsOutcome::Unresolved {
                reason: e.to_string(),
            },
        };

        debug!(?outcome, "DNS lookup finished");
        outcome
    }

    async fn lookup_system(&self, host: &str) -> Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ReachError::DnsError(format!("lookup failed: {}", e)))?;

        Ok(addrs.map(|addr| addr.ip()).collect())
    }

    async fn lookup_nameserver(&self, host: &str, nameserver: IpAddr) -> Result<Vec<IpAddr>> {
        let ns_config = NameServerConfig::new(SocketAddr::new(nameserver, 53), Protocol::Udp);

        let mut config = ResolverConfig::new();
        config.add_name_server(ns_config);

        let resolver = TokioAsyncResolver::tokio(config, ResolverOpts::default());

        debug!(nameserver = %nameserver, "Resolving via nameserver");

        let response = resolver
            .lookup_ip(host)
            .await
            .map_err(|e| ReachError::DnsError(format!("lookup via {} failed: {}", nameserver, e)))?;

        Ok(response.iter().collect())
    }
}

fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
}

/// Strips a trailing `:port` so that `example.com:8080` is looked up as
/// `example.com`. Bracketed IPv6 literals keep their inner address.
fn host_part(domain: &str) -> &str {
    if let Some(rest) = domain.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }

    match domain.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            host
        }
        _ => domain,
    }
}
