pub mod bulk;
pub mod colors;
pub mod dns;
pub mod error;
pub mod output;
pub mod probe;
pub mod request;
pub mod validation;

pub use error::{ReachError, Result};
pub use validation::{normalize_domain, NormalizedDomain};

pub use dns::{DnsOutcome, HostResolver, Resolution};
pub use probe::{check_domain, ProbeFailure, ProbeResult, ReachabilityProber, ReachabilityReport, Scheme};
pub use request::{CheckRequest, ErrorResponse};

pub use bulk::{BulkExecutor, BulkResult};
pub use output::{OutputFormat, OutputFormatter};
