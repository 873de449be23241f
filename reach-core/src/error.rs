use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReachError {
    #[error("missing domain")]
    EmptyDomain,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid nameserver IP: {0}")]
    InvalidNameserver(String),

    #[error("DNS resolution failed: {0}")]
    DnsError(String),
}

impl ReachError {
    /// Whether the error was caused by caller input rather than by the
    /// environment. Adapters map these to a 400-class response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReachError::EmptyDomain
                | ReachError::InvalidRequest(_)
                | ReachError::InvalidNameserver(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ReachError>;
