//! Request/response envelopes for transport adapters.
//!
//! An adapter extracts a [`CheckRequest`], hands it to
//! [`ReachabilityProber::handle`], and serializes either the report or an
//! [`ErrorResponse`].

use serde::{Deserialize, Serialize};

use crate::error::{ReachError, Result};
use crate::probe::{ReachabilityProber, ReachabilityReport};
use crate::validation::NormalizedDomain;

/// Body of a check request: `{"domain": "example.com"}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub domain: Option<String>,
}

impl CheckRequest {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
        }
    }

    /// Parses a JSON body. A blank body is treated as `{}`.
    pub fn from_json(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(body).map_err(|e| ReachError::InvalidRequest(e.to_string()))
    }

    /// The normalized domain, or a validation error when it is missing or blank.
    pub fn domain(&self) -> Result<NormalizedDomain> {
        NormalizedDomain::parse(self.domain.as_deref())
    }
}

/// Body returned for rejected requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ReachError> for ErrorResponse {
    fn from(err: &ReachError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl ReachabilityProber {
    /// Validate the request, then probe. No network activity happens when
    /// validation fails.
    pub async fn handle(&self, request: &CheckRequest) -> Result<ReachabilityReport> {
        let domain = request.domain()?;
        Ok(self.check(&domain).await)
    }
}
