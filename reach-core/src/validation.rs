//! Domain input normalization

use std::fmt;

use serde::Serialize;

use crate::error::{ReachError, Result};

/// Normalize raw user input into a bare hostname
///
/// This function:
/// - Trims surrounding whitespace
/// - Converts to lowercase
/// - Removes http:// and https:// prefixes
/// - Removes paths (everything from the first `/`)
///
/// Returns an empty string when nothing is left; callers must treat that as
/// a validation failure. Use [`NormalizedDomain::parse`] to get that check
/// for free.
pub fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();

    // Remove protocol
    let domain = domain
        .strip_prefix("http://")
        .or_else(|| domain.strip_prefix("https://"))
        .unwrap_or(&domain);

    // Remove trailing slash and path
    let domain = domain.split('/').next().unwrap_or(domain);

    domain.trim().to_string()
}

/// A non-empty, normalized hostname ready for DNS and HTTP use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedDomain(String);

impl NormalizedDomain {
    /// Normalize `raw` and reject empty results.
    ///
    /// `None` stands for a missing field in the request envelope and is
    /// rejected the same way as empty input.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let normalized = raw.map(normalize_domain).unwrap_or_default();
        if normalized.is_empty() {
            return Err(ReachError::EmptyDomain);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::str::FromStr for NormalizedDomain {
    type Err = ReachError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Some(s))
    }
}

impl AsRef<str> for NormalizedDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("example.com"), "example.com");
        assert_eq!(normalize_domain("EXAMPLE.COM"), "example.com");
        assert_eq!(normalize_domain("HTTP://Example.COM/path?x=1"), "example.com");
        assert_eq!(normalize_domain("HTTPS://Foo.COM/bar"), "foo.com");
        assert_eq!(normalize_domain("http://example.com/"), "example.com");
        assert_eq!(normalize_domain("  example.com  "), "example.com");
        assert_eq!(normalize_domain("\thttps://www.Example.com\n"), "www.example.com");
        assert_eq!(normalize_domain("example.com:8080/status"), "example.com:8080");
    }

    #[test]
    fn test_normalize_domain_empty_sentinel() {
        assert_eq!(normalize_domain(""), "");
        assert_eq!(normalize_domain("   "), "");
        assert_eq!(normalize_domain("http://"), "");
        assert_eq!(normalize_domain("https:///path"), "");
    }

    #[test]
    fn test_normalize_domain_only_strips_leading_scheme() {
        assert_eq!(normalize_domain("ftp://example.com"), "ftp:");
        assert_eq!(normalize_domain("example.com/http://x"), "example.com");
    }

    #[test]
    fn test_parse_rejects_missing_and_blank() {
        assert!(matches!(NormalizedDomain::parse(None), Err(ReachError::EmptyDomain)));
        assert!(matches!(NormalizedDomain::parse(Some("")), Err(ReachError::EmptyDomain)));
        assert!(matches!(NormalizedDomain::parse(Some("  \t ")), Err(ReachError::EmptyDomain)));
    }

    #[test]
    fn test_parse_accepts_and_normalizes() {
        let domain = NormalizedDomain::parse(Some(" HTTPS://Foo.COM/bar ")).unwrap();
        assert_eq!(domain.as_str(), "foo.com");
        assert_eq!(domain.to_string(), "foo.com");

        let parsed: NormalizedDomain = "Example.org".parse().unwrap();
        assert_eq!(parsed.into_inner(), "example.org");
    }
}
