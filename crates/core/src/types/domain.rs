//! Hostname normalization and the effective tenant domain.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Host prefixes that address the same site as the bare domain.
const WWW_PREFIXES: &[&str] = &["www.", "www2.", "www3."];

/// Hostname that never maps to a tenant.
const LOCALHOST: &str = "localhost";

/// Canonicalize a raw `Host` value into a lookup key.
///
/// Lower-cases the input, drops everything from the first `:` onwards and
/// removes one leading `www.`, `www2.` or `www3.` label. Total over all
/// inputs: an empty string maps to an empty string.
///
/// ```
/// use folio_core::normalize_host;
///
/// assert_eq!(normalize_host("WWW.Example.com:8080"), "example.com");
/// assert_eq!(normalize_host("localhost:3000"), "localhost");
/// assert_eq!(normalize_host(""), "");
/// ```
#[must_use]
pub fn normalize_host(host: &str) -> String {
    let lower = host.to_lowercase();
    let without_port = lower.split(':').next().unwrap_or_default();

    WWW_PREFIXES
        .iter()
        .find_map(|prefix| without_port.strip_prefix(prefix))
        .unwrap_or(without_port)
        .to_owned()
}

/// A normalized domain that can be used to look up a tenant.
///
/// Only constructed through [`Domain::from_host`], so it is never empty and
/// never `localhost`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Resolve the effective domain for a request host.
    ///
    /// Returns `None` when the normalized host is empty or `localhost`,
    /// which callers treat as "serve the fallback or an unclaimed state"
    /// rather than performing a lookup.
    ///
    /// ```
    /// use folio_core::Domain;
    ///
    /// assert!(Domain::from_host("localhost").is_none());
    /// assert_eq!(Domain::from_host("my-site.dev").unwrap().as_str(), "my-site.dev");
    /// ```
    #[must_use]
    pub fn from_host(host: &str) -> Option<Self> {
        let normalized = normalize_host(host);
        if normalized.is_empty() || normalized == LOCALHOST {
            return None;
        }
        Some(Self(normalized))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Error returned when a string has no effective domain.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' does not name a claimable domain")]
pub struct NoEffectiveDomain(pub String);

impl TryFrom<String> for Domain {
    type Error = NoEffectiveDomain;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_host(&value).ok_or(NoEffectiveDomain(value))
    }
}

impl core::str::FromStr for Domain {
    type Err = NoEffectiveDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_host(s).ok_or_else(|| NoEffectiveDomain(s.to_owned()))
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
