//! Domain identifier types with validation
//!
//! Cluster identifiers name checkpoint files on disk, so they are validated
//! once at construction and carried as a newtype from then on.

use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Cluster identifier newtype wrapper
///
/// Clustering tools emit integer labels (`0`, `1`, ...) but the identifier is
/// kept as a string so labels like `"12a"` round-trip untouched. Integer JSON
/// values are accepted on deserialization and stringified.
///
/// # Examples
///
/// ```
/// use phenoscribe::domain::ids::ClusterId;
/// use std::str::FromStr;
///
/// let cluster_id = ClusterId::from_str("42").unwrap();
/// assert_eq!(cluster_id.as_str(), "42");
/// assert_eq!(cluster_id.numeric(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClusterId(String);

impl ClusterId {
    /// Creates a new ClusterId from a string
    ///
    /// Surrounding whitespace is trimmed. Empty identifiers and identifiers
    /// containing path separators are rejected.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Cluster ID cannot be empty".to_string());
        }
        if trimmed.contains('/') || trimmed.contains('\\') || trimmed == ".." || trimmed == "." {
            return Err(format!(
                "Cluster ID '{trimmed}' cannot contain path separators"
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the cluster ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Integer value of the identifier, if it is one
    pub fn numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    /// Ordering used for reports: numeric ids ascending, then the rest lexically
    pub fn report_cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClusterId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ClusterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ClusterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
        }

        let raw = match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Integer(n) => n.to_string(),
        };
        ClusterId::new(raw).map_err(serde::de::Error::custom)
    }
}
