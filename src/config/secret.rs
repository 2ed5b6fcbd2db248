//! Secure handling of the analyzer API key
//!
//! The key is wrapped in `secrecy::Secret`, which zeroes memory on drop and
//! redacts the value from `Debug` output, so a config dump or a panic message
//! never leaks it.
//!
//! # Example
//!
//! ```rust
//! use phenoscribe::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let api_key = secret_string("sk-test".to_string());
//! assert_eq!(api_key.expose_secret().as_ref(), "sk-test");
//! assert!(!format!("{api_key:?}").contains("sk-test"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the required traits for Secret
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Type alias for a secret string
pub type SecretString = Secret<SecretValue>;

/// Helper function to create a SecretString from a String
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Helper function to create an optional SecretString from an optional String
///
/// Empty strings map to `None` so an unset `${VAR}` placeholder that expanded
/// to nothing does not count as a configured key.
#[inline]
pub fn secret_string_opt(value: Option<String>) -> Option<SecretString> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| Secret::new(SecretValue::from(s)))
}
