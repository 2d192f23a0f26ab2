//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rebalance target identifier - newtype for type safety.
///
/// Holds either a user wallet address (`0x…`) or a market id, depending on
/// the target kind. Addresses are stored lowercased and numeric market ids
/// without leading zeros, so one on-chain target maps to exactly one id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(String);

impl TargetId {
    /// Create a new `TargetId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let id = id.trim();
        if id.starts_with("0x") || id.starts_with("0X") {
            return Self(id.to_ascii_lowercase());
        }
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            let digits = id.trim_start_matches('0');
            return Self(if digits.is_empty() { "0" } else { digits }.to_string());
        }
        Self(id.to_string())
    }

    /// Get the target ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TargetId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for one scheduler pass.
///
/// Generated as UUID v4 for new passes, or constructed from an existing
/// string when read back from the history store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassId(String);

impl PassId {
    /// Create a new `PassId` with a generated UUID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the pass ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PassId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PassId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
