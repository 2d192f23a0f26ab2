//! Rebalance targets: the things the operator may rebalance.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::TargetId;

/// What kind of pooled funds a target represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetKind {
    /// A user who delegated auto-rebalancing to the operator.
    UserDelegation,
    /// A prediction market whose vault holds pooled funds.
    MarketVault,
}

impl TargetKind {
    /// Short name used in config files, the database and the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserDelegation => "user",
            Self::MarketVault => "market",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "user-delegation" | "delegation" => Ok(Self::UserDelegation),
            "market" | "market-vault" => Ok(Self::MarketVault),
            other => Err(DomainError::UnknownTargetKind {
                value: other.to_string(),
            }),
        }
    }
}

/// A user delegation or market vault tracked by the registry.
///
/// Owned by the registry; the scheduler only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceTarget {
    pub id: TargetId,
    pub kind: TargetKind,
    pub last_rebalanced_at: Option<DateTime<Utc>>,
    pub enabled: bool,
}

impl RebalanceTarget {
    /// Create an enabled target that has never been rebalanced.
    pub fn new(id: impl Into<TargetId>, kind: TargetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            last_rebalanced_at: None,
            enabled: true,
        }
    }

    /// Create a validated target from untrusted input.
    ///
    /// User targets need a `0x`-prefixed 20-byte hex address, market targets
    /// a decimal integer id.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] describing the first violated rule.
    pub fn try_new(id: &str, kind: TargetKind) -> Result<Self, DomainError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DomainError::EmptyTargetId);
        }
        match kind {
            TargetKind::UserDelegation => {
                let hex = id
                    .strip_prefix("0x")
                    .or_else(|| id.strip_prefix("0X"))
                    .unwrap_or("");
                if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(DomainError::InvalidAddress {
                        value: id.to_string(),
                    });
                }
            }
            TargetKind::MarketVault => {
                if !id.chars().all(|c| c.is_ascii_digit()) {
                    return Err(DomainError::InvalidMarketId {
                        value: id.to_string(),
                    });
                }
            }
        }
        Ok(Self::new(id, kind))
    }

    /// Builder-style setter for the enabled flag.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
