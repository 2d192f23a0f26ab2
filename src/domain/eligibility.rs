//! Eligibility filter.
//!
//! Pure decision over an [`EligibilitySnapshot`]: no I/O, no clock reads, no
//! yield data. Where the funds go is chosen on-chain by the protocol
//! selector; the keeper only decides whether to trigger the call.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::{ChainState, EligibilitySnapshot};

/// Why a target was not submitted in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Registry flag or on-chain delegation is switched off.
    Disabled,
    /// Market resolved, deactivated or past its end time.
    Inactive,
    /// Nothing deposited, nothing to move.
    ZeroBalance,
    /// Another pass already has a transaction in flight for the target.
    InFlight,
}

impl SkipReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Inactive => "inactive",
            Self::ZeroBalance => "zero-balance",
            Self::InFlight => "in-flight",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the eligibility filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Skip(SkipReason),
}

impl Eligibility {
    #[must_use]
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Decide whether a target should be rebalanced at `now`.
///
/// Rules are applied in order: disabled, inactive market, zero balance.
#[must_use]
pub fn evaluate(snapshot: &EligibilitySnapshot, now: DateTime<Utc>) -> Eligibility {
    if !snapshot.enabled() {
        return Eligibility::Skip(SkipReason::Disabled);
    }

    if let ChainState::Market(status) = &snapshot.state {
        if status.is_closed_at(now) {
            return Eligibility::Skip(SkipReason::Inactive);
        }
    }

    if snapshot.balance().is_zero() {
        return Eligibility::Skip(SkipReason::ZeroBalance);
    }

    Eligibility::Eligible
}
