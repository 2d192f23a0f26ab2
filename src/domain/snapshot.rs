//! Point-in-time reads of a target's on-chain state.
//!
//! Snapshots are built fresh for every pass and dropped at the end of it.
//! Nothing here is cached.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::TargetId;
use super::target::{RebalanceTarget, TargetKind};

/// Risk profile a user picked when enabling delegation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Low,
    Medium,
    High,
    /// Profile code the keeper does not know about.
    Other(u8),
}

impl From<u8> for RiskProfile {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("low"),
            Self::Medium => f.write_str("medium"),
            Self::High => f.write_str("high"),
            Self::Other(code) => write!(f, "other({code})"),
        }
    }
}

/// Delegation settings stored on-chain for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationConfig {
    /// Whether the user has auto-rebalancing switched on.
    pub enabled: bool,
    pub risk_profile: RiskProfile,
    /// Deposited amount in USDC.
    pub deposited_amount: Decimal,
}

/// Lifecycle and vault state of one prediction market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStatus {
    pub active: bool,
    pub resolved: bool,
    pub end_time: DateTime<Utc>,
    /// Vault balance in USDC.
    pub vault_balance: Decimal,
}

impl MarketStatus {
    /// True if the market can no longer be rebalanced at `now`.
    #[must_use]
    pub fn is_closed_at(&self, now: DateTime<Utc>) -> bool {
        self.resolved || !self.active || self.end_time <= now
    }
}

/// Chain state read for a target, by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainState {
    Delegation(DelegationConfig),
    Market(MarketStatus),
}

/// Everything the eligibility filter needs to decide about one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilitySnapshot {
    pub target_id: TargetId,
    /// Registry-side enabled flag at pass start.
    pub target_enabled: bool,
    pub state: ChainState,
    pub observed_at: DateTime<Utc>,
}

impl EligibilitySnapshot {
    /// Combine a registry target with a fresh chain read.
    #[must_use]
    pub fn new(target: &RebalanceTarget, state: ChainState, observed_at: DateTime<Utc>) -> Self {
        Self {
            target_id: target.id.clone(),
            target_enabled: target.enabled,
            state,
            observed_at,
        }
    }

    /// Kind implied by the chain state.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        match self.state {
            ChainState::Delegation(_) => TargetKind::UserDelegation,
            ChainState::Market(_) => TargetKind::MarketVault,
        }
    }

    /// Enabled on both the registry side and, for users, on-chain.
    #[must_use]
    pub fn enabled(&self) -> bool {
        match &self.state {
            ChainState::Delegation(config) => self.target_enabled && config.enabled,
            ChainState::Market(_) => self.target_enabled,
        }
    }

    /// Funds that a rebalance would move.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        match &self.state {
            ChainState::Delegation(config) => config.deposited_amount,
            ChainState::Market(status) => status.vault_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn risk_profile_from_code() {
        assert_eq!(RiskProfile::from(1), RiskProfile::Low);
        assert_eq!(RiskProfile::from(3), RiskProfile::High);
        assert_eq!(RiskProfile::from(9).to_string(), "other(9)");
    }

    #[test]
    fn user_snapshot_requires_both_flags() {
        let target = RebalanceTarget::new("0xaa", TargetKind::UserDelegation);
        let snapshot = EligibilitySnapshot::new(
            &target,
            ChainState::Delegation(DelegationConfig {
                enabled: false,
                risk_profile: RiskProfile::Low,
                deposited_amount: dec!(10),
            }),
            Utc::now(),
        );
        assert!(!snapshot.enabled());
        assert_eq!(snapshot.balance(), dec!(10));
    }

    #[test]
    fn market_closed_when_end_time_passed() {
        let now = Utc::now();
        let status = MarketStatus {
            active: true,
            resolved: false,
            end_time: now - Duration::seconds(1),
            vault_balance: dec!(5),
        };
        assert!(status.is_closed_at(now));
        assert!(!MarketStatus {
            end_time: now + Duration::hours(1),
            ..status
        }
        .is_closed_at(now));
    }
}
