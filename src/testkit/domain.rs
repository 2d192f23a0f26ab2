//! Builders for domain primitives used across tests.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::domain::snapshot::{DelegationConfig, MarketStatus, RiskProfile};
use crate::domain::target::{RebalanceTarget, TargetKind};

/// Deterministic user address `0x000...0{n}`.
pub fn user_address(n: u64) -> String {
    format!("0x{n:040x}")
}

/// Enabled user-delegation target for [`user_address`]`(n)`.
pub fn user_target(n: u64) -> RebalanceTarget {
    RebalanceTarget::new(user_address(n), TargetKind::UserDelegation)
}

/// Enabled market-vault target.
pub fn market_target(id: u64) -> RebalanceTarget {
    RebalanceTarget::new(id.to_string(), TargetKind::MarketVault)
}

/// On-chain delegation with auto-rebalance on.
pub fn delegation(amount: Decimal) -> DelegationConfig {
    DelegationConfig {
        enabled: true,
        risk_profile: RiskProfile::Medium,
        deposited_amount: amount,
    }
}

/// On-chain delegation with auto-rebalance off.
pub fn disabled_delegation(amount: Decimal) -> DelegationConfig {
    DelegationConfig {
        enabled: false,
        ..delegation(amount)
    }
}

/// Active market ending a day from now.
pub fn open_market(balance: Decimal) -> MarketStatus {
    MarketStatus {
        active: true,
        resolved: false,
        end_time: Utc::now() + Duration::days(1),
        vault_balance: balance,
    }
}

pub fn resolved_market(balance: Decimal) -> MarketStatus {
    MarketStatus {
        resolved: true,
        ..open_market(balance)
    }
}

/// Fake 32-byte transaction hash.
pub fn tx_hash(n: u64) -> String {
    format!("0x{n:064x}")
}
