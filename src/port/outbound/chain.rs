//! Chain reader and writer ports.

use async_trait::async_trait;

use crate::domain::id::TargetId;
use crate::domain::outcome::TransactionResult;
use crate::domain::snapshot::{DelegationConfig, MarketStatus};
use crate::domain::target::RebalanceTarget;
use crate::error::ChainError;

/// Read-only queries against the delegation and market contracts.
///
/// Implementations apply the retry policy themselves; an `Err` returned here
/// is final for the current pass.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Delegation settings for a user target.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ChainError`] when the read fails.
    async fn get_delegation_config(&self, target_id: &TargetId)
        -> Result<DelegationConfig, ChainError>;

    /// Lifecycle and vault state for a market target.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ChainError`] when the read fails.
    async fn get_market_status(&self, market_id: &TargetId) -> Result<MarketStatus, ChainError>;
}

/// Submits operator-authorized rebalance transactions.
///
/// The writer is the sole owner of the operator key. Implementations must
/// serialize nonce allocation internally so concurrent calls never collide.
#[async_trait]
pub trait ChainWriter: Send + Sync {
    /// Trigger a rebalance for one target and wait for confirmation.
    ///
    /// Reverts and confirmation timeouts are reported through
    /// [`TransactionResult`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns a [`ChainError`] if nothing could be broadcast (transient
    /// retries exhausted, node error, malformed target).
    async fn rebalance(&self, target: &RebalanceTarget) -> Result<TransactionResult, ChainError>;
}
