//! Target registry port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::id::TargetId;
use crate::domain::target::RebalanceTarget;
use crate::error::RegistryError;

/// Source of truth for which targets the keeper tracks.
///
/// On-chain state stays authoritative: the registry only says what to look
/// at, the chain says whether to act.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait TargetRegistry: Send + Sync {
    /// Every tracked target, including ones whose enabled flag is off, so
    /// each of them receives an outcome in the pass.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] if the backing store cannot be
    /// reached. The scheduler aborts the pass in that case.
    async fn list_eligible_targets(&self) -> Result<Vec<RebalanceTarget>, RegistryError>;

    /// Best-effort bookkeeping after a confirmed rebalance.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp could not be stored. Callers log
    /// and continue.
    async fn mark_rebalanced(
        &self,
        target_id: &TargetId,
        at: DateTime<Utc>,
    ) -> Result<(), RegistryError>;
}
