//! Per-target results of a pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::eligibility::SkipReason;
use super::id::TargetId;
use super::target::TargetKind;
use crate::error::ChainError;

/// What happened to a broadcast (or simulated) rebalance transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionResult {
    /// Mined with success status.
    Confirmed { tx_hash: String },
    /// Rejected by the contract, either in simulation (no hash) or on-chain.
    Reverted {
        reason: String,
        tx_hash: Option<String>,
    },
    /// Broadcast, but no receipt within the confirmation timeout. The
    /// transaction may or may not land.
    Timeout { tx_hash: String },
}

/// Which step of target processing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Reading the eligibility snapshot.
    Read,
    /// Submitting the rebalance transaction.
    Write,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// Classification of a terminal failure, for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Retries exhausted against the RPC endpoint.
    TransientNetwork,
    ContractRevert,
    Rpc,
    InvalidTarget,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TransientNetwork => "transient_network",
            Self::ContractRevert => "contract_revert",
            Self::Rpc => "rpc",
            Self::InvalidTarget => "invalid_target",
        };
        f.write_str(label)
    }
}

/// Outcome of one target within one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TargetOutcome {
    Succeeded {
        tx_hash: String,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        stage: FailureStage,
        kind: FailureKind,
        message: String,
    },
    /// Transaction outcome unknown; must not be resubmitted this pass.
    Unknown {
        tx_hash: String,
    },
}

impl TargetOutcome {
    /// Classify a chain error raised at `stage`.
    ///
    /// A confirmation timeout carries a hash and becomes [`TargetOutcome::Unknown`].
    #[must_use]
    pub fn from_error(stage: FailureStage, err: &ChainError) -> Self {
        let kind = match err {
            ChainError::Transient(_) => FailureKind::TransientNetwork,
            ChainError::Revert { .. } => FailureKind::ContractRevert,
            ChainError::Rpc(_) => FailureKind::Rpc,
            ChainError::InvalidTarget { .. } => FailureKind::InvalidTarget,
            ChainError::ConfirmationTimeout { tx_hash } => {
                return Self::Unknown {
                    tx_hash: tx_hash.clone(),
                }
            }
        };
        Self::Failed {
            stage,
            kind,
            message: err.to_string(),
        }
    }

    /// Map a writer result to an outcome.
    #[must_use]
    pub fn from_transaction(result: TransactionResult) -> Self {
        match result {
            TransactionResult::Confirmed { tx_hash } => Self::Succeeded { tx_hash },
            TransactionResult::Reverted { reason, tx_hash } => Self::Failed {
                stage: FailureStage::Write,
                kind: FailureKind::ContractRevert,
                message: match tx_hash {
                    Some(hash) => format!("contract reverted: {reason} (tx {hash})"),
                    None => format!("contract reverted: {reason}"),
                },
            },
            TransactionResult::Timeout { tx_hash } => Self::Unknown { tx_hash },
        }
    }

    /// True if the writer was invoked for this target.
    #[must_use]
    pub fn is_attempted(&self) -> bool {
        match self {
            Self::Succeeded { .. } | Self::Unknown { .. } => true,
            Self::Failed { stage, .. } => *stage == FailureStage::Write,
            Self::Skipped { .. } => false,
        }
    }

    /// Short label for logs and storage.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Outcome tagged with the target it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub target_id: TargetId,
    pub kind: TargetKind,
    pub outcome: TargetOutcome,
}
