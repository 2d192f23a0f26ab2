//! One scheduler invocation over the full target set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::PassId;
use super::outcome::OutcomeRecord;

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PassStatus {
    /// Every target returned by the registry got an outcome.
    Completed,
    /// The pass could not start processing targets (registry unreachable).
    Aborted { reason: String },
}

/// Immutable record of a finished pass.
///
/// Built by [`PassBuilder`]; there is no way to mutate outcomes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalancePass {
    id: PassId,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    status: PassStatus,
    outcomes: Vec<OutcomeRecord>,
}

impl RebalancePass {
    #[must_use]
    pub fn id(&self) -> &PassId {
        &self.id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    #[must_use]
    pub fn status(&self) -> &PassStatus {
        &self.status
    }

    #[must_use]
    pub fn outcomes(&self) -> &[OutcomeRecord] {
        &self.outcomes
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, PassStatus::Aborted { .. })
    }

    /// Outcome recorded for a target, if it was part of the pass.
    #[must_use]
    pub fn outcome_for(&self, target_id: &str) -> Option<&OutcomeRecord> {
        self.outcomes
            .iter()
            .find(|record| record.target_id.as_str() == target_id)
    }
}

/// In-progress pass, owned by the scheduler while targets are processed.
#[derive(Debug)]
pub struct PassBuilder {
    id: PassId,
    started_at: DateTime<Utc>,
}

impl PassBuilder {
    /// Start a new pass at the current time.
    #[must_use]
    pub fn start() -> Self {
        Self::start_at(Utc::now())
    }

    #[must_use]
    pub fn start_at(started_at: DateTime<Utc>) -> Self {
        Self {
            id: PassId::new(),
            started_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &PassId {
        &self.id
    }

    /// Seal the pass with every target's outcome.
    #[must_use]
    pub fn complete(self, outcomes: Vec<OutcomeRecord>) -> RebalancePass {
        RebalancePass {
            id: self.id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            status: PassStatus::Completed,
            outcomes,
        }
    }

    /// Seal the pass as aborted, with no outcomes.
    #[must_use]
    pub fn abort(self, reason: impl Into<String>) -> RebalancePass {
        RebalancePass {
            id: self.id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            status: PassStatus::Aborted {
                reason: reason.into(),
            },
            outcomes: Vec::new(),
        }
    }

    /// Rebuild a finished pass read back from storage.
    #[must_use]
    pub fn restore(
        id: PassId,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        status: PassStatus,
        outcomes: Vec<OutcomeRecord>,
    ) -> RebalancePass {
        RebalancePass {
            id,
            started_at,
            finished_at,
            status,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::eligibility::SkipReason;
    use crate::domain::outcome::TargetOutcome;
    use crate::domain::target::TargetKind;

    #[test]
    fn completed_pass_keeps_outcomes_in_order() {
        let builder = PassBuilder::start();
        let id = builder.id().clone();
        let pass = builder.complete(vec![
            OutcomeRecord {
                target_id: "1".into(),
                kind: TargetKind::MarketVault,
                outcome: TargetOutcome::Skipped {
                    reason: SkipReason::Inactive,
                },
            },
            OutcomeRecord {
                target_id: "2".into(),
                kind: TargetKind::MarketVault,
                outcome: TargetOutcome::Succeeded {
                    tx_hash: "0x01".into(),
                },
            },
        ]);

        assert_eq!(pass.id(), &id);
        assert_eq!(pass.outcomes().len(), 2);
        assert_eq!(pass.outcomes()[1].target_id.as_str(), "2");
        assert!(pass.finished_at() >= pass.started_at());
        assert!(!pass.is_aborted());
        assert!(pass.outcome_for("1").is_some());
        assert!(pass.outcome_for("3").is_none());
    }

    #[test]
    fn aborted_pass_has_no_outcomes() {
        let pass = PassBuilder::start().abort("registry down");
        assert!(pass.is_aborted());
        assert!(pass.outcomes().is_empty());
        assert_eq!(
            pass.status(),
            &PassStatus::Aborted {
                reason: "registry down".into()
            }
        );
    }
}
