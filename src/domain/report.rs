//! Pass-level summary for logs, history and alerting.

use std::collections::BTreeMap;

use serde::Serialize;

use super::eligibility::SkipReason;
use super::id::{PassId, TargetId};
use super::outcome::{FailureKind, FailureStage, TargetOutcome};
use super::pass::{PassStatus, RebalancePass};

/// Per-outcome counters of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub targets: usize,
    /// Targets for which the writer was invoked.
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unknown: usize,
}

/// One failed target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub target_id: TargetId,
    pub stage: FailureStage,
    pub kind: FailureKind,
    pub message: String,
}

/// One target whose transaction outcome is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownEntry {
    pub target_id: TargetId,
    pub tx_hash: String,
}

/// Aggregated view of a [`RebalancePass`].
///
/// Produced for every pass, including aborted and all-failed ones, so
/// alerting can look at trends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pass_id: PassId,
    duration_ms: i64,
    aborted: Option<String>,
    counts: ReportCounts,
    skipped_by_reason: BTreeMap<SkipReason, usize>,
    failures: Vec<FailureEntry>,
    unknown: Vec<UnknownEntry>,
}

impl RunReport {
    /// Aggregate a finished pass.
    #[must_use]
    pub fn from_pass(pass: &RebalancePass) -> Self {
        let mut counts = ReportCounts {
            targets: pass.outcomes().len(),
            ..ReportCounts::default()
        };
        let mut skipped_by_reason = BTreeMap::new();
        let mut failures = Vec::new();
        let mut unknown = Vec::new();

        for record in pass.outcomes() {
            if record.outcome.is_attempted() {
                counts.attempted += 1;
            }
            match &record.outcome {
                TargetOutcome::Succeeded { .. } => counts.succeeded += 1,
                TargetOutcome::Skipped { reason } => {
                    counts.skipped += 1;
                    *skipped_by_reason.entry(*reason).or_insert(0) += 1;
                }
                TargetOutcome::Failed {
                    stage,
                    kind,
                    message,
                } => {
                    counts.failed += 1;
                    failures.push(FailureEntry {
                        target_id: record.target_id.clone(),
                        stage: *stage,
                        kind: *kind,
                        message: message.clone(),
                    });
                }
                TargetOutcome::Unknown { tx_hash } => {
                    counts.unknown += 1;
                    unknown.push(UnknownEntry {
                        target_id: record.target_id.clone(),
                        tx_hash: tx_hash.clone(),
                    });
                }
            }
        }

        let aborted = match pass.status() {
            PassStatus::Completed => None,
            PassStatus::Aborted { reason } => Some(reason.clone()),
        };

        Self {
            pass_id: pass.id().clone(),
            duration_ms: (pass.finished_at() - pass.started_at()).num_milliseconds(),
            aborted,
            counts,
            skipped_by_reason,
            failures,
            unknown,
        }
    }

    #[must_use]
    pub fn pass_id(&self) -> &PassId {
        &self.pass_id
    }

    #[must_use]
    pub fn counts(&self) -> ReportCounts {
        self.counts
    }

    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    #[must_use]
    pub fn aborted(&self) -> Option<&str> {
        self.aborted.as_deref()
    }

    #[must_use]
    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped_by_reason.get(&reason).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn skipped_by_reason(&self) -> &BTreeMap<SkipReason, usize> {
        &self.skipped_by_reason
    }

    #[must_use]
    pub fn failures(&self) -> &[FailureEntry] {
        &self.failures
    }

    #[must_use]
    pub fn unknown(&self) -> &[UnknownEntry] {
        &self.unknown
    }

    /// True if nothing failed, nothing is unknown and the pass ran.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.aborted.is_none() && self.counts.failed == 0 && self.counts.unknown == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::OutcomeRecord;
    use crate::domain::pass::PassBuilder;
    use crate::domain::target::TargetKind;

    fn record(id: &str, outcome: TargetOutcome) -> OutcomeRecord {
        OutcomeRecord {
            target_id: id.into(),
            kind: TargetKind::UserDelegation,
            outcome,
        }
    }

    #[test]
    fn counts_every_outcome_kind() {
        let pass = PassBuilder::start().complete(vec![
            record("a", TargetOutcome::Succeeded { tx_hash: "0x1".into() }),
            record(
                "b",
                TargetOutcome::Skipped {
                    reason: SkipReason::Disabled,
                },
            ),
            record(
                "c",
                TargetOutcome::Skipped {
                    reason: SkipReason::ZeroBalance,
                },
            ),
            record(
                "d",
                TargetOutcome::Failed {
                    stage: FailureStage::Read,
                    kind: FailureKind::TransientNetwork,
                    message: "timeout".into(),
                },
            ),
            record(
                "e",
                TargetOutcome::Failed {
                    stage: FailureStage::Write,
                    kind: FailureKind::ContractRevert,
                    message: "NotOperator".into(),
                },
            ),
            record("f", TargetOutcome::Unknown { tx_hash: "0x2".into() }),
        ]);

        let report = RunReport::from_pass(&pass);
        let counts = report.counts();

        assert_eq!(counts.targets, 6);
        assert_eq!(counts.attempted, 3);
        assert_eq!(counts.succeeded, 1);
        assert_eq!(counts.skipped, 2);
        assert_eq!(counts.failed, 2);
        assert_eq!(counts.unknown, 1);
        assert_eq!(report.skipped(SkipReason::Disabled), 1);
        assert_eq!(report.skipped(SkipReason::Inactive), 0);
        assert_eq!(report.failures().len(), 2);
        assert_eq!(report.unknown()[0].tx_hash, "0x2");
        assert!(!report.is_clean());
    }

    #[test]
    fn aborted_pass_still_produces_report() {
        let pass = PassBuilder::start().abort("registry unavailable");
        let report = RunReport::from_pass(&pass);

        assert_eq!(report.aborted(), Some("registry unavailable"));
        assert_eq!(report.counts(), ReportCounts::default());
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_pass_is_clean() {
        let report = RunReport::from_pass(&PassBuilder::start().complete(Vec::new()));
        assert!(report.is_clean());
        assert_eq!(report.counts().targets, 0);
    }

    #[test]
    fn report_serializes_to_json() {
        let pass = PassBuilder::start().complete(vec![record(
            "a",
            TargetOutcome::Skipped {
                reason: SkipReason::ZeroBalance,
            },
        )]);
        let json = serde_json::to_value(RunReport::from_pass(&pass)).unwrap();
        assert_eq!(json["counts"]["skipped"], 1);
        assert_eq!(json["skipped_by_reason"]["zero-balance"], 1);
    }
}
