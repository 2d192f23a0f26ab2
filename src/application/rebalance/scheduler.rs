//! Periodic rebalance passes over every registered target.
//!
//! # Architecture
//!
//! ```text
//! interval tick
//!      |
//!      v
//! TargetRegistry::list_eligible_targets()
//!      |
//!      +-- per target (bounded parallel, registry order kept)
//!      |      disabled? -> skipped(disabled)
//!      |      in flight? -> skipped(in-flight)
//!      |      ChainReader -> EligibilitySnapshot -> evaluate()
//!      |      ChainWriter::rebalance() -> outcome
//!      v
//! RebalancePass -> RunReport (logged) -> PassRecorder (best effort)
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::inflight::InFlightTargets;
use crate::domain::eligibility::{evaluate, Eligibility, SkipReason};
use crate::domain::outcome::{FailureStage, OutcomeRecord, TargetOutcome};
use crate::domain::pass::{PassBuilder, RebalancePass};
use crate::domain::report::RunReport;
use crate::domain::snapshot::{ChainState, EligibilitySnapshot};
use crate::domain::target::{RebalanceTarget, TargetKind};
use crate::error::ChainError;
use crate::infrastructure::config::scheduler::SchedulerConfig;
use crate::port::{ChainReader, ChainWriter, PassRecorder, TargetRegistry};

/// Runtime knobs for the scheduler loop.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Time between pass starts.
    pub interval: Duration,
    /// Maximum targets processed at once within a pass.
    pub concurrency: usize,
    /// Fire the first pass immediately.
    pub run_on_start: bool,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self::from(&SchedulerConfig::default())
    }
}

impl From<&SchedulerConfig> for SchedulerSettings {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            interval: config.interval(),
            concurrency: config.concurrency.max(1),
            run_on_start: config.run_on_start,
        }
    }
}

/// Handle for controlling a running scheduler loop.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop scheduling new passes and wait for the current one to finish.
    ///
    /// In-flight chain calls are never cancelled.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Scheduler task ended abnormally");
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Drives rebalance passes: registry in, outcomes out.
pub struct RebalanceScheduler {
    registry: Arc<dyn TargetRegistry>,
    reader: Arc<dyn ChainReader>,
    writer: Arc<dyn ChainWriter>,
    recorder: Option<Arc<dyn PassRecorder>>,
    settings: SchedulerSettings,
    in_flight: InFlightTargets,
    pass_lock: Mutex<()>,
}

impl RebalanceScheduler {
    pub fn new(
        registry: Arc<dyn TargetRegistry>,
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            registry,
            reader,
            writer,
            recorder: None,
            settings,
            in_flight: InFlightTargets::new(),
            pass_lock: Mutex::new(()),
        }
    }

    /// Persist every finished pass through `recorder`.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn PassRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    /// Run one pass over the current target set.
    ///
    /// Always returns a pass. A registry failure yields an aborted pass with
    /// no outcomes; every other failure is recorded against its target.
    pub async fn run_pass(&self) -> RebalancePass {
        let builder = PassBuilder::start();
        let pass_id = builder.id().clone();
        debug!(pass_id = %pass_id, "Rebalance pass starting");

        let targets = match self.registry.list_eligible_targets().await {
            Ok(targets) => targets,
            Err(e) => {
                error!(pass_id = %pass_id, error = %e, "Target registry unavailable, aborting pass");
                let pass = builder.abort(e.to_string());
                self.finish(&pass).await;
                return pass;
            }
        };

        if targets.is_empty() {
            info!(pass_id = %pass_id, "No eligible targets");
        }

        let outcomes: Vec<OutcomeRecord> = stream::iter(targets)
            .map(|target| async move { self.process_target(&target).await })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let pass = builder.complete(outcomes);
        self.finish(&pass).await;
        pass
    }

    /// Run a pass unless another scheduled pass is still executing.
    pub async fn try_run_pass(&self) -> Option<RebalancePass> {
        let Ok(_guard) = self.pass_lock.try_lock() else {
            warn!("Previous rebalance pass still running, skipping tick");
            return None;
        };
        Some(self.run_pass().await)
    }

    /// Run passes on the configured interval until `shutdown` flips to true.
    pub async fn run_until(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let period = self.settings.interval;
        let first = if self.settings.run_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = interval_at(first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = period.as_secs(),
            concurrency = self.settings.concurrency,
            run_on_start = self.settings.run_on_start,
            "Rebalance scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.try_run_pass().await;
                }
            }
        }

        info!("Rebalance scheduler stopped");
    }

    /// Spawn the scheduler loop in the background.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run_until(shutdown_rx));
        SchedulerHandle { shutdown_tx, task }
    }

    async fn process_target(&self, target: &RebalanceTarget) -> OutcomeRecord {
        let outcome = self.decide_and_act(target).await;
        log_outcome(target, &outcome);
        OutcomeRecord {
            target_id: target.id.clone(),
            kind: target.kind,
            outcome,
        }
    }

    async fn decide_and_act(&self, target: &RebalanceTarget) -> TargetOutcome {
        // Registry-disabled targets never reach the chain.
        if !target.enabled {
            return TargetOutcome::Skipped {
                reason: SkipReason::Disabled,
            };
        }

        let Some(_claim) = self.in_flight.try_acquire(&target.id) else {
            return TargetOutcome::Skipped {
                reason: SkipReason::InFlight,
            };
        };

        let snapshot = match self.read_snapshot(target).await {
            Ok(snapshot) => snapshot,
            Err(e) => return TargetOutcome::from_error(FailureStage::Read, &e),
        };

        if let Eligibility::Skip(reason) = evaluate(&snapshot, Utc::now()) {
            return TargetOutcome::Skipped { reason };
        }

        let outcome = match self.writer.rebalance(target).await {
            Ok(result) => TargetOutcome::from_transaction(result),
            Err(e) => TargetOutcome::from_error(FailureStage::Write, &e),
        };

        if matches!(outcome, TargetOutcome::Succeeded { .. }) {
            if let Err(e) = self.registry.mark_rebalanced(&target.id, Utc::now()).await {
                warn!(target = %target.id, error = %e, "Failed to mark target rebalanced");
            }
        }

        outcome
    }

    async fn read_snapshot(&self, target: &RebalanceTarget) -> Result<EligibilitySnapshot, ChainError> {
        let state = match target.kind {
            TargetKind::UserDelegation => {
                let config = self.reader.get_delegation_config(&target.id).await?;
                debug!(
                    target = %target.id,
                    enabled = config.enabled,
                    risk_profile = %config.risk_profile,
                    deposited = %config.deposited_amount,
                    "Read delegation config"
                );
                ChainState::Delegation(config)
            }
            TargetKind::MarketVault => {
                let status = self.reader.get_market_status(&target.id).await?;
                debug!(
                    target = %target.id,
                    active = status.active,
                    resolved = status.resolved,
                    vault_balance = %status.vault_balance,
                    "Read market status"
                );
                ChainState::Market(status)
            }
        };
        Ok(EligibilitySnapshot::new(target, state, Utc::now()))
    }

    async fn finish(&self, pass: &RebalancePass) {
        let report = RunReport::from_pass(pass);
        log_report(&report);

        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder.record(pass).await {
                warn!(pass_id = %pass.id(), error = %e, "Failed to record rebalance pass");
            }
        }
    }
}

fn log_outcome(target: &RebalanceTarget, outcome: &TargetOutcome) {
    match outcome {
        TargetOutcome::Succeeded { tx_hash } => {
            info!(target = %target.id, kind = %target.kind, tx_hash = %tx_hash, "Target rebalanced");
        }
        TargetOutcome::Skipped { reason } => {
            debug!(target = %target.id, kind = %target.kind, reason = %reason, "Target skipped");
        }
        TargetOutcome::Failed {
            stage,
            kind,
            message,
        } => {
            warn!(
                target = %target.id,
                stage = %stage,
                failure = %kind,
                error = %message,
                "Target rebalance failed"
            );
        }
        TargetOutcome::Unknown { tx_hash } => {
            warn!(
                target = %target.id,
                tx_hash = %tx_hash,
                "Rebalance outcome unknown, confirmation timed out"
            );
        }
    }
}

fn log_report(report: &RunReport) {
    let counts = report.counts();
    if let Some(reason) = report.aborted() {
        error!(pass_id = %report.pass_id(), reason = %reason, "Rebalance pass aborted");
        return;
    }
    if report.is_clean() {
        info!(
            pass_id = %report.pass_id(),
            targets = counts.targets,
            attempted = counts.attempted,
            succeeded = counts.succeeded,
            skipped = counts.skipped,
            duration_ms = report.duration_ms(),
            "Rebalance pass complete"
        );
    } else {
        warn!(
            pass_id = %report.pass_id(),
            targets = counts.targets,
            attempted = counts.attempted,
            succeeded = counts.succeeded,
            skipped = counts.skipped,
            failed = counts.failed,
            unknown = counts.unknown,
            duration_ms = report.duration_ms(),
            "Rebalance pass complete with failures"
        );
        for failure in report.failures() {
            warn!(
                pass_id = %report.pass_id(),
                target = %failure.target_id,
                stage = %failure.stage,
                failure = %failure.kind,
                error = %failure.message,
                "Pass failure"
            );
        }
    }
}
