//! SQLite pass history.
//!
//! Stores every finished pass in `rebalance_passes` with its counters and
//! one `rebalance_outcomes` row per target. Implements the
//! [`PassRecorder`](crate::port::PassRecorder) port.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use tracing::debug;

use super::registry::{parse_timestamp, timestamp};
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{NewOutcomeRow, OutcomeRow, PassRow};
use crate::adapter::outbound::sqlite::database::schema::{rebalance_outcomes, rebalance_passes};
use crate::domain::id::{PassId, TargetId};
use crate::domain::outcome::{OutcomeRecord, TargetOutcome};
use crate::domain::pass::{PassBuilder, PassStatus, RebalancePass};
use crate::domain::report::RunReport;
use crate::domain::target::TargetKind;
use crate::error::{Error, Result};
use crate::port::PassRecorder;

const STATUS_COMPLETED: &str = "completed";
const STATUS_ABORTED: &str = "aborted";

fn count(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// SQLite-backed pass recorder.
pub struct SqlitePassRecorder {
    /// Database connection pool.
    pool: DbPool,
}

impl SqlitePassRecorder {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn pass_row(pass: &RebalancePass) -> PassRow {
        let counts = RunReport::from_pass(pass).counts();
        let (status, abort_reason) = match pass.status() {
            PassStatus::Completed => (STATUS_COMPLETED, None),
            PassStatus::Aborted { reason } => (STATUS_ABORTED, Some(reason.clone())),
        };
        PassRow {
            id: pass.id().to_string(),
            started_at: timestamp(pass.started_at()),
            finished_at: timestamp(pass.finished_at()),
            status: status.to_string(),
            abort_reason,
            targets: count(counts.targets),
            attempted: count(counts.attempted),
            succeeded: count(counts.succeeded),
            skipped: count(counts.skipped),
            failed: count(counts.failed),
            unknown: count(counts.unknown),
        }
    }

    fn outcome_rows(pass: &RebalancePass) -> Result<Vec<NewOutcomeRow>> {
        pass.outcomes()
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let tx_hash = match &record.outcome {
                    TargetOutcome::Succeeded { tx_hash } | TargetOutcome::Unknown { tx_hash } => {
                        Some(tx_hash.clone())
                    }
                    _ => None,
                };
                Ok(NewOutcomeRow {
                    pass_id: pass.id().to_string(),
                    position: count(position),
                    target_id: record.target_id.to_string(),
                    kind: record.kind.as_str().to_string(),
                    outcome: record.outcome.label().to_string(),
                    detail: serde_json::to_string(&record.outcome)?,
                    tx_hash,
                })
            })
            .collect()
    }

    fn restore(row: PassRow, outcomes: Vec<OutcomeRow>) -> Result<RebalancePass> {
        let started_at = parse_timestamp(&row.started_at).map_err(Error::Parse)?;
        let finished_at = parse_timestamp(&row.finished_at).map_err(Error::Parse)?;
        let status = match row.status.as_str() {
            STATUS_ABORTED => PassStatus::Aborted {
                reason: row.abort_reason.unwrap_or_default(),
            },
            _ => PassStatus::Completed,
        };

        let records = outcomes
            .into_iter()
            .map(|o| {
                Ok(OutcomeRecord {
                    target_id: TargetId::from(o.target_id),
                    kind: o.kind.parse::<TargetKind>()?,
                    outcome: serde_json::from_str(&o.detail)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PassBuilder::restore(
            PassId::from(row.id),
            started_at,
            finished_at,
            status,
            records,
        ))
    }

    /// Write a pass and its outcomes in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database write fails.
    pub fn insert(&self, pass: &RebalancePass) -> Result<()> {
        let pass_row = Self::pass_row(pass);
        let outcome_rows = Self::outcome_rows(pass)?;
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(rebalance_passes::table)
                .values(&pass_row)
                .execute(conn)?;
            if !outcome_rows.is_empty() {
                diesel::insert_into(rebalance_outcomes::table)
                    .values(&outcome_rows)
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!(pass_id = %pass.id(), outcomes = outcome_rows.len(), "Recorded rebalance pass");
        Ok(())
    }

    /// Load the newest `limit` passes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database read fails or a row cannot be decoded.
    pub fn load_recent(&self, limit: usize) -> Result<Vec<RebalancePass>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let passes: Vec<PassRow> = rebalance_passes::table
            .order(rebalance_passes::started_at.desc())
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .select(PassRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        if passes.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = passes.iter().map(|p| p.id.as_str()).collect();
        let outcome_rows: Vec<OutcomeRow> = rebalance_outcomes::table
            .filter(rebalance_outcomes::pass_id.eq_any(ids))
            .order((rebalance_outcomes::pass_id.asc(), rebalance_outcomes::position.asc()))
            .select(OutcomeRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut by_pass: HashMap<String, Vec<OutcomeRow>> = HashMap::new();
        for row in outcome_rows {
            by_pass.entry(row.pass_id.clone()).or_default().push(row);
        }

        passes
            .into_iter()
            .map(|row| {
                let outcomes = by_pass.remove(&row.id).unwrap_or_default();
                Self::restore(row, outcomes)
            })
            .collect()
    }
}

#[async_trait]
impl PassRecorder for SqlitePassRecorder {
    async fn record(&self, pass: &RebalancePass) -> Result<()> {
        self.insert(pass)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RebalancePass>> {
        self.load_recent(limit)
    }
}
