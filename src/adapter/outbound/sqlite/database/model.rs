//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{rebalance_outcomes, rebalance_passes, rebalance_targets};

/// Database row for a tracked target.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = rebalance_targets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TargetRow {
    pub id: String,
    pub kind: String,
    pub enabled: i32,
    pub last_rebalanced_at: Option<String>,
    pub created_at: String,
}

/// Database row for a finished pass with its counters.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = rebalance_passes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PassRow {
    pub id: String,
    pub started_at: String,
    pub finished_at: String,
    pub status: String,
    pub abort_reason: Option<String>,
    pub targets: i32,
    pub attempted: i32,
    pub succeeded: i32,
    pub skipped: i32,
    pub failed: i32,
    pub unknown: i32,
}

/// Database row for a target outcome (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = rebalance_outcomes)]
pub struct NewOutcomeRow {
    pub pass_id: String,
    pub position: i32,
    pub target_id: String,
    pub kind: String,
    pub outcome: String,
    /// Full outcome as JSON.
    pub detail: String,
    pub tx_hash: Option<String>,
}

/// Database row for a target outcome (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = rebalance_outcomes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OutcomeRow {
    pub id: Option<i32>,
    pub pass_id: String,
    pub position: i32,
    pub target_id: String,
    pub kind: String,
    pub outcome: String,
    pub detail: String,
    pub tx_hash: Option<String>,
}
