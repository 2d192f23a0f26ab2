//! SQLite target registry.
//!
//! Tracks user delegations and market vaults in `rebalance_targets`.
//! Listing order is creation order.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::TargetRow;
use crate::adapter::outbound::sqlite::database::schema::rebalance_targets;
use crate::domain::id::TargetId;
use crate::domain::target::{RebalanceTarget, TargetKind};
use crate::error::RegistryError;
use crate::port::TargetRegistry;

pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{value}': {e}"))
}

/// SQLite-backed target registry.
pub struct SqliteTargetRegistry {
    /// Database connection pool.
    pool: DbPool,
}

impl SqliteTargetRegistry {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<
        diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<diesel::SqliteConnection>>,
        RegistryError,
    > {
        self.pool
            .get()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))
    }

    fn to_row(target: &RebalanceTarget, created_at: DateTime<Utc>) -> TargetRow {
        TargetRow {
            id: target.id.to_string(),
            kind: target.kind.as_str().to_string(),
            enabled: i32::from(target.enabled),
            last_rebalanced_at: target.last_rebalanced_at.map(timestamp),
            created_at: timestamp(created_at),
        }
    }

    fn from_row(row: TargetRow) -> Result<RebalanceTarget, RegistryError> {
        let corrupt = |reason: String| {
            RegistryError::Unavailable(format!("corrupt target row '{}': {reason}", row.id))
        };
        let kind = TargetKind::from_str(&row.kind).map_err(|e| corrupt(e.to_string()))?;
        let last_rebalanced_at = row
            .last_rebalanced_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(corrupt)?;

        Ok(RebalanceTarget {
            id: TargetId::from(row.id),
            kind,
            last_rebalanced_at,
            enabled: row.enabled != 0,
        })
    }

    /// Start tracking a target.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyTracked`] for a duplicate id.
    pub fn add(&self, target: &RebalanceTarget) -> Result<(), RegistryError> {
        let mut conn = self.conn()?;
        let row = Self::to_row(target, Utc::now());

        let exists = rebalance_targets::table
            .find(&row.id)
            .select(rebalance_targets::id)
            .first::<String>(&mut conn)
            .optional()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?
            .is_some();
        if exists {
            return Err(RegistryError::AlreadyTracked(row.id));
        }

        diesel::insert_into(rebalance_targets::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(())
    }

    /// Flip the registry-side enabled flag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn set_enabled(&self, id: &TargetId, enabled: bool) -> Result<(), RegistryError> {
        let mut conn = self.conn()?;
        let updated = diesel::update(rebalance_targets::table.find(id.as_str()))
            .set(rebalance_targets::enabled.eq(i32::from(enabled)))
            .execute(&mut conn)
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        if updated == 0 {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Stop tracking a target. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached.
    pub fn remove(&self, id: &TargetId) -> Result<bool, RegistryError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(rebalance_targets::table.find(id.as_str()))
            .execute(&mut conn)
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(deleted > 0)
    }

    /// Look up one target.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or the row is corrupt.
    pub fn get(&self, id: &TargetId) -> Result<Option<RebalanceTarget>, RegistryError> {
        let mut conn = self.conn()?;
        let row: Option<TargetRow> = rebalance_targets::table
            .find(id.as_str())
            .select(TargetRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        row.map(Self::from_row).transpose()
    }

    /// Every tracked target in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] on database failure or a corrupt row.
    pub fn list(&self) -> Result<Vec<RebalanceTarget>, RegistryError> {
        let mut conn = self.conn()?;
        let rows: Vec<TargetRow> = rebalance_targets::table
            .order((rebalance_targets::created_at.asc(), rebalance_targets::id.asc()))
            .select(TargetRow::as_select())
            .load(&mut conn)
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        rows.into_iter().map(Self::from_row).collect()
    }
}

#[async_trait]
impl TargetRegistry for SqliteTargetRegistry {
    async fn list_eligible_targets(&self) -> Result<Vec<RebalanceTarget>, RegistryError> {
        self.list()
    }

    async fn mark_rebalanced(
        &self,
        target_id: &TargetId,
        at: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let mut conn = self.conn()?;
        let updated = diesel::update(rebalance_targets::table.find(target_id.as_str()))
            .set(rebalance_targets::last_rebalanced_at.eq(Some(timestamp(at))))
            .execute(&mut conn)
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        if updated == 0 {
            return Err(RegistryError::NotFound(target_id.to_string()));
        }
        Ok(())
    }
}
