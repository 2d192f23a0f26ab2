//! Scripted chain fakes.
//!
//! - [`ScriptedReader`] - per-target responses for delegation and market
//!   reads. A script with several entries is consumed in order; the last entry
//!   repeats forever.
//! - [`ScriptedWriter`] - per-target write results with an optional delay.
//!   Counts calls and records the highest number of simultaneous calls seen
//!   for any single target.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::domain::tx_hash;
use crate::domain::id::TargetId;
use crate::domain::outcome::TransactionResult;
use crate::domain::snapshot::{DelegationConfig, MarketStatus};
use crate::domain::target::RebalanceTarget;
use crate::error::ChainError;
use crate::port::{ChainReader, ChainWriter};

type Script<T> = VecDeque<Result<T, ChainError>>;

fn next_from<T: Clone>(
    scripts: &Mutex<HashMap<TargetId, Script<T>>>,
    id: &TargetId,
) -> Option<Result<T, ChainError>> {
    let mut scripts = scripts.lock();
    let script = scripts.get_mut(id)?;
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

fn bump(counts: &Mutex<HashMap<TargetId, u32>>, id: &TargetId) {
    *counts.lock().entry(id.clone()).or_insert(0) += 1;
}

// ---------------------------------------------------------------------------
// ScriptedReader
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ScriptedReader {
    delegations: Mutex<HashMap<TargetId, Script<DelegationConfig>>>,
    markets: Mutex<HashMap<TargetId, Script<MarketStatus>>>,
    reads: Mutex<HashMap<TargetId, u32>>,
}

impl ScriptedReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delegation(self, id: impl Into<TargetId>, config: DelegationConfig) -> Self {
        self.script_delegation(id, vec![Ok(config)]);
        self
    }

    pub fn with_market(self, id: impl Into<TargetId>, status: MarketStatus) -> Self {
        self.script_market(id, vec![Ok(status)]);
        self
    }

    pub fn with_delegation_error(self, id: impl Into<TargetId>, err: ChainError) -> Self {
        self.script_delegation(id, vec![Err(err)]);
        self
    }

    pub fn script_delegation(
        &self,
        id: impl Into<TargetId>,
        script: Vec<Result<DelegationConfig, ChainError>>,
    ) {
        self.delegations.lock().insert(id.into(), script.into());
    }

    pub fn script_market(&self, id: impl Into<TargetId>, script: Vec<Result<MarketStatus, ChainError>>) {
        self.markets.lock().insert(id.into(), script.into());
    }

    /// Number of reads issued for `id`.
    pub fn reads(&self, id: impl Into<TargetId>) -> u32 {
        self.reads.lock().get(&id.into()).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> u32 {
        self.reads.lock().values().sum()
    }
}

fn unscripted(id: &TargetId) -> ChainError {
    ChainError::Rpc(format!("no scripted state for {id}"))
}

#[async_trait]
impl ChainReader for ScriptedReader {
    async fn get_delegation_config(&self, target_id: &TargetId) -> Result<DelegationConfig, ChainError> {
        bump(&self.reads, target_id);
        next_from(&self.delegations, target_id).unwrap_or_else(|| Err(unscripted(target_id)))
    }

    async fn get_market_status(&self, market_id: &TargetId) -> Result<MarketStatus, ChainError> {
        bump(&self.reads, market_id);
        next_from(&self.markets, market_id).unwrap_or_else(|| Err(unscripted(market_id)))
    }
}

// ---------------------------------------------------------------------------
// ScriptedWriter
// ---------------------------------------------------------------------------

/// Writer fake. Unscripted targets confirm with a fresh hash.
#[derive(Debug, Default)]
pub struct ScriptedWriter {
    scripts: Mutex<HashMap<TargetId, Script<TransactionResult>>>,
    fallback: Mutex<Option<Result<TransactionResult, ChainError>>>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<TargetId, u32>>,
    active: Mutex<HashMap<TargetId, u32>>,
    max_concurrent_per_target: AtomicU32,
    sequence: AtomicU32,
}

impl ScriptedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every call for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer every unscripted call with `result`.
    pub fn always(self, result: Result<TransactionResult, ChainError>) -> Self {
        *self.fallback.lock() = Some(result);
        self
    }

    pub fn with_result(self, id: impl Into<TargetId>, result: Result<TransactionResult, ChainError>) -> Self {
        self.script(id, vec![result]);
        self
    }

    pub fn script(&self, id: impl Into<TargetId>, script: Vec<Result<TransactionResult, ChainError>>) {
        self.scripts.lock().insert(id.into(), script.into());
    }

    /// Number of rebalance calls made for `id`.
    pub fn calls(&self, id: impl Into<TargetId>) -> u32 {
        self.calls.lock().get(&id.into()).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().values().sum()
    }

    /// Highest number of overlapping calls observed for one target.
    pub fn max_concurrent_per_target(&self) -> u32 {
        self.max_concurrent_per_target.load(Ordering::SeqCst)
    }

    fn respond(&self, id: &TargetId) -> Result<TransactionResult, ChainError> {
        if let Some(result) = next_from(&self.scripts, id) {
            return result;
        }
        if let Some(result) = self.fallback.lock().clone() {
            return result;
        }
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TransactionResult::Confirmed {
            tx_hash: tx_hash(u64::from(n)),
        })
    }
}

#[async_trait]
impl ChainWriter for ScriptedWriter {
    async fn rebalance(&self, target: &RebalanceTarget) -> Result<TransactionResult, ChainError> {
        bump(&self.calls, &target.id);
        let concurrent = {
            let mut active = self.active.lock();
            let count = active.entry(target.id.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.max_concurrent_per_target
            .fetch_max(concurrent, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(count) = self.active.lock().get_mut(&target.id) {
            *count -= 1;
        }
        self.respond(&target.id)
    }
}
