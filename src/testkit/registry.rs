//! Registry and recorder fakes.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::id::TargetId;
use crate::domain::pass::RebalancePass;
use crate::domain::target::RebalanceTarget;
use crate::error::{Error, RegistryError, Result};
use crate::port::{PassRecorder, TargetRegistry};

/// Registry whose store is always unreachable.
#[derive(Debug, Default)]
pub struct FailingRegistry {
    calls: AtomicU32,
}

impl FailingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetRegistry for FailingRegistry {
    async fn list_eligible_targets(&self) -> std::result::Result<Vec<RebalanceTarget>, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RegistryError::Unavailable("connection refused".to_string()))
    }

    async fn mark_rebalanced(
        &self,
        target_id: &TargetId,
        _at: DateTime<Utc>,
    ) -> std::result::Result<(), RegistryError> {
        Err(RegistryError::NotFound(target_id.to_string()))
    }
}

/// In-memory pass history. Can be told to fail every write.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    passes: Mutex<Vec<RebalancePass>>,
    fail_writes: bool,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            passes: Mutex::new(Vec::new()),
            fail_writes: true,
        }
    }

    pub fn passes(&self) -> Vec<RebalancePass> {
        self.passes.lock().clone()
    }
}

#[async_trait]
impl PassRecorder for MemoryRecorder {
    async fn record(&self, pass: &RebalancePass) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Database("disk I/O error".to_string()));
        }
        self.passes.lock().push(pass.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<RebalancePass>> {
        Ok(self.passes.lock().iter().rev().take(limit).cloned().collect())
    }
}
