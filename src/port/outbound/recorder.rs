//! Pass history port.

use async_trait::async_trait;

use crate::domain::pass::RebalancePass;
use crate::error::Result;

/// Persists finished passes for later inspection.
#[async_trait]
pub trait PassRecorder: Send + Sync {
    /// Store a finished pass with all of its outcomes.
    ///
    /// # Errors
    ///
    /// Returns an error if the pass could not be written. The scheduler logs
    /// it and moves on.
    async fn record(&self, pass: &RebalancePass) -> Result<()>;

    /// Most recent passes, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    async fn recent(&self, limit: usize) -> Result<Vec<RebalancePass>>;
}
