//! Operator nonce allocation.
//!
//! One signing key, many concurrent targets. Every broadcast holds a
//! [`NonceLease`] from allocation until the node accepts (or rejects) the
//! transaction, so two sends can never use the same nonce.

use std::future::Future;

use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::ChainError;

/// Cached next nonce for the operator account.
#[derive(Debug, Default)]
pub struct NonceManager {
    next: Mutex<Option<u64>>,
}

impl NonceManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive use of the next nonce.
    ///
    /// `fetch` is only called when no nonce is cached (first use, or after
    /// [`NonceLease::invalidate`]).
    ///
    /// # Errors
    ///
    /// Returns the error from `fetch`.
    pub async fn lease<F, Fut>(&self, fetch: F) -> Result<NonceLease<'_>, ChainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<u64, ChainError>>,
    {
        let mut guard = self.next.lock().await;
        let nonce = match *guard {
            Some(nonce) => nonce,
            None => {
                let nonce = fetch().await?;
                debug!(nonce, "Fetched operator nonce");
                *guard = Some(nonce);
                nonce
            }
        };
        Ok(NonceLease { guard, nonce })
    }

    /// Forget the cached nonce; the next lease refetches it.
    pub async fn reset(&self) {
        *self.next.lock().await = None;
    }

    /// Cached next nonce, if any.
    pub async fn peek(&self) -> Option<u64> {
        *self.next.lock().await
    }
}

/// Exclusive hold on one nonce. Dropping it without [`commit`](Self::commit)
/// leaves the nonce available for the next lease.
#[derive(Debug)]
pub struct NonceLease<'a> {
    guard: MutexGuard<'a, Option<u64>>,
    nonce: u64,
}

impl NonceLease<'_> {
    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The transaction was accepted; advance to the next nonce.
    pub fn commit(mut self) {
        *self.guard = Some(self.nonce + 1);
    }

    /// The node state is unclear; refetch before the next send.
    pub fn invalidate(mut self) {
        *self.guard = None;
    }
}
