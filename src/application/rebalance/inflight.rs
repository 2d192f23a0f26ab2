//! Per-target mutual exclusion across passes.

use dashmap::DashSet;

use crate::domain::id::TargetId;

/// Targets with a read or write currently in progress.
///
/// Shared by every pass of one scheduler, so overlapping passes cannot
/// submit two transactions for the same target.
#[derive(Debug, Default)]
pub struct InFlightTargets {
    active: DashSet<TargetId>,
}

impl InFlightTargets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id`, or return `None` if another pass already holds it.
    ///
    /// The claim is released when the guard drops.
    pub fn try_acquire(&self, id: &TargetId) -> Option<InFlightGuard<'_>> {
        if self.active.insert(id.clone()) {
            Some(InFlightGuard {
                owner: self,
                id: id.clone(),
            })
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains(&self, id: &TargetId) -> bool {
        self.active.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Releases a target claim on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlightTargets,
    id: TargetId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.active.remove(&self.id);
    }
}
