//! In-memory target registry.
//!
//! Backs the `static` registry backend (targets listed in the config file)
//! and is handy in tests. Insertion order is the listing order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::id::TargetId;
use crate::domain::target::RebalanceTarget;
use crate::error::RegistryError;
use crate::port::TargetRegistry;

/// Target registry held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryTargetRegistry {
    targets: RwLock<Vec<RebalanceTarget>>,
}

impl MemoryTargetRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with `targets`. Later duplicates are dropped.
    pub fn with_targets(targets: impl IntoIterator<Item = RebalanceTarget>) -> Self {
        let registry = Self::new();
        for target in targets {
            let _ = registry.insert(target);
        }
        registry
    }

    /// Track a new target.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyTracked`] if the id is already present.
    pub fn insert(&self, target: RebalanceTarget) -> Result<(), RegistryError> {
        let mut targets = self.targets.write();
        if targets.iter().any(|t| t.id == target.id) {
            return Err(RegistryError::AlreadyTracked(target.id.to_string()));
        }
        targets.push(target);
        Ok(())
    }

    /// Flip the registry-side enabled flag.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn set_enabled(&self, id: &TargetId, enabled: bool) -> Result<(), RegistryError> {
        let mut targets = self.targets.write();
        let target = targets
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        target.enabled = enabled;
        Ok(())
    }

    /// Stop tracking a target. Returns whether it was present.
    pub fn remove(&self, id: &TargetId) -> bool {
        let mut targets = self.targets.write();
        let before = targets.len();
        targets.retain(|t| &t.id != id);
        targets.len() != before
    }

    #[must_use]
    pub fn get(&self, id: &TargetId) -> Option<RebalanceTarget> {
        self.targets.read().iter().find(|t| &t.id == id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }
}

#[async_trait]
impl TargetRegistry for MemoryTargetRegistry {
    async fn list_eligible_targets(&self) -> Result<Vec<RebalanceTarget>, RegistryError> {
        Ok(self.targets.read().clone())
    }

    async fn mark_rebalanced(
        &self,
        id: &TargetId,
        at: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let mut targets = self.targets.write();
        let target = targets
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        target.last_rebalanced_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::TargetKind;

    fn user(id: &str) -> RebalanceTarget {
        RebalanceTarget::new(id, TargetKind::UserDelegation)
    }

    #[tokio::test]
    async fn lists_in_insertion_order_including_disabled() {
        let registry = MemoryTargetRegistry::with_targets([
            user("0xb"),
            user("0xa").with_enabled(false),
            RebalanceTarget::new("3", TargetKind::MarketVault),
        ]);

        let listed = registry.list_eligible_targets().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["0xb", "0xa", "3"]);
        assert!(!listed[1].enabled);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let registry = MemoryTargetRegistry::new();
        registry.insert(user("0xa")).unwrap();
        assert!(matches!(
            registry.insert(user("0xA")),
            Err(RegistryError::AlreadyTracked(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn mark_rebalanced_sets_timestamp() {
        let registry = MemoryTargetRegistry::with_targets([user("0xa")]);
        let now = Utc::now();
        registry
            .mark_rebalanced(&TargetId::from("0xa"), now)
            .await
            .unwrap();
        assert_eq!(
            registry.get(&TargetId::from("0xa")).unwrap().last_rebalanced_at,
            Some(now)
        );
    }

    #[tokio::test]
    async fn mark_rebalanced_unknown_target_is_not_found() {
        let registry = MemoryTargetRegistry::new();
        let result = registry
            .mark_rebalanced(&TargetId::from("0xa"), Utc::now())
            .await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn set_enabled_and_remove() {
        let registry = MemoryTargetRegistry::with_targets([user("0xa")]);
        let id = TargetId::from("0xa");
        registry.set_enabled(&id, false).unwrap();
        assert!(!registry.get(&id).unwrap().enabled);
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
    }
}
