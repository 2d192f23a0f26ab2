//! Rebalance use case: the scheduler and its per-target guard.

pub mod inflight;
pub mod scheduler;

pub use inflight::{InFlightGuard, InFlightTargets};
pub use scheduler::{RebalanceScheduler, SchedulerHandle, SchedulerSettings};
