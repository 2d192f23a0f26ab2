//! Keeper lifecycle: long-running scheduler, one-shot passes and health
//! reporting.

pub mod health;
pub mod runtime;

pub use health::{health_check, HealthCheck, HealthReport, HealthStatus};
pub use runtime::{run, run_once, run_scheduler, run_with_shutdown};
