//! SQLite persistence adapters.
//!
//! Provides the SQLite-backed target registry and pass history using
//! Diesel ORM.

pub mod database;
pub mod recorder;
pub mod registry;

pub use database::connection::{create_pool, open, run_migrations, DbPool};
pub use recorder::SqlitePassRecorder;
pub use registry::SqliteTargetRegistry;
