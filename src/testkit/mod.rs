//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`chain`] - Scripted [`ChainReader`](crate::port::ChainReader) and
//!   [`ChainWriter`](crate::port::ChainWriter) fakes with call counters and
//!   per-target concurrency tracking.
//! - [`registry`] - Registry and recorder fakes for failure paths.
//! - [`domain`] - Builders for targets and on-chain state.

pub mod chain;
pub mod domain;
pub mod registry;
