//! Rebalance keeper: periodically triggers on-chain yield rebalancing for
//! delegated users and prediction-market vaults.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Targets, on-chain snapshots, the eligibility decision,
//!   per-target outcomes, passes and run reports. No I/O.
//! - [`port`] - Traits the application drives: [`port::TargetRegistry`],
//!   [`port::ChainReader`], [`port::ChainWriter`], [`port::PassRecorder`].
//! - [`application`] - The rebalance scheduler.
//! - [`adapter`] - SQLite and in-memory registries, pass history, the EVM
//!   chain adapter (`evm` feature) and the operator CLI.
//! - [`infrastructure`] - Configuration, retry policy, wiring and runtime.
//!
//! # Features
//!
//! - `evm` (default) - JSON-RPC chain adapter built on alloy
//! - `testkit` - Scripted fakes for integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
