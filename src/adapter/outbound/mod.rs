//! Outbound adapters (driven side).

#[cfg(feature = "evm")]
pub mod evm;
pub mod memory;
pub mod sqlite;
