//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! to implement the keeper's use cases.

pub mod rebalance;
