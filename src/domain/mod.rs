//! Domain types for the rebalance keeper.
//!
//! Everything here is plain data plus pure functions. I/O lives behind the
//! ports in [`crate::port`].

pub mod eligibility;
pub mod error;
pub mod id;
pub mod outcome;
pub mod pass;
pub mod report;
pub mod snapshot;
pub mod target;
