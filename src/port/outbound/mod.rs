//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the keeper's infrastructure dependencies: the
//! target registry, the chain, and pass history storage.

pub mod chain;
pub mod recorder;
pub mod registry;
