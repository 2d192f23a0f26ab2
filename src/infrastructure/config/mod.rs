//! Infrastructure configuration modules.

pub mod chain;
pub mod logging;
pub mod registry;
pub mod retry;
pub mod scheduler;
pub mod settings;
pub mod wallet;
