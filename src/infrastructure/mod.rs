//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, retry, composition and runtime lifecycle.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`orchestration`] - Runtime lifecycle and health reporting
//! - [`retry`] - Backoff policy for chain calls

pub mod bootstrap;
pub mod config;
pub mod orchestration;
pub mod retry;
