//! Configuration and readiness check handlers.

pub mod config;
pub mod health;
