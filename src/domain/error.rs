//! Domain validation errors for core domain types.
//!
//! These errors are returned when parsing or constructing domain values from
//! untrusted input (config files, CLI arguments, database rows).
//!
//! # Examples
//!
//! ```
//! use rebalance_keeper::domain::error::DomainError;
//! use rebalance_keeper::domain::target::TargetKind;
//!
//! let result: Result<TargetKind, DomainError> = "vault".parse();
//! assert!(matches!(result, Err(DomainError::UnknownTargetKind { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Target kind string is not one of the supported kinds.
    #[error("unknown target kind '{value}' (expected 'user' or 'market')")]
    UnknownTargetKind {
        /// The value that failed to parse.
        value: String,
    },

    /// Target identifier is empty.
    #[error("target id cannot be empty")]
    EmptyTargetId,

    /// User targets must be identified by a 20-byte hex address.
    #[error("'{value}' is not a valid wallet address")]
    InvalidAddress {
        /// The value that failed validation.
        value: String,
    },

    /// Market targets must be identified by a non-negative integer.
    #[error("'{value}' is not a valid market id")]
    InvalidMarketId {
        /// The value that failed validation.
        value: String,
    },
}
