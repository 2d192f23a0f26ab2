use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Failures of a single on-chain read or write.
///
/// Only [`ChainError::Transient`] is worth retrying. Everything else is
/// terminal for the target within the current pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Connection reset, request timeout, rate limit or a 5xx from the node.
    #[error("transient network error: {0}")]
    Transient(String),

    /// The contract rejected the call (e.g. `NotOperator`).
    #[error("contract reverted: {reason}")]
    Revert { reason: String },

    /// A transaction was broadcast but no receipt arrived in time.
    #[error("confirmation timed out for transaction {tx_hash}")]
    ConfirmationTimeout { tx_hash: String },

    /// The node answered with an error that retrying will not fix.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The target identifier cannot be turned into a contract argument.
    #[error("invalid target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
}

impl ChainError {
    /// True for errors the retry policy may try again.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// True for contract-level rejections.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Revert { .. })
    }
}

/// Target registry errors.
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    /// The backing store could not be reached; no pass can run without it.
    #[error("target registry unavailable: {0}")]
    Unavailable(String),

    #[error("target not found: {0}")]
    NotFound(String),

    #[error("target already tracked: {0}")]
    AlreadyTracked(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
