//! Operator wallet configuration.

use serde::Deserialize;

/// Operator wallet used to sign rebalance transactions.
/// Private key is loaded from `OPERATOR_PRIVATE_KEY` env var at runtime (never from config file).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletConfig {
    /// Optional keystore path for encrypted key storage.
    #[serde(default)]
    pub keystore_path: Option<String>,
    /// Private key loaded from `OPERATOR_PRIVATE_KEY` env var at runtime
    #[serde(skip)]
    pub private_key: Option<String>,
}

impl WalletConfig {
    /// True if a signing key is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.private_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}
