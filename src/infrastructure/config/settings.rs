//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all keeper settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for sensitive values like `OPERATOR_PRIVATE_KEY`.
//!
//! # Example
//!
//! ```no_run
//! use rebalance_keeper::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use super::chain::ChainConfig;
use super::logging::LoggingConfig;
use super::registry::{RegistryBackend, RegistryConfig};
use super::retry::RetryConfig;
use super::scheduler::SchedulerConfig;
use super::wallet::WalletConfig;
use crate::domain::target::{RebalanceTarget, TargetKind};
use crate::error::{ConfigError, Result};

/// Environment variable holding the operator's hex private key.
pub const OPERATOR_KEY_ENV: &str = "OPERATOR_PRIVATE_KEY";

/// Environment variable overriding `[chain] rpc_url`.
pub const RPC_URL_ENV: &str = "RPC_URL";

const KEYSTORE_PASSWORD_ENV: &str = "KEEPER_KEYSTORE_PASSWORD";
const KEYSTORE_PASSWORD_FILE_ENV: &str = "KEEPER_KEYSTORE_PASSWORD_FILE";

/// Main keeper configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// RPC endpoint, contract addresses and transaction settings.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Pass cadence and parallelism.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Backoff for transient RPC failures.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Where rebalance targets come from.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Operator signing key.
    ///
    /// Private key is loaded from `OPERATOR_PRIVATE_KEY` environment variable.
    #[serde(default)]
    pub wallet: WalletConfig,
}

fn read_keystore_password() -> Result<String> {
    if let Ok(password) = std::env::var(KEYSTORE_PASSWORD_ENV) {
        return Ok(password);
    }
    if let Ok(path) = std::env::var(KEYSTORE_PASSWORD_FILE_ENV) {
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let password = contents.trim().to_string();
        if password.is_empty() {
            return Err(ConfigError::MissingField {
                field: KEYSTORE_PASSWORD_FILE_ENV,
            }
            .into());
        }
        return Ok(password);
    }

    Err(ConfigError::MissingField {
        field: KEYSTORE_PASSWORD_ENV,
    }
    .into())
}

#[cfg(feature = "evm")]
fn decrypt_keystore_private_key(path: &str, password: &str) -> Result<String> {
    use alloy_signer_local::PrivateKeySigner;

    let signer = PrivateKeySigner::decrypt_keystore(path, password).map_err(|e| {
        ConfigError::InvalidValue {
            field: "keystore_path",
            reason: e.to_string(),
        }
    })?;
    Ok(format!("{:x}", signer.to_bytes()))
}

#[cfg(not(feature = "evm"))]
fn decrypt_keystore_private_key(_path: &str, _password: &str) -> Result<String> {
    Err(ConfigError::InvalidValue {
        field: "keystore_path",
        reason: "keystore support requires the evm feature".to_string(),
    }
    .into())
}

pub(crate) fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn positive(field: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: "must be greater than 0".to_string(),
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the private key from the `OPERATOR_PRIVATE_KEY` environment variable
    /// or decrypts it from a keystore file if `keystore_path` is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., zero concurrency)
    /// - Keystore decryption fails when using keystore authentication
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                config.chain.rpc_url = url;
            }
        }

        // Never from the config file.
        config.wallet.private_key = std::env::var(OPERATOR_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if config.wallet.private_key.is_none() {
            if let Some(ref keystore_path) = config.wallet.keystore_path {
                let password = read_keystore_password()?;
                config.wallet.private_key =
                    Some(decrypt_keystore_private_key(keystore_path, &password)?);
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let chain = &self.chain;
        if chain.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" }.into());
        }
        if url::Url::parse(&chain.rpc_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "rpc_url",
                reason: format!("not a valid url: {}", chain.rpc_url),
            }
            .into());
        }
        if !is_address(&chain.delegation_address) {
            return Err(ConfigError::InvalidValue {
                field: "delegation_address",
                reason: "must be a 0x-prefixed 20-byte hex address".to_string(),
            }
            .into());
        }
        if let Some(market) = &chain.market_address {
            if !is_address(market) {
                return Err(ConfigError::InvalidValue {
                    field: "market_address",
                    reason: "must be a 0x-prefixed 20-byte hex address".to_string(),
                }
                .into());
            }
        }
        if chain.gas_limit == 0 {
            return Err(positive("gas_limit").into());
        }
        if chain.confirmation_timeout_secs == 0 {
            return Err(positive("confirmation_timeout_secs").into());
        }
        if chain.required_confirmations == 0 {
            return Err(positive("required_confirmations").into());
        }

        if self.scheduler.interval_secs == 0 {
            return Err(positive("interval_secs").into());
        }
        if self.scheduler.concurrency == 0 {
            return Err(positive("concurrency").into());
        }

        let retry = &self.retry;
        if retry.max_attempts == 0 {
            return Err(positive("max_attempts").into());
        }
        if retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier",
                reason: "must be >= 1.0".to_string(),
            }
            .into());
        }
        if retry.max_backoff_ms < retry.initial_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "max_backoff_ms",
                reason: "must be >= initial_backoff_ms".to_string(),
            }
            .into());
        }

        match self.registry.backend {
            RegistryBackend::Sqlite => {
                if self.registry.database.trim().is_empty() {
                    return Err(ConfigError::MissingField { field: "database" }.into());
                }
            }
            RegistryBackend::Static => {
                self.static_targets()?;
            }
        }

        Ok(())
    }

    /// Parse `[[registry.targets]]` into domain targets.
    ///
    /// # Errors
    ///
    /// Returns an error if a target has an unknown kind or a malformed id.
    #[allow(clippy::result_large_err)]
    pub fn static_targets(&self) -> Result<Vec<RebalanceTarget>> {
        let mut targets = Vec::with_capacity(self.registry.targets.len());
        for entry in &self.registry.targets {
            let kind = TargetKind::from_str(&entry.kind)?;
            if kind == TargetKind::MarketVault && self.chain.market_address.is_none() {
                return Err(ConfigError::MissingField {
                    field: "market_address",
                }
                .into());
            }
            let target = RebalanceTarget::try_new(&entry.id, kind)?.with_enabled(entry.enabled);
            targets.push(target);
        }
        Ok(targets)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
