//! Chain connection and contract configuration.

use std::time::Duration;

use serde::Deserialize;

/// Hedera testnet JSON-RPC relay.
pub const DEFAULT_RPC_URL: &str = "https://testnet.hashio.io/api";

/// Hedera testnet chain id.
pub const DEFAULT_CHAIN_ID: u64 = 296;

/// RebalancerDelegation deployment on Hedera testnet.
pub const DEFAULT_DELEGATION_ADDRESS: &str = "0x6D5f91cA52bdD5d3DAAb52D91fBfd7e7D253d64A";

/// Contracts and RPC endpoint the keeper talks to.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint. `RPC_URL` in the environment overrides it.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// RebalancerDelegation contract, used for user targets.
    #[serde(default = "default_delegation_address")]
    pub delegation_address: String,
    /// Prediction market contract, required only for market targets.
    #[serde(default)]
    pub market_address: Option<String>,
    /// Fixed gas limit for rebalance transactions.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// How long to wait for a receipt before reporting an unknown outcome.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: u64,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

const fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_delegation_address() -> String {
    DEFAULT_DELEGATION_ADDRESS.to_string()
}

const fn default_gas_limit() -> u64 {
    500_000
}

const fn default_confirmation_timeout_secs() -> u64 {
    120
}

const fn default_required_confirmations() -> u64 {
    1
}

impl ChainConfig {
    #[must_use]
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            delegation_address: default_delegation_address(),
            market_address: None,
            gas_limit: default_gas_limit(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            required_confirmations: default_required_confirmations(),
        }
    }
}
