//! Read-only contract queries.

use alloy_primitives::Address;
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use tracing::debug;

use super::classify::{classify, classify_payload};
use super::contracts::{PredictionMarket, RebalancerDelegation};
use super::units::{from_unix_seconds, from_usdc_units, market_id, user_address};
use super::endpoint::{parse_address, rpc_url};
use crate::domain::id::TargetId;
use crate::domain::snapshot::{DelegationConfig, MarketStatus, RiskProfile};
use crate::error::{ChainError, Result};
use crate::infrastructure::config::chain::ChainConfig;
use crate::infrastructure::retry::RetryPolicy;
use crate::port::ChainReader;

pub(super) fn contract_error(err: &alloy_contract::Error) -> ChainError {
    classify_payload(&err.to_string(), err.as_revert_data())
}

/// Chain reader over HTTP JSON-RPC.
pub struct EvmChainReader {
    provider: DynProvider,
    delegation: Address,
    market: Option<Address>,
    retry: RetryPolicy,
}

impl EvmChainReader {
    /// Build a reader for the configured contracts.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC url or a contract address is malformed.
    pub fn connect(config: &ChainConfig, retry: RetryPolicy) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect_http(rpc_url(&config.rpc_url)?)
            .erased();
        let delegation = parse_address("delegation_address", &config.delegation_address)?;
        let market = config
            .market_address
            .as_deref()
            .map(|addr| parse_address("market_address", addr))
            .transpose()?;

        Ok(Self {
            provider,
            delegation,
            market,
            retry,
        })
    }

    /// Chain id reported by the node.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the node cannot be reached.
    pub async fn chain_id(&self) -> std::result::Result<u64, ChainError> {
        let provider = &self.provider;
        self.retry
            .run("eth_chainId", move || async move {
                provider
                    .get_chain_id()
                    .await
                    .map_err(|e| classify(&e.to_string(), None))
            })
            .await
    }

    fn market_contract(&self, id: &TargetId) -> std::result::Result<Address, ChainError> {
        self.market.ok_or_else(|| ChainError::InvalidTarget {
            target: id.to_string(),
            reason: "no market contract configured".to_string(),
        })
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn get_delegation_config(
        &self,
        target_id: &TargetId,
    ) -> std::result::Result<DelegationConfig, ChainError> {
        let user = user_address(target_id)?;
        let contract = RebalancerDelegation::new(self.delegation, &self.provider);
        let contract = &contract;

        let config = self
            .retry
            .run("userConfigs", move || async move {
                contract
                    .userConfigs(user)
                    .call()
                    .await
                    .map_err(|e| contract_error(&e))
            })
            .await?;

        debug!(target = %target_id, risk_profile = config.riskProfile, "Delegation config read");
        Ok(DelegationConfig {
            enabled: config.enabled,
            risk_profile: RiskProfile::from(config.riskProfile),
            deposited_amount: from_usdc_units(config.depositedAmount),
        })
    }

    async fn get_market_status(
        &self,
        market: &TargetId,
    ) -> std::result::Result<MarketStatus, ChainError> {
        let id = market_id(market)?;
        let contract = PredictionMarket::new(self.market_contract(market)?, &self.provider);
        let contract = &contract;

        let status = self
            .retry
            .run("getMarketStatus", move || async move {
                contract
                    .getMarketStatus(id)
                    .call()
                    .await
                    .map_err(|e| contract_error(&e))
            })
            .await?;

        Ok(MarketStatus {
            active: status.active,
            resolved: status.resolved,
            end_time: from_unix_seconds(status.endTime),
            vault_balance: from_usdc_units(status.vaultBalance),
        })
    }
}
