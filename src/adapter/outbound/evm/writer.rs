//! Operator-signed rebalance transactions.
//!
//! Each call goes through three steps:
//! 1. `eth_call` dry run; a revert here is reported without spending gas
//! 2. sign locally and broadcast under a [`NonceLease`](super::nonce::NonceLease)
//! 3. poll for the receipt outside the lease, bounded by the confirmation timeout
//!
//! The hash is known before broadcast, so an ambiguous send still reports
//! which transaction may land.

use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use alloy_provider::network::{Ethereum, EthereumWallet, Network, TransactionBuilder};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::classify::{broadcast_may_have_landed, classify, classify_payload};
use super::contracts::{PredictionMarket, RebalancerDelegation};
use super::endpoint::{parse_address, rpc_url};
use super::nonce::NonceManager;
use super::units::{market_id, user_address};
use crate::domain::outcome::TransactionResult;
use crate::domain::target::{RebalanceTarget, TargetKind};
use crate::error::{ChainError, ConfigError, Result};
use crate::infrastructure::config::chain::ChainConfig;
use crate::infrastructure::config::settings::OPERATOR_KEY_ENV;
use crate::infrastructure::retry::RetryPolicy;
use crate::port::ChainWriter;

type TxRequest = <Ethereum as Network>::TransactionRequest;
type TxReceipt = <Ethereum as Network>::ReceiptResponse;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Chain writer that owns the operator key.
pub struct EvmChainWriter {
    provider: DynProvider,
    wallet: EthereumWallet,
    operator: Address,
    delegation: Address,
    market: Option<Address>,
    chain_id: u64,
    gas_limit: u64,
    confirmations: u64,
    confirmation_timeout: Duration,
    poll_interval: Duration,
    retry: RetryPolicy,
    nonces: NonceManager,
}

impl EvmChainWriter {
    /// Build a writer signing with `private_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key, RPC url or a contract address is malformed.
    pub fn connect(config: &ChainConfig, private_key: &str, retry: RetryPolicy) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(rpc_url(&config.rpc_url)?)
            .erased();
        Self::with_provider(provider, config, private_key, retry)
    }

    fn with_provider(
        provider: DynProvider,
        config: &ChainConfig,
        private_key: &str,
        retry: RetryPolicy,
    ) -> Result<Self> {
        if private_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: OPERATOR_KEY_ENV,
            }
            .into());
        }
        let signer =
            PrivateKeySigner::from_str(private_key.trim()).map_err(|e| ConfigError::InvalidValue {
                field: OPERATOR_KEY_ENV,
                reason: e.to_string(),
            })?;
        let operator = signer.address();

        Ok(Self {
            provider,
            wallet: EthereumWallet::from(signer),
            operator,
            delegation: parse_address("delegation_address", &config.delegation_address)?,
            market: config
                .market_address
                .as_deref()
                .map(|addr| parse_address("market_address", addr))
                .transpose()?,
            chain_id: config.chain_id,
            gas_limit: config.gas_limit,
            confirmations: config.required_confirmations.max(1),
            confirmation_timeout: config.confirmation_timeout(),
            poll_interval: RECEIPT_POLL_INTERVAL,
            retry,
            nonces: NonceManager::new(),
        })
    }

    /// Override how often the receipt is polled.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Address derived from the operator key.
    #[must_use]
    pub fn operator(&self) -> Address {
        self.operator
    }

    fn request(&self, target: &RebalanceTarget) -> std::result::Result<TxRequest, ChainError> {
        let (to, input) = match target.kind {
            TargetKind::UserDelegation => {
                let user = user_address(&target.id)?;
                (
                    self.delegation,
                    RebalancerDelegation::rebalanceCall { user }.abi_encode(),
                )
            }
            TargetKind::MarketVault => {
                let market = self.market.ok_or_else(|| ChainError::InvalidTarget {
                    target: target.id.to_string(),
                    reason: "no market contract configured".to_string(),
                })?;
                let id = market_id(&target.id)?;
                (
                    market,
                    PredictionMarket::rebalanceMarketVaultCall { marketId: id }.abi_encode(),
                )
            }
        };

        Ok(TxRequest::default()
            .with_from(self.operator)
            .with_to(to)
            .with_input(input)
            .with_chain_id(self.chain_id))
    }

    async fn simulate(&self, request: &TxRequest) -> std::result::Result<(), ChainError> {
        let provider = &self.provider;
        self.retry
            .run("eth_call", move || {
                let tx = request.clone();
                async move {
                    provider.call(tx).await.map(|_| ()).map_err(|e| {
                        let data = e.as_error_resp().and_then(|payload| payload.as_revert_data());
                        classify_payload(&e.to_string(), data)
                    })
                }
            })
            .await
    }

    async fn gas_price(&self) -> std::result::Result<u128, ChainError> {
        let provider = &self.provider;
        self.retry
            .run("eth_gasPrice", move || async move {
                provider
                    .get_gas_price()
                    .await
                    .map_err(|e| classify(&e.to_string(), None))
            })
            .await
    }

    async fn fetch_nonce(&self) -> std::result::Result<u64, ChainError> {
        let provider = &self.provider;
        let operator = self.operator;
        self.retry
            .run("eth_getTransactionCount", move || async move {
                provider
                    .get_transaction_count(operator)
                    .pending()
                    .await
                    .map_err(|e| classify(&e.to_string(), None))
            })
            .await
    }

    /// Poll until the receipt has enough confirmations. `None` on timeout.
    ///
    /// A reverted receipt is returned as soon as it is seen.
    async fn wait_for_receipt(&self, hash: TxHash) -> Option<TxReceipt> {
        let provider = &self.provider;
        let confirmations = self.confirmations;
        let poll = self.poll_interval;

        let watch = async move {
            loop {
                match provider.get_transaction_receipt(hash).await {
                    Ok(Some(receipt)) => {
                        if !receipt.status() || confirmations <= 1 {
                            return receipt;
                        }
                        match (receipt.block_number, provider.get_block_number().await) {
                            (Some(mined), Ok(head))
                                if head.saturating_add(1) >= mined.saturating_add(confirmations) =>
                            {
                                return receipt;
                            }
                            (None, _) => return receipt,
                            _ => {}
                        }
                    }
                    Ok(None) => {}
                    Err(e) => debug!(tx_hash = ?hash, error = %e, "Receipt poll failed"),
                }
                sleep(poll).await;
            }
        };

        timeout(self.confirmation_timeout, watch).await.ok()
    }
}

#[async_trait]
impl ChainWriter for EvmChainWriter {
    async fn rebalance(
        &self,
        target: &RebalanceTarget,
    ) -> std::result::Result<TransactionResult, ChainError> {
        let request = self.request(target)?;

        match self.simulate(&request).await {
            Ok(()) => {}
            Err(ChainError::Revert { reason }) => {
                debug!(target = %target.id, reason = %reason, "Rebalance dry run reverted");
                return Ok(TransactionResult::Reverted {
                    reason,
                    tx_hash: None,
                });
            }
            Err(e) => return Err(e),
        }

        let gas_price = self.gas_price().await?;

        let hash = {
            let lease = self.nonces.lease(|| self.fetch_nonce()).await?;
            let envelope = request
                .with_nonce(lease.nonce())
                .with_gas_limit(self.gas_limit)
                .with_gas_price(gas_price)
                .build(&self.wallet)
                .await
                .map_err(|e| ChainError::Rpc(format!("failed to sign rebalance transaction: {e}")))?;
            let hash = *envelope.tx_hash();

            let attempts = AtomicU32::new(0);
            let attempts_ref = &attempts;
            let envelope = &envelope;
            let provider = &self.provider;

            let sent = self
                .retry
                .run("eth_sendRawTransaction", move || {
                    attempts_ref.fetch_add(1, Ordering::SeqCst);
                    let envelope = envelope.clone();
                    async move {
                        provider.send_tx_envelope(envelope).await.map(|_| ()).map_err(|e| {
                            let data =
                                e.as_error_resp().and_then(|payload| payload.as_revert_data());
                            classify_payload(&e.to_string(), data)
                        })
                    }
                })
                .await;

            match sent {
                Ok(()) => lease.commit(),
                Err(e) if broadcast_may_have_landed(&e, attempts.load(Ordering::SeqCst) > 1) => {
                    lease.invalidate();
                    warn!(
                        target = %target.id,
                        tx_hash = ?hash,
                        error = %e,
                        "Broadcast outcome unclear, transaction may be pending"
                    );
                    return Ok(TransactionResult::Timeout {
                        tx_hash: format!("{hash:?}"),
                    });
                }
                Err(ChainError::Revert { reason }) => {
                    lease.invalidate();
                    return Ok(TransactionResult::Reverted {
                        reason,
                        tx_hash: None,
                    });
                }
                Err(e) => {
                    lease.invalidate();
                    return Err(e);
                }
            }
            hash
        };

        let tx_hash = format!("{hash:?}");
        info!(target = %target.id, tx_hash = %tx_hash, "Rebalance transaction sent");

        match self.wait_for_receipt(hash).await {
            Some(receipt) if receipt.status() => Ok(TransactionResult::Confirmed { tx_hash }),
            Some(_) => Ok(TransactionResult::Reverted {
                reason: "transaction reverted on-chain".to_string(),
                tx_hash: Some(tx_hash),
            }),
            None => {
                warn!(target = %target.id, tx_hash = %tx_hash, "No receipt before timeout");
                Ok(TransactionResult::Timeout { tx_hash })
            }
        }
    }
}
