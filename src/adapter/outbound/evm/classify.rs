//! Mapping RPC and contract failures onto [`ChainError`].
//!
//! Node errors arrive as free-form strings; revert payloads arrive as ABI
//! bytes. Reverts are decoded against the known contract errors first, then
//! as a plain `Error(string)`.

use alloy_primitives::{hex, Bytes};
use alloy_sol_types::{Revert, SolError, SolInterface};

use super::contracts::PredictionMarket::PredictionMarketErrors;
use super::contracts::RebalancerDelegation::RebalancerDelegationErrors;
use crate::error::ChainError;

const REVERT_MARKERS: &[&str] = &["execution reverted", "revert"];

/// The node already holds a transaction with this exact hash.
const KNOWN_TX_MARKERS: &[&str] = &["already known", "known transaction", "already imported"];

const NONCE_TOO_LOW: &str = "nonce too low";

const TRANSIENT_MARKERS: &[&str] = &[
    "timed out",
    "timeout",
    "connection",
    "error sending request",
    "broken pipe",
    "too many requests",
    "rate limit",
    "temporarily unavailable",
    "429",
    "502",
    "503",
    "504",
];

/// Human-readable reason for a revert payload.
#[must_use]
pub fn revert_reason(data: &[u8]) -> String {
    if data.is_empty() {
        return "reverted without data".to_string();
    }
    if let Ok(err) = RebalancerDelegationErrors::abi_decode(data) {
        let name = match err {
            RebalancerDelegationErrors::NotOperator(_) => "NotOperator",
            RebalancerDelegationErrors::AutoRebalanceNotEnabled(_) => "AutoRebalanceNotEnabled",
            RebalancerDelegationErrors::NothingToRebalance(_) => "NothingToRebalance",
        };
        return name.to_string();
    }
    if let Ok(err) = PredictionMarketErrors::abi_decode(data) {
        let name = match err {
            PredictionMarketErrors::NotOperator(_) => "NotOperator",
            PredictionMarketErrors::MarketNotActive(_) => "MarketNotActive",
            PredictionMarketErrors::MarketAlreadyResolved(_) => "MarketAlreadyResolved",
        };
        return name.to_string();
    }
    if let Ok(revert) = Revert::abi_decode(data) {
        return revert.reason().to_string();
    }
    format!("0x{}", hex::encode(data))
}

/// Classify an error by its message, optionally with revert bytes.
#[must_use]
pub fn classify(message: &str, revert_data: Option<&[u8]>) -> ChainError {
    if let Some(data) = revert_data {
        return ChainError::Revert {
            reason: revert_reason(data),
        };
    }

    let lower = message.to_ascii_lowercase();
    if REVERT_MARKERS.iter().any(|m| lower.contains(m)) {
        return ChainError::Revert {
            reason: revert_reason_from_message(message),
        };
    }
    if TRANSIENT_MARKERS.iter().any(|m| lower.contains(m)) {
        return ChainError::Transient(message.to_string());
    }
    ChainError::Rpc(message.to_string())
}

/// [`classify`] for errors that carry an owned revert payload.
#[must_use]
pub fn classify_payload(message: &str, revert_data: Option<Bytes>) -> ChainError {
    classify(message, revert_data.as_ref().map(|data| &data[..]))
}

/// Whether a failed `eth_sendRawTransaction` may still have put the
/// transaction in the mempool.
///
/// "already known" always means it did. "nonce too low" only counts once an
/// earlier attempt of the same signed transaction could have reached the
/// node; on a first attempt it means the cached nonce was stale.
#[must_use]
pub fn broadcast_may_have_landed(error: &ChainError, retried: bool) -> bool {
    let ChainError::Rpc(message) = error else {
        return false;
    };
    let lower = message.to_ascii_lowercase();
    KNOWN_TX_MARKERS.iter().any(|m| lower.contains(m)) || (retried && lower.contains(NONCE_TOO_LOW))
}

/// Strip the node's "execution reverted:" prefix, keeping the reason.
fn revert_reason_from_message(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    match lower.find("execution reverted") {
        Some(pos) => {
            let rest = message[pos + "execution reverted".len()..]
                .trim_start_matches(':')
                .trim();
            if rest.is_empty() {
                "execution reverted".to_string()
            } else {
                rest.to_string()
            }
        }
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::evm::contracts::{PredictionMarket, RebalancerDelegation};

    #[test]
    fn decodes_delegation_custom_error() {
        let data = RebalancerDelegation::NotOperator {}.abi_encode();
        assert_eq!(revert_reason(&data), "NotOperator");

        let data = RebalancerDelegation::AutoRebalanceNotEnabled {}.abi_encode();
        assert_eq!(revert_reason(&data), "AutoRebalanceNotEnabled");
    }

    #[test]
    fn decodes_market_custom_error() {
        let data = PredictionMarket::MarketNotActive {}.abi_encode();
        assert_eq!(revert_reason(&data), "MarketNotActive");
    }

    #[test]
    fn decodes_plain_revert_string() {
        let data = Revert::from("insufficient vault balance").abi_encode();
        assert_eq!(revert_reason(&data), "insufficient vault balance");
    }

    #[test]
    fn unknown_payload_falls_back_to_hex() {
        assert_eq!(revert_reason(&[0xde, 0xad, 0xbe, 0xef]), "0xdeadbeef");
        assert_eq!(revert_reason(&[]), "reverted without data");
    }

    #[test]
    fn revert_data_wins_over_message() {
        let data = RebalancerDelegation::NotOperator {}.abi_encode();
        assert_eq!(
            classify("server returned an error response", Some(&data)),
            ChainError::Revert {
                reason: "NotOperator".into()
            }
        );
    }

    #[test]
    fn message_classification() {
        assert_eq!(
            classify("execution reverted: not enabled", None),
            ChainError::Revert {
                reason: "not enabled".into()
            }
        );
        assert!(classify("error sending request for url", None).is_transient());
        assert!(classify("HTTP error 503 Service Unavailable", None).is_transient());
        assert!(classify("request timed out", None).is_transient());
        assert_eq!(
            classify("nonce too low", None),
            ChainError::Rpc("nonce too low".into())
        );
    }

    #[test]
    fn owned_payload_is_decoded() {
        let data = Bytes::from(PredictionMarket::MarketAlreadyResolved {}.abi_encode());
        assert_eq!(
            classify_payload("server returned an error response", Some(data)),
            ChainError::Revert {
                reason: "MarketAlreadyResolved".into()
            }
        );
    }

    #[test]
    fn known_transaction_means_broadcast_landed() {
        for message in ["already known", "known transaction: 0xabc", "Transaction already imported"] {
            let err = classify(message, None);
            assert!(broadcast_may_have_landed(&err, false), "{message}");
        }
    }

    #[test]
    fn nonce_too_low_counts_only_after_a_retry() {
        let err = classify("nonce too low", None);
        assert!(!broadcast_may_have_landed(&err, false));
        assert!(broadcast_may_have_landed(&err, true));
        assert!(!broadcast_may_have_landed(
            &classify("insufficient funds for gas * price + value", None),
            true
        ));
        assert!(!broadcast_may_have_landed(
            &ChainError::Transient("already known".into()),
            true
        ));
    }
}
