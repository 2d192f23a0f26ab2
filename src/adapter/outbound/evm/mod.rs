//! EVM JSON-RPC adapter for the rebalancer contracts.

mod classify;
mod contracts;
mod endpoint;
mod nonce;
mod reader;
mod units;
mod writer;

pub use classify::{broadcast_may_have_landed, classify, classify_payload, revert_reason};
pub use nonce::{NonceLease, NonceManager};
pub use reader::EvmChainReader;
pub use units::{from_usdc_units, market_id, user_address, USDC_DECIMALS};
pub use writer::EvmChainWriter;
