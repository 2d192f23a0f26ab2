//! Argument and amount conversions for contract calls.

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::id::TargetId;
use crate::error::ChainError;

/// Number of decimals for USDC token.
pub const USDC_DECIMALS: u32 = 6;

/// Convert USDC base units to decimal dollars.
#[must_use]
pub fn from_usdc_units(units: U256) -> Decimal {
    let int_val: u128 = units.try_into().unwrap_or(u128::MAX);
    let int_val = i128::try_from(int_val).unwrap_or(i128::MAX);
    Decimal::try_from_i128_with_scale(int_val, USDC_DECIMALS).unwrap_or(Decimal::MAX)
}

/// Parse a user target id into an address.
///
/// # Errors
///
/// Returns [`ChainError::InvalidTarget`] if the id is not a 20-byte hex address.
pub fn user_address(id: &TargetId) -> Result<Address, ChainError> {
    Address::from_str(id.as_str()).map_err(|e| ChainError::InvalidTarget {
        target: id.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a market target id into the contract's `uint256` market id.
///
/// # Errors
///
/// Returns [`ChainError::InvalidTarget`] if the id is not a decimal integer.
pub fn market_id(id: &TargetId) -> Result<U256, ChainError> {
    U256::from_str_radix(id.as_str(), 10).map_err(|e| ChainError::InvalidTarget {
        target: id.to_string(),
        reason: e.to_string(),
    })
}

/// Convert a unix timestamp in seconds to UTC.
#[must_use]
pub fn from_unix_seconds(secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn usdc_units_scale_by_six_decimals() {
        assert_eq!(from_usdc_units(U256::from(1_500_000u64)), dec!(1.5));
        assert_eq!(from_usdc_units(U256::ZERO), Decimal::ZERO);
        assert_eq!(from_usdc_units(U256::from(1u64)), dec!(0.000001));
    }

    #[test]
    fn oversized_amount_saturates() {
        assert_eq!(from_usdc_units(U256::MAX), Decimal::MAX);
    }

    #[test]
    fn parses_target_arguments() {
        let id = TargetId::from("0x6D5f91cA52bdD5d3DAAb52D91fBfd7e7D253d64A");
        assert!(user_address(&id).is_ok());
        assert_eq!(market_id(&TargetId::from("42")).unwrap(), U256::from(42u64));
        assert!(matches!(
            market_id(&TargetId::from("0xzz")),
            Err(ChainError::InvalidTarget { .. })
        ));
        assert!(matches!(
            user_address(&TargetId::from("bob")),
            Err(ChainError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn unix_seconds_convert() {
        assert_eq!(from_unix_seconds(0), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(from_unix_seconds(u64::MAX), DateTime::<Utc>::MAX_UTC);
    }
}
