//! Config-to-alloy conversions shared by the reader and writer.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::error::{ConfigError, Result};

pub(super) fn parse_address(field: &'static str, value: &str) -> Result<Address> {
    Address::from_str(value.trim()).map_err(|e| {
        ConfigError::InvalidValue {
            field,
            reason: e.to_string(),
        }
        .into()
    })
}

pub(super) fn rpc_url(value: &str) -> Result<url::Url> {
    Ok(value.trim().parse::<url::Url>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn address_error_names_field() {
        assert!(matches!(
            parse_address("market_address", "0x12"),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "market_address",
                ..
            }))
        ));
    }

    #[test]
    fn address_accepts_mixed_case() {
        assert!(parse_address("delegation_address", " 0x6D5f91cA52bdD5d3DAAb52D91fBfd7e7D253d64A ").is_ok());
    }

    #[test]
    fn rpc_url_rejects_garbage() {
        assert!(matches!(rpc_url("not a url"), Err(Error::Url(_))));
    }
}
