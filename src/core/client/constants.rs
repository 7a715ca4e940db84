//! Centralized constants for endpoints, environment keys and protocol markers.

use std::time::Duration;

/// Public JQData HTTP endpoint.
pub(crate) const DEFAULT_URL: &str = "https://dataapi.joinquant.com/apis";

/// Per round-trip timeout when the builder does not set one.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) const USER_AGENT: &str = concat!("jqdata-rs/", env!("CARGO_PKG_VERSION"));

/// Environment key overriding the endpoint URL.
pub(crate) const ENV_URL: &str = "JQDATA_URL";
/// Environment key holding the default account (mobile number).
pub(crate) const ENV_USERNAME: &str = "JQDATA_USERNAME";
/// Environment key holding the default password.
pub(crate) const ENV_PASSWORD: &str = "JQDATA_PASSWORD";

/// Mints a fresh token for the account.
pub(crate) const METHOD_GET_TOKEN: &str = "get_token";
/// Returns the account's currently valid token, minting only if none is live.
pub(crate) const METHOD_GET_CURRENT_TOKEN: &str = "get_current_token";

/// Methods that exchange credentials for a token and therefore never carry one.
pub(crate) fn is_mint_method(method: &str) -> bool {
    method == METHOD_GET_TOKEN || method == METHOD_GET_CURRENT_TOKEN
}
