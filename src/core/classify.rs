//! Decides what a received response body means.
//!
//! The sentinel decides, not the HTTP status: an `error:` body returned with status 200
//! is still an error.

use std::sync::LazyLock;

use regex::Regex;

/// Every error body starts with this marker.
pub const ERROR_SENTINEL: &str = "error:";

// The service answers in English or Chinese depending on the code path.
static INVALID_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(invalid\s+token)|(token\s+(is\s+)?expired)|(token.*无效)|(token.*过期)|(auth(entication)?\s+failed)|(认证失败)",
    )
    .expect("invalid token regex")
});

/// Classification of one response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    /// Success; the whole body is the payload.
    Ok(&'a str),
    /// The service rejected the request for a domain reason.
    ApplicationError(String),
    /// The token was rejected as invalid or expired.
    InvalidToken(String),
}

/// Classify a body by the sentinel prefix and the bilingual invalid-token patterns.
#[must_use]
pub fn classify(body: &str) -> Outcome<'_> {
    let Some(rest) = body.strip_prefix(ERROR_SENTINEL) else {
        return Outcome::Ok(body);
    };
    let message = rest.trim().to_string();
    if is_invalid_token_message(&message) {
        Outcome::InvalidToken(message)
    } else {
        Outcome::ApplicationError(message)
    }
}

/// True when an error message means the token is invalid or expired.
#[must_use]
pub fn is_invalid_token_message(message: &str) -> bool {
    INVALID_TOKEN_RE.is_match(message)
}
