use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum JqError {
    /// The HTTP exchange failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A single round-trip exceeded the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// The endpoint that timed out.
        url: String,
    },

    /// The gateway timed out while the server was working on the query (HTTP 504).
    #[error("server busy at {url}: retry later or reduce the query size")]
    ServerBusy {
        /// The endpoint that returned the error.
        url: String,
    },

    /// The account exceeded the server's request rate (HTTP 429).
    #[error("rate limit exceeded at {url}: slow down and retry later")]
    RateLimited {
        /// The endpoint that returned the error.
        url: String,
    },

    /// The server returned a 5xx status other than 504.
    #[error("server error {status} at {url}")]
    ServerError {
        /// The HTTP status code.
        status: u16,
        /// The endpoint that returned the error.
        url: String,
    },

    /// The server returned a non-success status that has no dedicated variant.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The endpoint that returned the error.
        url: String,
    },

    /// The service understood the request but rejected it; the message is passed through verbatim.
    #[error("jqdata error: {0}")]
    Api(String),

    /// The session could not be (re-)authenticated.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// No username or password was supplied and none was found in the environment.
    #[error("missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// Local parameter validation failed; no request was sent.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The method name is not exposed by the remote method surface.
    #[error("no such method: {0}")]
    UnknownMethod(String),

    /// A payload could not be shaped into the requested form.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// A JSON payload or request could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The process-wide default client was used before `global::init` or `global::auth`.
    #[error("default client is not initialized; call global::init or global::auth first")]
    NotInitialized,
}

impl JqError {
    /// True for errors raised locally, before any request was sent.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidParams(_) | Self::MissingCredentials(_) | Self::UnknownMethod(_)
        )
    }
}
