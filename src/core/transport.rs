//! One POST exchange per call. No retry logic lives here; the dispatcher alone decides
//! whether a failure is recoverable.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::core::JqError;

/// Status code and undecoded body of one round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Convenience constructor for a response with a text body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into().into_bytes(),
        }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as UTF-8.
    ///
    /// # Errors
    /// Returns `JqError::Data` when the body is not valid UTF-8.
    pub fn text(&self) -> Result<&str, JqError> {
        std::str::from_utf8(&self.body)
            .map_err(|e| JqError::Data(format!("response body is not UTF-8: {e}")))
    }

    /// Map a non-success status to the matching transport error.
    pub(crate) fn status_error(&self, url: &str) -> JqError {
        let url = url.to_string();
        match self.status {
            429 => JqError::RateLimited { url },
            504 => JqError::ServerBusy { url },
            status @ 500..=599 => JqError::ServerError { status, url },
            status => JqError::Status { status, url },
        }
    }
}

/// Boxed future returned by [`Transport::send`].
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse, JqError>> + Send + 'a>>;

/// One request/response exchange with the JQData endpoint per call.
///
/// Implemented by [`HttpTransport`]; tests and embedders can substitute their own
/// implementation through [`crate::JqClientBuilder::transport`].
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send one serialized request body and return the raw response.
    ///
    /// Implementations return `Ok` for every response that was received, whatever its
    /// status; only failures to complete the exchange are errors.
    fn send(&self, body: Vec<u8>) -> SendFuture<'_>;

    /// Endpoint description used in error messages.
    fn endpoint(&self) -> &str;
}

/// Default transport: JSON POST over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    url: Url,
}

impl HttpTransport {
    pub(crate) fn new(
        url: Url,
        timeout: Duration,
        connect_timeout: Option<Duration>,
        user_agent: &str,
    ) -> Result<Self, JqError> {
        let mut httpb = Client::builder().user_agent(user_agent).timeout(timeout);
        if let Some(ct) = connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        Ok(Self {
            http: httpb.build()?,
            url,
        })
    }

    /// The endpoint this transport posts to.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    fn map_send_error(&self, e: reqwest::Error) -> JqError {
        if e.is_timeout() {
            JqError::Timeout {
                url: self.url.to_string(),
            }
        } else {
            JqError::Http(e)
        }
    }
}

impl Transport for HttpTransport {
    fn send(&self, body: Vec<u8>) -> SendFuture<'_> {
        Box::pin(async move {
            let resp = self
                .http
                .post(self.url.clone())
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(body)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            let status = resp.status().as_u16();
            let body = resp.bytes().await.map_err(|e| self.map_send_error(e))?;

            Ok(RawResponse {
                status,
                body: body.to_vec(),
            })
        })
    }

    fn endpoint(&self) -> &str {
        self.url.as_str()
    }
}
