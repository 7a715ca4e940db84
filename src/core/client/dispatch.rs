//! The request spine: attach a token, send, classify, and re-authenticate at most once.

use crate::core::classify::{Outcome, classify};
use crate::core::error::JqError;
use crate::core::params::{ParamValue, Params, Request};

use super::constants::is_mint_method;

/// A classified reply that is not an error for the caller yet.
pub(crate) enum Reply {
    Ok(String),
    InvalidToken(String),
}

impl super::JqClient {
    /// Invoke `method` with `params` and return the raw payload text.
    ///
    /// `get_token` / `get_current_token` are minting calls: they send the held
    /// credentials (or `mob` / `pwd` from `params`, which then replace them) and store
    /// the returned token, exactly like [`JqClient::mint_token`].
    ///
    /// Otherwise a token is minted first when none is held. If the service rejects the
    /// token, a new one is minted and the call is retried exactly once; a second
    /// rejection surfaces as `JqError::Auth`. Every other failure propagates unchanged.
    ///
    /// # Errors
    /// Transport errors, `Api` for rejected requests, `Auth` for authentication
    /// failures, and `MissingCredentials` when no account is configured.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, params), err))]
    pub async fn call(&self, method: &str, params: &Params) -> Result<String, JqError> {
        self.dispatch(method, params, self.show_raw).await
    }

    pub(crate) async fn dispatch(
        &self,
        method: &str,
        params: &Params,
        show_raw: bool,
    ) -> Result<String, JqError> {
        if is_mint_method(method) {
            // Named mints update the session like `mint_token`.
            let text = |key: &str| params.get(key).map(ParamValue::to_wire);
            let (username, password) = (text("mob"), text("pwd"));
            return self
                .mint_explicit(method, username.as_deref(), password.as_deref())
                .await;
        }
        let mut token = Some(self.ensure_token().await?);

        for attempt in 0..=1 {
            let request = Request {
                method,
                token: token.as_deref(),
                params,
            };
            match self.exchange(&request, show_raw).await? {
                Reply::Ok(body) => return Ok(body),
                Reply::InvalidToken(msg) if attempt == 0 => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(method, %msg, "token rejected; re-authenticating once");
                    #[cfg(not(feature = "tracing"))]
                    let _ = msg;

                    let stale = token.take().unwrap_or_default();
                    token = Some(self.refresh_token(&stale).await?);
                }
                Reply::InvalidToken(msg) => return Err(JqError::Auth(msg)),
            }
        }

        Err(JqError::Auth(format!(
            "{method} failed after re-authentication"
        )))
    }

    /// One round-trip: serialize, send, classify.
    ///
    /// The error sentinel wins over the HTTP status; a non-success status only matters
    /// when the body is not an error body.
    pub(crate) async fn exchange(
        &self,
        request: &Request<'_>,
        show_raw: bool,
    ) -> Result<Reply, JqError> {
        let body = request.to_body()?;
        let resp = self.transport.send(body).await?;
        let text = match resp.text() {
            Ok(text) => text,
            // An undecodable error page still reports its status.
            Err(_) if !resp.is_success() => {
                return Err(resp.status_error(self.transport.endpoint()));
            }
            Err(e) => return Err(e),
        };

        if show_raw {
            dump_raw(request, resp.status, text);
        }

        match classify(text) {
            Outcome::InvalidToken(msg) => Ok(Reply::InvalidToken(msg)),
            Outcome::ApplicationError(msg) => Err(JqError::Api(msg)),
            Outcome::Ok(_) if !resp.is_success() => {
                Err(resp.status_error(self.transport.endpoint()))
            }
            Outcome::Ok(payload) => Ok(Reply::Ok(payload.to_string())),
        }
    }
}

fn dump_raw(request: &Request<'_>, status: u16, body: &str) {
    eprintln!("start show raw result {}", "-".repeat(20));
    eprintln!("request: {}", request.to_redacted_json());
    eprintln!("status: {status}");
    eprintln!("{body}");
    eprintln!("end show raw result {}", "-".repeat(20));
}
