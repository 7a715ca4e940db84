//! Credential resolution and the token lifecycle.
//!
//! Token mutation is serialized by `mint_lock`; readers only take the state lock.

use crate::core::error::JqError;
use crate::core::params::{Params, Request};

use super::constants::{ENV_PASSWORD, ENV_USERNAME, METHOD_GET_CURRENT_TOKEN, METHOD_GET_TOKEN};
use super::dispatch::Reply;

impl super::JqClient {
    /// Exchange credentials for a fresh token and hold it for later calls.
    ///
    /// Explicit `username` / `password` replace the held credentials for this and every
    /// later mint, until changed again or [`JqClient::logout`](super::JqClient::logout).
    ///
    /// # Errors
    /// `MissingCredentials` when no account is configured, `Auth` when the service
    /// rejects it, and any transport or API error otherwise.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, password), err))]
    pub async fn mint_token(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, JqError> {
        self.mint_explicit(METHOD_GET_TOKEN, username, password).await
    }

    /// Like [`mint_token`](Self::mint_token) but asks for the account's currently live
    /// token, which the service only replaces when it has expired.
    ///
    /// # Errors
    /// Same as [`mint_token`](Self::mint_token).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, password), err))]
    pub async fn current_token(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, JqError> {
        self.mint_explicit(METHOD_GET_CURRENT_TOKEN, username, password)
            .await
    }

    /// Log in with the given account and mint a token.
    ///
    /// # Errors
    /// Same as [`mint_token`](Self::mint_token).
    pub async fn auth(&self, username: &str, password: &str) -> Result<(), JqError> {
        self.mint_token(Some(username), Some(password)).await?;
        Ok(())
    }

    /// The held token, if any. Never touches the network.
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    /// Forget the held credentials and token.
    ///
    /// The next call that needs a token mints one with credentials resolved from
    /// configuration, unless new ones are supplied first.
    pub async fn logout(&self) {
        let _guard = self.mint_lock.lock().await;
        let mut state = self.state.write().await;
        state.username = None;
        state.password = None;
        state.token = None;
    }

    /// Return the held token, minting one first if none is held.
    pub(crate) async fn ensure_token(&self) -> Result<String, JqError> {
        // Fast path: a token is already held.
        if let Some(token) = self.token().await {
            return Ok(token);
        }

        let _guard = self.mint_lock.lock().await;

        // Another task may have minted while this one waited.
        if let Some(token) = self.token().await {
            return Ok(token);
        }

        self.mint_locked(METHOD_GET_TOKEN).await
    }

    /// Replace a token the service rejected.
    ///
    /// When another task already replaced `stale`, the newer token is returned without
    /// minting again.
    pub(crate) async fn refresh_token(&self, stale: &str) -> Result<String, JqError> {
        let _guard = self.mint_lock.lock().await;

        {
            let mut state = self.state.write().await;
            match state.token.as_deref() {
                Some(current) if current != stale => return Ok(current.to_string()),
                // A rejected token is never handed out again.
                _ => state.token = None,
            }
        }

        self.mint_locked(METHOD_GET_TOKEN).await
    }

    pub(super) async fn mint_explicit(
        &self,
        method: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, JqError> {
        let _guard = self.mint_lock.lock().await;
        {
            let mut state = self.state.write().await;
            if let Some(u) = username {
                state.username = Some(u.to_string());
            }
            if let Some(p) = password {
                state.password = Some(p.to_string());
            }
        }
        self.mint_locked(method).await
    }

    /// Held value first, then configuration; never a mix of sources per field.
    async fn resolve_credentials(&self) -> Result<(String, String), JqError> {
        let state = self.state.read().await;
        let username = state
            .username
            .clone()
            .or_else(|| self.env(ENV_USERNAME))
            .ok_or(JqError::MissingCredentials(
                "username not supplied and JQDATA_USERNAME is unset",
            ))?;
        let password = state
            .password
            .clone()
            .or_else(|| self.env(ENV_PASSWORD))
            .ok_or(JqError::MissingCredentials(
                "password not supplied and JQDATA_PASSWORD is unset",
            ))?;
        Ok((username, password))
    }

    /// Mint and store a token. Caller must hold `mint_lock`.
    async fn mint_locked(&self, method: &str) -> Result<String, JqError> {
        let (username, password) = self.resolve_credentials().await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(method, "minting token");

        let params = Params::new().set("mob", username).set("pwd", password);
        let request = Request {
            method,
            token: None,
            params: &params,
        };

        let token = match self.exchange(&request, self.show_raw).await? {
            Reply::Ok(body) => body.trim().to_string(),
            // Rejected credentials. Mints are never retried.
            Reply::InvalidToken(msg) => return Err(JqError::Auth(msg)),
        };
        if token.is_empty() {
            return Err(JqError::Auth(format!("{method} returned an empty token")));
        }

        self.state.write().await.token = Some(token.clone());
        Ok(token)
    }
}
