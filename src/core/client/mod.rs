//! Public client surface + builder.
//! Internals are split into `auth` (credentials/token lifecycle), `dispatch` (the
//! request/retry spine) and `constants` (endpoint + protocol markers).

mod auth;
mod constants;
mod dispatch;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::core::JqError;
use crate::core::transport::{HttpTransport, Transport};
use constants::{DEFAULT_TIMEOUT, DEFAULT_URL, ENV_URL, USER_AGENT};

pub(crate) use constants::is_mint_method;

/// Reads process-wide configuration by key. Defaults to the process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

fn process_env() -> EnvLookup {
    Arc::new(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
}

/// Credentials and token shared by every clone of a client.
#[derive(Debug, Default)]
struct SessionState {
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
}

/// Client for the JQData HTTP API.
///
/// Clones are cheap and share one session: a token minted through any clone is used by
/// all of them.
///
/// ```no_run
/// # use jqdata_rs::{JqClient, Params};
/// # #[tokio::main]
/// # async fn main() -> Result<(), jqdata_rs::JqError> {
/// let client = JqClient::builder().credentials("13800000000", "secret").build()?;
/// let body = client
///     .call("get_security_info", &Params::new().set("code", "000001.XSHE"))
///     .await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JqClient {
    transport: Arc<dyn Transport>,
    state: Arc<RwLock<SessionState>>,
    mint_lock: Arc<Mutex<()>>,
    env: EnvLookup,
    auto_format: bool,
    show_raw: bool,
}

impl fmt::Debug for JqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JqClient")
            .field("endpoint", &self.transport.endpoint())
            .field("auto_format", &self.auto_format)
            .field("show_raw", &self.show_raw)
            .finish_non_exhaustive()
    }
}

impl Default for JqClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl JqClient {
    /// Create a new builder.
    pub fn builder() -> JqClientBuilder {
        JqClientBuilder::default()
    }

    /// Whether payloads are shaped by default (see [`crate::Payload`]).
    #[must_use]
    pub const fn auto_format_enabled(&self) -> bool {
        self.auto_format
    }

    /// Whether raw requests and responses are dumped to stderr by default.
    #[must_use]
    pub const fn show_raw_enabled(&self) -> bool {
        self.show_raw
    }

    /// Endpoint the transport talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub(crate) fn env(&self, key: &str) -> Option<String> {
        (self.env)(key)
    }
}

/* ----------------------- Builder ----------------------- */

/// Builder for [`JqClient`].
#[derive(Default)]
pub struct JqClientBuilder {
    url: Option<Url>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    username: Option<String>,
    password: Option<String>,
    auto_format: bool,
    show_raw: bool,
    transport: Option<Arc<dyn Transport>>,
    env: Option<EnvLookup>,
}

impl JqClientBuilder {
    /// Override the endpoint. Otherwise `JQDATA_URL`, then the public endpoint.
    #[must_use]
    pub fn url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Timeout applied to each round-trip. Default: 10 seconds.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Account used to mint tokens. Takes precedence over `JQDATA_USERNAME` / `JQDATA_PASSWORD`.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Shape payloads by method name unless a call says otherwise.
    #[must_use]
    pub const fn auto_format(mut self, on: bool) -> Self {
        self.auto_format = on;
        self
    }

    /// Dump raw requests and responses to stderr unless a call says otherwise.
    #[must_use]
    pub const fn show_raw(mut self, on: bool) -> Self {
        self.show_raw = on;
        self
    }

    /// Replace the HTTP transport. `url`, `timeout` and `user_agent` are then ignored.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replace the configuration lookup used for default credentials and URL.
    #[must_use]
    pub fn env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Some(Arc::new(lookup));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Fails when the endpoint URL is invalid or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<JqClient, JqError> {
        let env = self.env.unwrap_or_else(process_env);

        let transport: Arc<dyn Transport> = if let Some(t) = self.transport {
            t
        } else {
            let url = match self.url {
                Some(u) => u,
                None => Url::parse(env(ENV_URL).as_deref().unwrap_or(DEFAULT_URL))?,
            };
            Arc::new(HttpTransport::new(
                url,
                self.timeout.unwrap_or(DEFAULT_TIMEOUT),
                self.connect_timeout,
                self.user_agent.as_deref().unwrap_or(USER_AGENT),
            )?)
        };

        Ok(JqClient {
            transport,
            state: Arc::new(RwLock::new(SessionState {
                username: self.username,
                password: self.password,
                token: None,
            })),
            mint_lock: Arc::new(Mutex::new(())),
            env,
            auto_format: self.auto_format,
            show_raw: self.show_raw,
        })
    }
}
