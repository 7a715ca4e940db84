//! Open-ended remote method surface.
//!
//! Any name starting with `get_`, plus `run_query`, is a remote method. Payloads are
//! optionally shaped by a fixed per-method rule; names without a rule decode as a table.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::Value;

use crate::core::client::is_mint_method;
use crate::core::params::{ParamValue, Params};
use crate::core::{JqClient, JqError};
use crate::table::{Table, parse_delimited_text};

/// Prefix shared by every dynamically dispatchable method.
pub const METHOD_PREFIX: &str = "get_";
/// The one dispatchable name outside the prefix rule.
pub const RUN_QUERY: &str = "run_query";

/// True when `name` is exposed by the method surface.
#[must_use]
pub fn is_remote_method(name: &str) -> bool {
    name.starts_with(METHOD_PREFIX) || name == RUN_QUERY
}

/// How a raw payload is turned into a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A single integer.
    Integer,
    /// A JSON document.
    Json,
    /// Whitespace-separated tokens, e.g. a list of security codes.
    Tokens,
    /// Comma-delimited text with a header row.
    Table,
}

static SHAPES: LazyLock<HashMap<&'static str, Shape>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert("get_query_count", Shape::Integer);
    m.insert("get_fund_info", Shape::Json);
    for name in [
        "get_index_stocks",
        "get_margincash_stocks",
        "get_marginsec_stocks",
        "get_industry_stocks",
        "get_concept_stocks",
        "get_trade_days",
        "get_all_trade_days",
        "get_future_contracts",
    ] {
        m.insert(name, Shape::Tokens);
    }
    m
});

/// The shaping rule for `method`; [`Shape::Table`] when none is registered.
#[must_use]
pub fn shape_for(method: &str) -> Shape {
    SHAPES.get(method).copied().unwrap_or(Shape::Table)
}

/// Apply `shape` to a raw payload.
///
/// # Errors
/// `Data` when an integer or table cannot be decoded, `Json` for malformed JSON.
pub fn apply_shape(shape: Shape, body: String) -> Result<Payload, JqError> {
    match shape {
        Shape::Integer => body
            .trim()
            .parse()
            .map(Payload::Integer)
            .map_err(|e| JqError::Data(format!("expected an integer payload, got '{}': {e}", body.trim()))),
        Shape::Json => Ok(Payload::Json(serde_json::from_str(&body)?)),
        Shape::Tokens => Ok(Payload::Tokens(
            body.split_whitespace().map(str::to_string).collect(),
        )),
        Shape::Table => Ok(Payload::Table(parse_delimited_text(&body, None)?)),
    }
}

/// Result of a remote method call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Unshaped payload text.
    Text(String),
    /// Integer payload.
    Integer(i64),
    /// JSON payload.
    Json(Value),
    /// Token list payload.
    Tokens(Vec<String>),
    /// Tabular payload.
    Table(Table),
}

impl Payload {
    fn mismatch(&self, want: &str) -> JqError {
        let got = match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Json(_) => "json",
            Self::Tokens(_) => "tokens",
            Self::Table(_) => "table",
        };
        JqError::Data(format!("expected a {want} payload, got {got}"))
    }

    /// The unshaped text.
    ///
    /// # Errors
    /// `Data` when the payload was shaped.
    pub fn into_text(self) -> Result<String, JqError> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    /// The integer value.
    ///
    /// # Errors
    /// `Data` for any other payload kind.
    pub fn into_integer(self) -> Result<i64, JqError> {
        match self {
            Self::Integer(i) => Ok(i),
            other => Err(other.mismatch("integer")),
        }
    }

    /// The JSON value.
    ///
    /// # Errors
    /// `Data` for any other payload kind.
    pub fn into_json(self) -> Result<Value, JqError> {
        match self {
            Self::Json(v) => Ok(v),
            other => Err(other.mismatch("json")),
        }
    }

    /// The token list.
    ///
    /// # Errors
    /// `Data` for any other payload kind.
    pub fn into_tokens(self) -> Result<Vec<String>, JqError> {
        match self {
            Self::Tokens(v) => Ok(v),
            other => Err(other.mismatch("tokens")),
        }
    }

    /// The table.
    ///
    /// # Errors
    /// `Data` for any other payload kind.
    pub fn into_table(self) -> Result<Table, JqError> {
        match self {
            Self::Table(t) => Ok(t),
            other => Err(other.mismatch("table")),
        }
    }
}

/// A pending call to one remote method. Created by [`JqClient::method`].
#[derive(Debug, Clone)]
pub struct MethodCall<'a> {
    client: &'a JqClient,
    name: String,
    params: Params,
    auto_format: Option<bool>,
    show_raw: Option<bool>,
}

impl JqClient {
    /// Look up a remote method by name.
    ///
    /// # Errors
    /// `UnknownMethod` when `name` neither starts with `get_` nor is `run_query`. No
    /// request is sent in that case.
    pub fn method(&self, name: &str) -> Result<MethodCall<'_>, JqError> {
        if !is_remote_method(name) {
            return Err(JqError::UnknownMethod(name.to_string()));
        }
        Ok(MethodCall {
            client: self,
            name: name.to_string(),
            params: Params::new(),
            auto_format: None,
            show_raw: None,
        })
    }

    /// Call a remote method by name with the client's default flags.
    ///
    /// # Errors
    /// See [`JqClient::method`] and [`MethodCall::fetch`].
    pub async fn query(&self, name: &str, params: Params) -> Result<Payload, JqError> {
        self.method(name)?.params(params).fetch().await
    }

    /// Call a remote method and always shape the payload, whatever the client flag says.
    pub(crate) async fn fetch_shaped(&self, name: &str, params: Params) -> Result<Payload, JqError> {
        self.method(name)?.params(params).auto_format(true).fetch().await
    }
}

impl MethodCall<'_> {
    /// The method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set one parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, Some(value.into()));
        self
    }

    /// Set one optional parameter; `None` keeps it off the wire.
    #[must_use]
    pub fn param_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.params.insert(key, value.map(Into::into));
        self
    }

    /// Replace all parameters.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Override the client's auto-format flag for this call.
    #[must_use]
    pub const fn auto_format(mut self, on: bool) -> Self {
        self.auto_format = Some(on);
        self
    }

    /// Override the client's show-raw flag for this call.
    #[must_use]
    pub const fn show_raw(mut self, on: bool) -> Self {
        self.show_raw = Some(on);
        self
    }

    /// Send the call and return the raw payload text, never shaped.
    ///
    /// # Errors
    /// Any error from [`JqClient::call`].
    pub async fn fetch_text(self) -> Result<String, JqError> {
        let show_raw = self.show_raw.unwrap_or(self.client.show_raw_enabled());
        self.client.dispatch(&self.name, &self.params, show_raw).await
    }

    /// Send the call; shape the payload when auto-format is on.
    ///
    /// # Errors
    /// Any error from [`JqClient::call`], or a shaping error.
    pub async fn fetch(self) -> Result<Payload, JqError> {
        let auto_format = self.auto_format.unwrap_or(self.client.auto_format_enabled());
        let shape = shape_for(&self.name);
        let is_mint = is_mint_method(&self.name);
        let text = self.fetch_text().await?;
        // A minted token is never shaped.
        if auto_format && !is_mint {
            apply_shape(shape, text)
        } else {
            Ok(Payload::Text(text))
        }
    }
}
