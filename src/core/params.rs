//! Request parameters and their wire serialization.
//!
//! Every value travels as a string: dates as `YYYY-MM-DD`, datetimes as
//! `YYYY-MM-DD HH:MM:SS`, lists comma-joined. A parameter explicitly set to `None` is
//! omitted from the request body entirely.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::core::dates::{format_date, format_datetime};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Free text.
    Text(String),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean, sent as `true` / `false`.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Calendar date with time of day.
    DateTime(NaiveDateTime),
    /// A collection, sent comma-joined.
    List(Vec<String>),
}

impl ParamValue {
    /// The string this value is sent as.
    #[must_use]
    pub fn to_wire(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => format_date(*d),
            Self::DateTime(dt) => format_datetime(*dt),
            Self::List(items) => items.join(","),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for ParamValue {
            fn from(v: $t) -> Self {
                Self::Int(i64::from(v))
            }
        }
    )*};
}
impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Text(v.to_string()), Self::Int)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for ParamValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ParamValue {
    fn from(v: &[&str]) -> Self {
        Self::List(v.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<&[String]> for ParamValue {
    fn from(v: &[String]) -> Self {
        Self::List(v.to_vec())
    }
}

/// Ordered keyword parameters for one remote call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Option<ParamValue>)>,
}

impl Params {
    /// An empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any earlier value.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, Some(value.into()));
        self
    }

    /// Set `key` to an optional value; `None` keeps the key out of the request.
    #[must_use]
    pub fn set_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.insert(key, value.map(Into::into));
        self
    }

    /// In-place variant of [`Params::set_opt`].
    pub fn insert(&mut self, key: impl Into<String>, value: Option<ParamValue>) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Value of `key`, if set to a non-null value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Non-null entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.as_str(), v)))
    }

    /// True when no non-null entry is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// One logical request as it goes on the wire.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Request<'a> {
    pub(crate) method: &'a str,
    pub(crate) token: Option<&'a str>,
    pub(crate) params: &'a Params,
}

impl Request<'_> {
    /// JSON object: `method`, `token` when present, then every non-null parameter.
    pub(crate) fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("method".into(), Value::String(self.method.to_string()));
        if let Some(token) = self.token {
            obj.insert("token".into(), Value::String(token.to_string()));
        }
        for (k, v) in self.params.iter() {
            obj.insert(k.to_string(), Value::String(v.to_wire()));
        }
        Value::Object(obj)
    }

    /// Same as [`Request::to_json`] with the token masked, for diagnostics.
    pub(crate) fn to_redacted_json(&self) -> Value {
        let mut v = self.to_json();
        if let Some(obj) = v.as_object_mut() {
            for key in ["token", "pwd"] {
                if obj.contains_key(key) {
                    obj.insert(key.into(), Value::String("***".into()));
                }
            }
        }
        v
    }

    pub(crate) fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.to_json())
    }
}
