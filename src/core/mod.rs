//! Core components of the `jqdata-rs` client.
//!
//! This module contains the protocol core every typed query sits on:
//! - The main [`JqClient`] and its builder, owning the session and token lifecycle.
//! - The primary [`JqError`] type.
//! - The transport, the response classifier and the request parameter model.
//! - The open-ended remote method surface and its payload shaping rules.

/// Response classification by error sentinel and invalid-token patterns.
pub mod classify;
/// The main client (`JqClient`), builder, session and dispatcher.
pub mod client;
/// Canonical date/time parsing and wire formatting.
pub mod dates;
/// The primary error type (`JqError`) for the crate.
pub mod error;
/// Dynamic method surface and payload shaping.
pub mod methods;
/// Request parameters and wire serialization.
pub mod params;
/// The transport trait and its HTTP implementation.
pub mod transport;

#[cfg(feature = "dataframe")]
pub mod dataframe;

// convenient re-exports so most code can just `use crate::core::JqClient`
pub use client::{EnvLookup, JqClient, JqClientBuilder};
pub use dates::DateLike;
pub use error::JqError;
pub use methods::{MethodCall, Payload, Shape};
pub use params::{ParamValue, Params};
pub use transport::{HttpTransport, RawResponse, Transport};
