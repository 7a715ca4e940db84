//! jqdata-rs: async client for the JQData (JoinQuant) HTTP data API.
//!
//! Every call is one JSON `POST` carrying a `method` name, a session `token` and
//! keyword parameters; replies are plain text. The client mints the token on first
//! use, re-authenticates once when the service reports it invalid, and turns replies
//! into typed values.
//!
//! ```no_run
//! # async fn demo() -> Result<(), jqdata_rs::JqError> {
//! use jqdata_rs::{JqClient, Params};
//!
//! let client = JqClient::builder().credentials("13800000000", "secret").build()?;
//!
//! // Typed wrappers validate arguments before any request.
//! let days = jqdata_rs::calendar::get_trade_days(&client, None, None, Some(5)).await?;
//! let bars = jqdata_rs::bars::get_bars(&client, "000001.XSHE", 10).fetch().await?;
//!
//! // Any `get_*` method or `run_query` is reachable by name.
//! let payload = client
//!     .method("get_index_stocks")?
//!     .param("code", "000300.XSHG")
//!     .param("date", "2021-06-01")
//!     .fetch()
//!     .await?;
//! # let _ = (days, bars, payload, Params::new());
//! # Ok(())
//! # }
//! ```

pub mod core;

/// Account quota.
pub mod account;
/// Historical bars.
pub mod bars;
/// Trading calendar.
pub mod calendar;
/// Financial tables, factors, fund information and table queries.
pub mod fundamentals;
/// Process-wide default client.
pub mod global;
/// Code lists: index, industry and concept constituents, margin lists, futures.
pub mod lists;
/// Market data tables.
pub mod market;
/// Security reference data and code normalization.
pub mod securities;
/// Decoding of comma-delimited payloads.
pub mod table;
/// Tick snapshots.
pub mod ticks;

pub use core::{
    DateLike, EnvLookup, HttpTransport, JqClient, JqClientBuilder, JqError, MethodCall,
    ParamValue, Params, Payload, RawResponse, Shape, Transport,
};

#[cfg(feature = "dataframe")]
pub use core::dataframe::ToDataFrame;

pub use account::{QuotaField, get_query_count};
pub use bars::{Bar, BarsBuilder, PriceBuilder};
pub use fundamentals::{Op, Query};
pub use securities::{IntoCodes, Security, normalize_code};
pub use table::{Cell, Column, ColumnData, ColumnType, Row, Table};
pub use ticks::{Level, Tick, TicksBuilder};
