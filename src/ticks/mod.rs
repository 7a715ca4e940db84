//! Tick snapshots: latest ticks and tick history.

mod model;

pub use model::{BOOK_DEPTH, Level, Tick};

use std::collections::BTreeMap;

use futures::future::try_join_all;

use crate::core::dates::{DateLike, now_shanghai, opt_datetime};
use crate::core::{JqClient, JqError, Params};
use crate::securities::{IntoCodes, require_codes};
use crate::table::{Table, parse_delimited_text};

use model::TICK_SCHEMA;

fn decode_ticks(table: &Table) -> Result<Vec<Tick>, JqError> {
    table.rows().map(|r| Tick::from_row(&r)).collect()
}

/// Latest tick of one code; `None` when the service returns no rows.
///
/// # Errors
/// `InvalidParams` for an empty code; any dispatch or decoding error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_current_tick(client: &JqClient, code: &str) -> Result<Option<Tick>, JqError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(JqError::InvalidParams("security is required".into()));
    }
    let body = client
        .call("get_current_tick", &Params::new().set("code", code))
        .await?;
    let table = parse_delimited_text(&body, Some(TICK_SCHEMA))?;
    table.row(0).map(|r| Tick::from_row(&r)).transpose()
}

/// Latest ticks of several codes in one request, keyed by the `code` column.
///
/// # Errors
/// `InvalidParams` for an empty code list; `Data` when a row lacks its code.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_current_ticks(
    client: &JqClient,
    codes: impl IntoCodes,
) -> Result<BTreeMap<String, Tick>, JqError> {
    let codes = require_codes(codes, "security")?;
    let body = client
        .call("get_current_ticks", &Params::new().set("code", codes.join(",")))
        .await?;
    let table = parse_delimited_text(&body, Some(TICK_SCHEMA))?;
    table
        .rows()
        .map(|r| {
            let code = r
                .str("code")
                .ok_or_else(|| JqError::Data(format!("tick row {} has no code", r.index() + 1)))?;
            Ok((code.to_string(), Tick::from_row(&r)?))
        })
        .collect()
}

/// Latest traded price of each code, one request for all of them.
///
/// # Errors
/// `InvalidParams` for an empty code list; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_last_price(client: &JqClient, codes: impl IntoCodes) -> Result<Table, JqError> {
    let codes = require_codes(codes, "security")?;
    client
        .fetch_shaped("get_last_price", Params::new().set("code", codes.join(",")))
        .await?
        .into_table()
}

/// Start a tick-history request.
pub fn get_ticks(client: &JqClient, codes: impl IntoCodes) -> TicksBuilder {
    TicksBuilder::new(client, codes)
}

/// A builder for tick history: either the last `count` ticks up to the end time, or
/// every tick from a start time to the end time.
///
/// The end time defaults to now in Shanghai; without start or count the window starts
/// at midnight of the end date. Each code is fetched concurrently.
#[derive(Debug, Clone)]
pub struct TicksBuilder {
    client: JqClient,
    codes: Vec<String>,
    start: Option<DateLike>,
    end: Option<DateLike>,
    count: Option<usize>,
    skip: bool,
    fields: Vec<String>,
}

impl TicksBuilder {
    /// Create a builder for the given codes.
    pub fn new(client: &JqClient, codes: impl IntoCodes) -> Self {
        Self {
            client: client.clone(),
            codes: codes.into_codes(),
            start: None,
            end: None,
            count: None,
            skip: true,
            fields: Vec::new(),
        }
    }

    /// Window start. Exclusive with [`TicksBuilder::count`].
    pub fn start_dt(mut self, start: impl Into<DateLike>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Window end (inclusive).
    pub fn end_dt(mut self, end: impl Into<DateLike>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Number of ticks ending at the end time. Exclusive with [`TicksBuilder::start_dt`].
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Skip snapshots without trades. (Default: `true`)
    pub fn skip(mut self, yes: bool) -> Self {
        self.skip = yes;
        self
    }

    /// Columns to keep in [`TicksBuilder::fetch_table`]; all when empty.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    async fn fetch_tables(&self) -> Result<Vec<(String, Table)>, JqError> {
        require_codes(self.codes.as_slice(), "security")?;
        if self.start.is_some() && self.count.is_some() {
            return Err(JqError::InvalidParams(
                "start_dt and count are mutually exclusive".into(),
            ));
        }
        if self.count == Some(0) {
            return Err(JqError::InvalidParams("count must be greater than 0".into()));
        }
        let end = opt_datetime(self.end.as_ref())?.unwrap_or_else(now_shanghai);
        let (method, window) = match self.count {
            Some(count) => ("get_ticks", Params::new().set("count", count)),
            None => {
                let start = opt_datetime(self.start.as_ref())?
                    .unwrap_or_else(|| end.date().and_time(chrono::NaiveTime::MIN));
                ("get_ticks_period", Params::new().set("date", start))
            }
        };

        let futures = self.codes.iter().map(|code| {
            let mut params = window.clone();
            params.insert("code", Some(code.into()));
            params.insert("end_date", Some(end.into()));
            params.insert("skip", Some(self.skip.into()));
            async move {
                let body = self.client.call(method, &params).await?;
                let table = parse_delimited_text(&body, Some(TICK_SCHEMA))?;
                Ok::<_, JqError>((code.clone(), table))
            }
        });
        try_join_all(futures).await
    }

    /// Execute and return the ticks of each code, keyed by code.
    ///
    /// # Errors
    /// `InvalidParams` for an empty code list, both start and count, a zero count or a
    /// bad time (before any request); any dispatch or decoding error otherwise.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(codes = ?self.codes), err))]
    pub async fn fetch(self) -> Result<BTreeMap<String, Vec<Tick>>, JqError> {
        self.fetch_tables()
            .await?
            .into_iter()
            .map(|(code, table)| Ok((code, decode_ticks(&table)?)))
            .collect()
    }

    /// Execute and return one table with a leading `code` column, codes in request order.
    ///
    /// # Errors
    /// As [`TicksBuilder::fetch`], plus `InvalidParams` for an unknown field.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(codes = ?self.codes), err))]
    pub async fn fetch_table(self) -> Result<Table, JqError> {
        let mut out = Table::default();
        for (code, table) in self.fetch_tables().await? {
            let table = if self.fields.is_empty() || table.columns().is_empty() {
                table
            } else {
                let mut names = vec!["time"];
                names.extend(self.fields.iter().map(String::as_str).filter(|f| *f != "time"));
                table.select(&names)?
            };
            out.append(table.with_key_column("code", &code))?;
        }
        Ok(out)
    }
}
