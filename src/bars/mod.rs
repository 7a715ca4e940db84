//! Historical bars: `get_bars` per code and `get_price` over a window.

mod model;

pub use model::Bar;

use std::collections::BTreeMap;

use futures::future::try_join_all;

use crate::core::dates::{DateLike, now_shanghai, opt_date, opt_datetime};
use crate::core::{JqClient, JqError, Params};
use crate::securities::{IntoCodes, require_codes};
use crate::table::{Table, parse_delimited_text};

use model::BAR_SCHEMA;

/// Default start of a `get_price` window when neither start nor count is given.
const DEFAULT_PRICE_START: &str = "2015-01-01";
const DEFAULT_PRICE_FIELDS: &[&str] = &["open", "close", "high", "low", "volume", "money"];

/// Map the long frequency names to the service's unit codes (`daily` → `1d`,
/// `minute` → `1m`); other units pass through.
#[must_use]
pub fn normalize_unit(unit: &str) -> String {
    match unit.trim() {
        "daily" => "1d".to_string(),
        "minute" => "1m".to_string(),
        other => other.to_string(),
    }
}

fn decode_bars(table: &Table) -> Result<Vec<Bar>, JqError> {
    table.rows().map(|r| Bar::from_row(&r)).collect()
}

/// Columns to keep: the leading key columns, then `fields` without repeats.
fn projection<'a>(lead: &[&'a str], fields: &'a [String]) -> Vec<&'a str> {
    let mut out: Vec<&str> = lead.to_vec();
    for f in fields {
        if !out.contains(&f.as_str()) {
            out.push(f);
        }
    }
    out
}

/// Start a `get_bars` request for one or more codes.
pub fn get_bars(client: &JqClient, codes: impl IntoCodes, count: usize) -> BarsBuilder {
    BarsBuilder::new(client, codes, count)
}

/// Start a `get_price` request for one code.
pub fn get_price(client: &JqClient, code: impl Into<String>) -> PriceBuilder {
    PriceBuilder::new(client, code)
}

/// A builder for the most recent `count` bars of each code.
///
/// Each code is fetched with its own request; requests run concurrently.
#[derive(Debug, Clone)]
pub struct BarsBuilder {
    client: JqClient,
    codes: Vec<String>,
    count: usize,
    unit: String,
    end_dt: Option<DateLike>,
    fq_ref_date: Option<DateLike>,
    include_now: bool,
    fields: Vec<String>,
}

impl BarsBuilder {
    /// Create a builder for `count` daily bars per code.
    pub fn new(client: &JqClient, codes: impl IntoCodes, count: usize) -> Self {
        Self {
            client: client.clone(),
            codes: codes.into_codes(),
            count,
            unit: "1d".to_string(),
            end_dt: None,
            fq_ref_date: None,
            include_now: false,
            fields: Vec::new(),
        }
    }

    /// Bar unit, e.g. `1m`, `5m`, `1d`, `1w`; `daily`/`minute` are accepted.
    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = normalize_unit(unit);
        self
    }

    /// Last bar time (inclusive). Defaults to the latest available.
    pub fn end_dt(mut self, end: impl Into<DateLike>) -> Self {
        self.end_dt = Some(end.into());
        self
    }

    /// Reference date for forward/backward price adjustment.
    pub fn fq_ref_date(mut self, date: impl Into<DateLike>) -> Self {
        self.fq_ref_date = Some(date.into());
        self
    }

    /// Include the still-forming bar. (Default: `false`)
    pub fn include_now(mut self, yes: bool) -> Self {
        self.include_now = yes;
        self
    }

    /// Columns to keep in [`BarsBuilder::fetch_table`]; all when empty.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    fn check(&self) -> Result<(), JqError> {
        require_codes(self.codes.as_slice(), "security")?;
        if self.count == 0 {
            return Err(JqError::InvalidParams("count must be greater than 0".into()));
        }
        Ok(())
    }

    async fn fetch_tables(&self) -> Result<Vec<(String, Table)>, JqError> {
        self.check()?;
        let end = opt_datetime(self.end_dt.as_ref())?;
        let fq_ref_date = opt_date(self.fq_ref_date.as_ref())?;

        let futures = self.codes.iter().map(|code| {
            let params = Params::new()
                .set("code", code)
                .set("count", self.count)
                .set("unit", self.unit.as_str())
                .set_opt("end_date", end)
                .set_opt("fq_ref_date", fq_ref_date)
                .set_opt("include_now", self.include_now.then_some(true));
            async move {
                let body = self.client.call("get_bars", &params).await?;
                let table = parse_delimited_text(&body, Some(BAR_SCHEMA))?;
                Ok::<_, JqError>((code.clone(), table))
            }
        });
        try_join_all(futures).await
    }

    /// Execute and return the bars of each code, keyed by code.
    ///
    /// # Errors
    /// `InvalidParams` for an empty code list, a zero count or a bad date (before any
    /// request); any dispatch or decoding error otherwise.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(codes = ?self.codes), err))]
    pub async fn fetch(self) -> Result<BTreeMap<String, Vec<Bar>>, JqError> {
        self.fetch_tables()
            .await?
            .into_iter()
            .map(|(code, table)| Ok((code, decode_bars(&table)?)))
            .collect()
    }

    /// Execute and return one table with a leading `code` column, codes in request order.
    ///
    /// # Errors
    /// As [`BarsBuilder::fetch`], plus `InvalidParams` for an unknown field.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(codes = ?self.codes), err))]
    pub async fn fetch_table(self) -> Result<Table, JqError> {
        let mut out = Table::default();
        for (code, table) in self.fetch_tables().await? {
            let table = if self.fields.is_empty() || table.columns().is_empty() {
                table
            } else {
                table.select(&projection(&["date"], &self.fields))?
            };
            out.append(table.with_key_column("code", &code))?;
        }
        Ok(out)
    }
}

/// A builder for the bars of one code over a window: either from a start date, or the
/// last `count` bars, up to the end date.
#[derive(Debug, Clone)]
pub struct PriceBuilder {
    client: JqClient,
    code: String,
    start: Option<DateLike>,
    end: Option<DateLike>,
    count: Option<usize>,
    unit: String,
    fields: Vec<String>,
    fq_ref_date: Option<DateLike>,
}

impl PriceBuilder {
    /// Create a builder for daily bars of `code`.
    pub fn new(client: &JqClient, code: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            code: code.into(),
            start: None,
            end: None,
            count: None,
            unit: "1d".to_string(),
            fields: Vec::new(),
            fq_ref_date: None,
        }
    }

    /// First bar time. Exclusive with [`PriceBuilder::count`]. Defaults to `2015-01-01`
    /// when neither is set.
    pub fn start_date(mut self, start: impl Into<DateLike>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Last bar time (inclusive). Defaults to now in Shanghai.
    pub fn end_date(mut self, end: impl Into<DateLike>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Number of bars ending at the end date. Exclusive with [`PriceBuilder::start_date`].
    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Bar frequency; `daily` and `minute` are accepted.
    pub fn frequency(mut self, frequency: &str) -> Self {
        self.unit = normalize_unit(frequency);
        self
    }

    /// Columns to return after `date`. Defaults to open, close, high, low, volume, money.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Reference date for price adjustment.
    pub fn fq_ref_date(mut self, date: impl Into<DateLike>) -> Self {
        self.fq_ref_date = Some(date.into());
        self
    }

    async fn fetch_raw(&self) -> Result<Table, JqError> {
        let code = self.code.trim();
        if code.is_empty() {
            return Err(JqError::InvalidParams("security is required".into()));
        }
        if self.start.is_some() && self.count.is_some() {
            return Err(JqError::InvalidParams(
                "start_date and count are mutually exclusive".into(),
            ));
        }
        if self.count == Some(0) {
            return Err(JqError::InvalidParams("count must be greater than 0".into()));
        }
        let end = opt_datetime(self.end.as_ref())?.unwrap_or_else(now_shanghai);
        let fq_ref_date = opt_date(self.fq_ref_date.as_ref())?;

        let base = Params::new()
            .set("code", code)
            .set("unit", self.unit.as_str())
            .set("end_date", end)
            .set_opt("fq_ref_date", fq_ref_date);
        let (method, params) = match self.count {
            Some(count) => ("get_price", base.set("count", count)),
            None => {
                let start = match &self.start {
                    Some(s) => s.to_datetime()?,
                    None => DateLike::from(DEFAULT_PRICE_START).to_datetime()?,
                };
                ("get_price_period", base.set("date", start))
            }
        };

        let body = self.client.call(method, &params).await?;
        parse_delimited_text(&body, Some(BAR_SCHEMA))
    }

    /// Execute and return a table of `date` followed by the requested fields.
    ///
    /// # Errors
    /// `InvalidParams` when both start and count are set, for a zero count, a bad date
    /// (all before any request) or an unknown field; any dispatch error otherwise.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(code = %self.code), err))]
    pub async fn fetch(self) -> Result<Table, JqError> {
        let table = self.fetch_raw().await?;
        if table.columns().is_empty() {
            return Ok(table);
        }
        let defaults: Vec<String>;
        let fields = if self.fields.is_empty() {
            defaults = DEFAULT_PRICE_FIELDS.iter().map(|s| (*s).to_string()).collect();
            &defaults
        } else {
            &self.fields
        };
        table.select(&projection(&["date"], fields))
    }

    /// Execute and return typed bars.
    ///
    /// # Errors
    /// As [`PriceBuilder::fetch`].
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), fields(code = %self.code), err))]
    pub async fn fetch_bars(self) -> Result<Vec<Bar>, JqError> {
        decode_bars(&self.fetch_raw().await?)
    }
}
