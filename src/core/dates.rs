//! Canonical date/time parsing and wire formatting.
//!
//! Accepted text forms are `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, and the compact
//! `YYYYMMDDHHMM` / `YYYYMMDDHHMMSS`. Anything else is rejected.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Asia::Shanghai;

use crate::core::{JqError, Params};

/// Wire format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for datetimes.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const COMPACT_MINUTE_FORMAT: &str = "%Y%m%d%H%M";
const COMPACT_SECOND_FORMAT: &str = "%Y%m%d%H%M%S";

// '9' marks a digit position; every other byte must match literally.
const SHAPE_DATE: &[u8] = b"9999-99-99";
const SHAPE_DATETIME: &[u8] = b"9999-99-99 99:99:99";
const SHAPE_COMPACT_MINUTE: &[u8] = b"999999999999";
const SHAPE_COMPACT_SECOND: &[u8] = b"99999999999999";

fn matches_shape(input: &[u8], shape: &[u8]) -> bool {
    input.len() == shape.len()
        && input.iter().zip(shape).all(|(c, s)| match s {
            b'9' => c.is_ascii_digit(),
            lit => c == lit,
        })
}

fn parse_shaped(s: &str) -> Option<NaiveDateTime> {
    let b = s.as_bytes();
    if matches_shape(b, SHAPE_DATE) {
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    } else if matches_shape(b, SHAPE_DATETIME) {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).ok()
    } else if matches_shape(b, SHAPE_COMPACT_MINUTE) {
        NaiveDateTime::parse_from_str(s, COMPACT_MINUTE_FORMAT).ok()
    } else if matches_shape(b, SHAPE_COMPACT_SECOND) {
        NaiveDateTime::parse_from_str(s, COMPACT_SECOND_FORMAT).ok()
    } else {
        None
    }
}

/// Parse a datetime in one of the canonical forms. A bare date means midnight.
///
/// # Errors
/// Returns `JqError::InvalidParams` for any other form or an impossible calendar value.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, JqError> {
    parse_shaped(input.trim()).ok_or_else(|| {
        JqError::InvalidParams(format!(
            "unrecognized date/time '{input}': expected YYYY-MM-DD, YYYY-MM-DD HH:MM:SS or YYYYMMDDHHMM[SS]"
        ))
    })
}

/// Parse a date in one of the canonical forms; a datetime contributes its date part.
///
/// # Errors
/// Returns `JqError::InvalidParams` when the text is not a canonical form.
pub fn parse_date(input: &str) -> Result<NaiveDate, JqError> {
    parse_datetime(input).map(|dt| dt.date())
}

/// Format a date for the wire (`YYYY-MM-DD`).
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a datetime for the wire (`YYYY-MM-DD HH:MM:SS`).
#[must_use]
pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Current wall-clock time at the exchange (Asia/Shanghai).
#[must_use]
pub fn now_shanghai() -> NaiveDateTime {
    Utc::now().with_timezone(&Shanghai).naive_local()
}

/// Current trading-calendar date at the exchange (Asia/Shanghai).
#[must_use]
pub fn today_shanghai() -> NaiveDate {
    now_shanghai().date()
}

/// A date or datetime supplied either as a typed value or as canonical text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateLike {
    /// A calendar date.
    Date(NaiveDate),
    /// A calendar date with time of day.
    DateTime(NaiveDateTime),
    /// Text, parsed on use.
    Text(String),
}

impl DateLike {
    /// Resolve to a date.
    ///
    /// # Errors
    /// Returns `JqError::InvalidParams` when text cannot be parsed.
    pub fn to_date(&self) -> Result<NaiveDate, JqError> {
        match self {
            Self::Date(d) => Ok(*d),
            Self::DateTime(dt) => Ok(dt.date()),
            Self::Text(s) => parse_date(s),
        }
    }

    /// Resolve to a datetime; a date means midnight.
    ///
    /// # Errors
    /// Returns `JqError::InvalidParams` when text cannot be parsed.
    pub fn to_datetime(&self) -> Result<NaiveDateTime, JqError> {
        match self {
            Self::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            Self::DateTime(dt) => Ok(*dt),
            Self::Text(s) => parse_datetime(s),
        }
    }
}

impl From<NaiveDate> for DateLike {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for DateLike {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<&str> for DateLike {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DateLike {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Resolve an optional date argument.
pub(crate) fn opt_date(d: Option<&DateLike>) -> Result<Option<NaiveDate>, JqError> {
    d.map(DateLike::to_date).transpose()
}

/// Resolve an optional datetime argument.
pub(crate) fn opt_datetime(d: Option<&DateLike>) -> Result<Option<NaiveDateTime>, JqError> {
    d.map(DateLike::to_datetime).transpose()
}

/// A date range given by a start date or a trailing count, up to an optional end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) start: Option<NaiveDate>,
    pub(crate) end: Option<NaiveDate>,
    pub(crate) count: Option<usize>,
}

impl Window {
    /// Resolve window arguments; start and count are mutually exclusive, count > 0.
    pub(crate) fn resolve(
        start: Option<&DateLike>,
        end: Option<&DateLike>,
        count: Option<usize>,
    ) -> Result<Self, JqError> {
        if start.is_some() && count.is_some() {
            return Err(JqError::InvalidParams(
                "start_date and count are mutually exclusive".into(),
            ));
        }
        if count == Some(0) {
            return Err(JqError::InvalidParams("count must be greater than 0".into()));
        }
        Ok(Self {
            start: opt_date(start)?,
            end: opt_date(end)?,
            count,
        })
    }

    /// Add `date`, `end_date` and `count` to `params`.
    pub(crate) fn apply(&self, params: Params) -> Params {
        params
            .set_opt("date", self.start)
            .set_opt("end_date", self.end)
            .set_opt("count", self.count)
    }
}
