use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::JqError;
use crate::table::{ColumnType, Row};

/// Column types of a bar payload. Columns not listed here are inferred.
pub(crate) const BAR_SCHEMA: &[(&str, ColumnType)] = &[
    ("date", ColumnType::DateTime),
    ("open", ColumnType::Float),
    ("close", ColumnType::Float),
    ("high", ColumnType::Float),
    ("low", ColumnType::Float),
    ("volume", ColumnType::Float),
    ("money", ColumnType::Float),
    ("paused", ColumnType::Bool),
    ("high_limit", ColumnType::Float),
    ("low_limit", ColumnType::Float),
    ("avg", ColumnType::Float),
    ("pre_close", ColumnType::Float),
    ("open_interest", ColumnType::Float),
];

/// One OHLCV bar. Missing prices are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp; midnight for daily bars.
    pub date: NaiveDateTime,
    /// Open price.
    pub open: f64,
    /// Close price.
    pub close: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Traded volume.
    pub volume: f64,
    /// Traded value.
    pub money: f64,
    /// Whether trading was suspended.
    pub paused: Option<bool>,
    /// Limit-up price.
    pub high_limit: Option<f64>,
    /// Limit-down price.
    pub low_limit: Option<f64>,
    /// Average price.
    pub avg: Option<f64>,
    /// Previous close.
    pub pre_close: Option<f64>,
    /// Open interest (futures).
    pub open_interest: Option<f64>,
}

impl Bar {
    /// Read a bar from a decoded row.
    ///
    /// # Errors
    /// Returns `JqError::Data` when the row has no `date`.
    pub fn from_row(row: &Row<'_>) -> Result<Self, JqError> {
        let date = row
            .datetime("date")
            .ok_or_else(|| JqError::Data(format!("bar row {} has no date", row.index() + 1)))?;
        let price = |name: &str| row.f64(name).unwrap_or(f64::NAN);
        Ok(Self {
            date,
            open: price("open"),
            close: price("close"),
            high: price("high"),
            low: price("low"),
            volume: price("volume"),
            money: price("money"),
            paused: row.bool("paused"),
            high_limit: row.f64("high_limit"),
            low_limit: row.f64("low_limit"),
            avg: row.f64("avg"),
            pre_close: row.f64("pre_close"),
            open_interest: row.f64("open_interest"),
        })
    }
}
