use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::JqError;
use crate::table::{ColumnType, Row};

/// Column types of a tick payload. Columns not listed here are inferred.
pub(crate) const TICK_SCHEMA: &[(&str, ColumnType)] = &[
    ("code", ColumnType::Text),
    ("time", ColumnType::DateTime),
    ("current", ColumnType::Float),
    ("high", ColumnType::Float),
    ("low", ColumnType::Float),
    ("volume", ColumnType::Float),
    ("money", ColumnType::Float),
    ("position", ColumnType::Float),
];

/// Depth of the order book carried by a tick.
pub const BOOK_DEPTH: usize = 5;

/// One price level of the order book.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    /// Quoted price.
    pub price: f64,
    /// Quoted volume.
    pub volume: f64,
}

/// A market snapshot with five levels of depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Snapshot time.
    pub time: NaiveDateTime,
    /// Last traded price.
    pub current: f64,
    /// Session high.
    pub high: f64,
    /// Session low.
    pub low: f64,
    /// Cumulative volume.
    pub volume: f64,
    /// Cumulative traded value.
    pub money: f64,
    /// Open interest (futures only).
    pub position: Option<f64>,
    /// Ask levels, best first.
    pub asks: [Level; BOOK_DEPTH],
    /// Bid levels, best first.
    pub bids: [Level; BOOK_DEPTH],
}

fn book(row: &Row<'_>, side: char) -> [Level; BOOK_DEPTH] {
    std::array::from_fn(|i| Level {
        price: row.f64(&format!("{side}{}_p", i + 1)).unwrap_or(f64::NAN),
        volume: row.f64(&format!("{side}{}_v", i + 1)).unwrap_or(f64::NAN),
    })
}

impl Tick {
    /// Read a tick from a decoded row. Missing book levels are `NaN`.
    ///
    /// # Errors
    /// Returns `JqError::Data` when the row has no `time`.
    pub fn from_row(row: &Row<'_>) -> Result<Self, JqError> {
        let time = row
            .datetime("time")
            .ok_or_else(|| JqError::Data(format!("tick row {} has no time", row.index() + 1)))?;
        let value = |name: &str| row.f64(name).unwrap_or(f64::NAN);
        Ok(Self {
            time,
            current: value("current"),
            high: value("high"),
            low: value("low"),
            volume: value("volume"),
            money: value("money"),
            position: row.f64("position"),
            asks: book(row, 'a'),
            bids: book(row, 'b'),
        })
    }
}
