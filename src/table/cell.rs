use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::Table;

/// One value of a decoded table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// Empty cell.
    Null,
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Date.
    Date(NaiveDate),
    /// Datetime.
    DateTime(NaiveDateTime),
    /// Text.
    Text(&'a str),
}

impl<'a> Cell<'a> {
    /// Numeric value; integers widen to float.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f),
            Self::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    /// Integer value; integral floats narrow to integer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(f as i64),
            _ => None,
        }
    }

    /// Boolean value; integers are truthy when non-zero.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Int(i) => Some(i != 0),
            Self::Float(f) => Some(f != 0.0),
            _ => None,
        }
    }

    /// Text value.
    #[must_use]
    pub const fn as_str(self) -> Option<&'a str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Date value; a datetime contributes its date part.
    #[must_use]
    pub fn as_date(self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(d),
            Self::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Datetime value; a date means midnight.
    #[must_use]
    pub fn as_datetime(self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            Self::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            _ => None,
        }
    }

    /// True for an empty cell.
    #[must_use]
    pub const fn is_null(self) -> bool {
        matches!(self, Self::Null)
    }
}

impl std::fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format(crate::core::dates::DATE_FORMAT)),
            Self::DateTime(dt) => write!(f, "{}", dt.format(crate::core::dates::DATETIME_FORMAT)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    idx: usize,
}

impl<'a> Row<'a> {
    pub(super) const fn new(table: &'a Table, idx: usize) -> Self {
        Self { table, idx }
    }

    /// Position of this row.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.idx
    }

    /// Cell in column `name`; `None` when the column does not exist.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Cell<'a>> {
        self.table.column(name).map(|c| c.data().get(self.idx))
    }

    /// Float value of column `name`.
    #[must_use]
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Cell::as_f64)
    }

    /// Integer value of column `name`.
    #[must_use]
    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Cell::as_i64)
    }

    /// Boolean value of column `name`.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Cell::as_bool)
    }

    /// Text value of column `name`.
    #[must_use]
    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Cell::as_str)
    }

    /// Date value of column `name`.
    #[must_use]
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(Cell::as_date)
    }

    /// Datetime value of column `name`.
    #[must_use]
    pub fn datetime(&self, name: &str) -> Option<NaiveDateTime> {
        self.get(name).and_then(Cell::as_datetime)
    }
}
