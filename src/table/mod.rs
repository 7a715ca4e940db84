//! Decoding of the service's comma-delimited text payloads into typed columns.
//!
//! The first non-empty line is the header. Empty cells are nulls. Columns named in a
//! schema are parsed with the given type; the rest are inferred as integer, float, or
//! text.

mod cell;

pub use cell::{Cell, Row};

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::JqError;
use crate::core::dates::{parse_date, parse_datetime};

/// Type of a decoded column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integers.
    Int,
    /// 64-bit floats.
    Float,
    /// Booleans (`true`/`false`/`1`/`0`, any case).
    Bool,
    /// Calendar dates.
    Date,
    /// Dates with time of day.
    DateTime,
    /// Anything else.
    Text,
}

/// Values of one column, all of the same type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Integer column.
    Int(Vec<Option<i64>>),
    /// Float column.
    Float(Vec<Option<f64>>),
    /// Boolean column.
    Bool(Vec<Option<bool>>),
    /// Date column.
    Date(Vec<Option<NaiveDate>>),
    /// Datetime column.
    DateTime(Vec<Option<NaiveDateTime>>),
    /// Text column.
    Text(Vec<Option<String>>),
}

impl ColumnData {
    /// The column type.
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        match self {
            Self::Int(_) => ColumnType::Int,
            Self::Float(_) => ColumnType::Float,
            Self::Bool(_) => ColumnType::Bool,
            Self::Date(_) => ColumnType::Date,
            Self::DateTime(_) => ColumnType::DateTime,
            Self::Text(_) => ColumnType::Text,
        }
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::Date(v) => v.len(),
            Self::DateTime(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    /// True when the column holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `idx`; `Cell::Null` when empty or out of range.
    #[must_use]
    pub fn get(&self, idx: usize) -> Cell<'_> {
        fn pick<T: Copy>(v: &[Option<T>], idx: usize, f: impl Fn(T) -> Cell<'static>) -> Cell<'static> {
            v.get(idx).copied().flatten().map_or(Cell::Null, f)
        }
        match self {
            Self::Int(v) => pick(v, idx, Cell::Int),
            Self::Float(v) => pick(v, idx, Cell::Float),
            Self::Bool(v) => pick(v, idx, Cell::Bool),
            Self::Date(v) => pick(v, idx, Cell::Date),
            Self::DateTime(v) => pick(v, idx, Cell::DateTime),
            Self::Text(v) => v
                .get(idx)
                .and_then(|s| s.as_deref())
                .map_or(Cell::Null, Cell::Text),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Header name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The typed values.
    #[must_use]
    pub const fn data(&self) -> &ColumnData {
        &self.data
    }

    /// The column type.
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }
}

/// A decoded row set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Assemble a table from equally long columns.
    ///
    /// # Errors
    /// Returns `JqError::Data` when the columns differ in length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, JqError> {
        let rows = columns.first().map_or(0, |c| c.data.len());
        if let Some(bad) = columns.iter().find(|c| c.data.len() != rows) {
            return Err(JqError::Data(format!(
                "column '{}' has {} values, expected {rows}",
                bad.name,
                bad.data.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Number of rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows
    }

    /// True when there are no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// All columns in header order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Column by header name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Row view at `idx`.
    #[must_use]
    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        (idx < self.rows).then(|| Row::new(self, idx))
    }

    /// Iterate over row views.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows).map(move |idx| Row::new(self, idx))
    }

    /// A table with only the named columns, in the given order.
    ///
    /// # Errors
    /// Returns `JqError::InvalidParams` naming the first column that does not exist.
    pub fn select(&self, names: &[&str]) -> Result<Self, JqError> {
        let columns = names
            .iter()
            .map(|n| {
                self.column(n)
                    .cloned()
                    .ok_or_else(|| JqError::InvalidParams(format!("unknown field '{n}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            columns,
            rows: self.rows,
        })
    }

    /// Prepend a text column holding `value` on every row, unless a column `name`
    /// already exists.
    #[must_use]
    pub fn with_key_column(mut self, name: &str, value: &str) -> Self {
        if self.column(name).is_some() {
            return self;
        }
        let data = ColumnData::Text(vec![Some(value.to_string()); self.rows]);
        self.columns.insert(0, Column::new(name, data));
        self
    }

    /// Append the rows of `other`, which must have the same header.
    ///
    /// Columns whose types differ are widened: an all-null side adopts the other type,
    /// integer and float become float, anything else becomes text.
    ///
    /// # Errors
    /// Returns `JqError::Data` when the headers differ.
    pub fn append(&mut self, other: Self) -> Result<(), JqError> {
        if self.columns.is_empty() {
            *self = other;
            return Ok(());
        }
        if other.columns.is_empty() {
            return Ok(());
        }
        let same_header = self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.name == b.name);
        if !same_header {
            return Err(JqError::Data("cannot append tables with different headers".into()));
        }
        let rows = self.rows;
        for (a, b) in self.columns.iter_mut().zip(other.columns) {
            let left = std::mem::replace(&mut a.data, ColumnData::Int(Vec::new()));
            a.data = merge_columns(left, rows, b.data);
        }
        self.rows += other.rows;
        Ok(())
    }
}

fn all_null(d: &ColumnData) -> bool {
    (0..d.len()).all(|i| d.get(i).is_null())
}

fn nulls_of(ty: ColumnType, n: usize) -> ColumnData {
    match ty {
        ColumnType::Int => ColumnData::Int(vec![None; n]),
        ColumnType::Float => ColumnData::Float(vec![None; n]),
        ColumnType::Bool => ColumnData::Bool(vec![None; n]),
        ColumnType::Date => ColumnData::Date(vec![None; n]),
        ColumnType::DateTime => ColumnData::DateTime(vec![None; n]),
        ColumnType::Text => ColumnData::Text(vec![None; n]),
    }
}

fn as_floats(d: &ColumnData) -> Vec<Option<f64>> {
    (0..d.len()).map(|i| d.get(i).as_f64()).collect()
}

fn as_texts(d: &ColumnData) -> Vec<Option<String>> {
    (0..d.len())
        .map(|i| {
            let cell = d.get(i);
            (!cell.is_null()).then(|| cell.to_string())
        })
        .collect()
}

fn merge_columns(left: ColumnData, left_rows: usize, right: ColumnData) -> ColumnData {
    use ColumnData as D;
    match (left, right) {
        (D::Int(mut x), D::Int(y)) => {
            x.extend(y);
            D::Int(x)
        }
        (D::Float(mut x), D::Float(y)) => {
            x.extend(y);
            D::Float(x)
        }
        (D::Bool(mut x), D::Bool(y)) => {
            x.extend(y);
            D::Bool(x)
        }
        (D::Date(mut x), D::Date(y)) => {
            x.extend(y);
            D::Date(x)
        }
        (D::DateTime(mut x), D::DateTime(y)) => {
            x.extend(y);
            D::DateTime(x)
        }
        (D::Text(mut x), D::Text(y)) => {
            x.extend(y);
            D::Text(x)
        }
        (x, y) if all_null(&x) => merge_columns(nulls_of(y.column_type(), left_rows), left_rows, y),
        (x, y) if all_null(&y) => {
            let n = y.len();
            let ty = x.column_type();
            merge_columns(x, left_rows, nulls_of(ty, n))
        }
        (x @ (D::Int(_) | D::Float(_)), y @ (D::Int(_) | D::Float(_))) => {
            let mut v = as_floats(&x);
            v.extend(as_floats(&y));
            D::Float(v)
        }
        (x, y) => {
            let mut v = as_texts(&x);
            v.extend(as_texts(&y));
            D::Text(v)
        }
    }
}

/// Decode comma-delimited text with a header row.
///
/// `schema` pins the type of the named columns; unnamed columns are inferred. An empty
/// body yields an empty table.
///
/// # Errors
/// Returns `JqError::Data` for ragged rows or cells that do not fit a pinned type.
pub fn parse_delimited_text(
    body: &str,
    schema: Option<&[(&str, ColumnType)]>,
) -> Result<Table, JqError> {
    let mut lines = body
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    let Some(header) = lines.next() else {
        return Ok(Table::default());
    };
    let names: Vec<&str> = header.split(',').map(str::trim).collect();

    let mut raw: Vec<Vec<&str>> = vec![Vec::new(); names.len()];
    for (lineno, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != names.len() {
            return Err(JqError::Data(format!(
                "row {} has {} fields, header has {}",
                lineno + 1,
                fields.len(),
                names.len()
            )));
        }
        for (col, field) in raw.iter_mut().zip(fields) {
            col.push(field);
        }
    }

    let columns = names
        .iter()
        .zip(&raw)
        .map(|(name, cells)| {
            let pinned = schema.and_then(|s| s.iter().find(|(n, _)| n == name).map(|(_, t)| *t));
            let data = match pinned {
                Some(ty) => parse_column(name, cells, ty)?,
                None => infer_column(cells),
            };
            Ok(Column::new(*name, data))
        })
        .collect::<Result<Vec<_>, JqError>>()?;

    Table::from_columns(columns)
}

fn non_empty(cell: &str) -> Option<&str> {
    (!cell.is_empty()).then_some(cell)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Wire timestamps may carry a sub-second fraction, e.g. `20210324093105.0`; it is
/// truncated.
fn parse_wire_datetime(s: &str) -> Option<NaiveDateTime> {
    let head = match s.split_once('.') {
        Some((head, frac)) if frac.bytes().all(|b| b.is_ascii_digit()) => head,
        Some(_) => return None,
        None => s,
    };
    parse_datetime(head).ok()
}

// Integral floats in [-2^63, 2^63) convert to i64 exactly.
#[allow(clippy::cast_precision_loss)]
const I64_LOWER: f64 = i64::MIN as f64;
#[allow(clippy::cast_precision_loss)]
const I64_UPPER: f64 = -(i64::MIN as f64);

fn parse_column(name: &str, cells: &[&str], ty: ColumnType) -> Result<ColumnData, JqError> {
    fn typed<T>(
        name: &str,
        cells: &[&str],
        ty: ColumnType,
        f: impl Fn(&str) -> Option<T>,
    ) -> Result<Vec<Option<T>>, JqError> {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| match non_empty(c) {
                None => Ok(None),
                Some(s) => f(s).map(Some).ok_or_else(|| {
                    JqError::Data(format!("column '{name}' row {}: '{s}' is not {ty:?}", i + 1))
                }),
            })
            .collect()
    }

    Ok(match ty {
        ColumnType::Int => ColumnData::Int(typed(name, cells, ty, |s| {
            s.parse::<i64>().ok().or_else(|| {
                // Integral floats such as `1295422.0` still fit an integer column.
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(f))
                    .map(|f| {
                        #[allow(clippy::cast_possible_truncation)]
                        let i = f as i64;
                        i
                    })
            })
        })?),
        ColumnType::Float => ColumnData::Float(typed(name, cells, ty, |s| s.parse().ok())?),
        ColumnType::Bool => ColumnData::Bool(typed(name, cells, ty, parse_bool)?),
        ColumnType::Date => ColumnData::Date(typed(name, cells, ty, |s| parse_date(s).ok())?),
        ColumnType::DateTime => ColumnData::DateTime(typed(name, cells, ty, parse_wire_datetime)?),
        ColumnType::Text => {
            ColumnData::Text(cells.iter().map(|c| non_empty(c).map(str::to_string)).collect())
        }
    })
}

fn infer_column(cells: &[&str]) -> ColumnData {
    let present = || cells.iter().filter_map(|c| non_empty(c));
    if present().all(|s| s.parse::<i64>().is_ok()) {
        ColumnData::Int(cells.iter().map(|c| non_empty(c).and_then(|s| s.parse().ok())).collect())
    } else if present().all(|s| s.parse::<f64>().is_ok()) {
        ColumnData::Float(cells.iter().map(|c| non_empty(c).and_then(|s| s.parse().ok())).collect())
    } else {
        ColumnData::Text(cells.iter().map(|c| non_empty(c).map(str::to_string)).collect())
    }
}
