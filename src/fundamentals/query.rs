use std::fmt;

use crate::core::{JqError, Params};

/// Largest row count `run_query` returns per request.
pub const MAX_QUERY_COUNT: usize = 4000;

/// Comparison used in a [`Query`] filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        })
    }
}

/// A table query for `run_query`: a table, optional columns, filters and a row limit.
///
/// Filters go on the wire as `column#op#value` joined by `&`, e.g.
/// `code#=#000001.XSHE&day#>=#2015-01-01`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    columns: Vec<String>,
    filters: Vec<(String, Op, String)>,
    count: Option<usize>,
}

impl Query {
    /// Query every column of `table`, e.g. `finance.STK_XR_XD`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            filters: Vec::new(),
            count: None,
        }
    }

    /// Restrict the returned columns.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Add a filter; filters are combined with AND.
    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, op: Op, value: impl ToString) -> Self {
        self.filters.push((column.into(), op, value.to_string()));
        self
    }

    /// Row limit, at most [`MAX_QUERY_COUNT`].
    #[must_use]
    pub const fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// The filters in wire form; `None` without filters.
    #[must_use]
    pub fn conditions(&self) -> Option<String> {
        (!self.filters.is_empty()).then(|| {
            self.filters
                .iter()
                .map(|(c, op, v)| format!("{c}#{op}#{v}"))
                .collect::<Vec<_>>()
                .join("&")
        })
    }

    pub(crate) fn to_params(&self) -> Result<Params, JqError> {
        if self.table.trim().is_empty() {
            return Err(JqError::InvalidParams("table is required".into()));
        }
        match self.count {
            Some(0) => return Err(JqError::InvalidParams("count must be greater than 0".into())),
            Some(n) if n > MAX_QUERY_COUNT => {
                return Err(JqError::InvalidParams(format!(
                    "count must be at most {MAX_QUERY_COUNT}"
                )));
            }
            _ => {}
        }
        for (column, _, value) in &self.filters {
            if column.contains(['#', '&']) || value.contains(['#', '&']) {
                return Err(JqError::InvalidParams(format!(
                    "filter '{column}' may not contain '#' or '&'"
                )));
            }
        }
        Ok(Params::new()
            .set("table", self.table.trim())
            .set_opt("columns", (!self.columns.is_empty()).then(|| self.columns.clone()))
            .set_opt("conditions", self.conditions())
            .set_opt("count", self.count))
    }
}
