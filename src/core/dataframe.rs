use polars::prelude::{self as pl, DataFrame, NamedFrom, PlSmallStr, PolarsResult};

use crate::table::{ColumnData, Table};

/// Trait for converting decoded payloads into Polars DataFrames.
pub trait ToDataFrame {
    /// Converts the object into a Polars DataFrame.
    ///
    /// # Errors
    /// Propagates Polars construction errors.
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

impl ToDataFrame for Table {
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns = self
            .columns()
            .iter()
            .map(|c| {
                let name = PlSmallStr::from(c.name());
                match c.data() {
                    ColumnData::Int(v) => pl::Column::new(name, v.as_slice()),
                    ColumnData::Float(v) => pl::Column::new(name, v.as_slice()),
                    ColumnData::Bool(v) => pl::Column::new(name, v.as_slice()),
                    ColumnData::Date(v) => pl::Column::new(name, v.as_slice()),
                    ColumnData::DateTime(v) => pl::Column::new(name, v.as_slice()),
                    ColumnData::Text(v) => pl::Column::new(name, v.as_slice()),
                }
            })
            .collect::<Vec<_>>();
        DataFrame::new(columns)
    }
}
