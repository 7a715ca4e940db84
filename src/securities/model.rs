use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::JqError;
use crate::core::dates::parse_date;

/// Reference data for one stock, fund, index, futures contract or option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Security {
    /// Code with exchange suffix, e.g. `000001.XSHE`.
    ///
    /// Suffixes: `XSHG` Shanghai, `XSHE` Shenzhen, `CCFX` CFFEX, `XSGE` SHFE,
    /// `XDCE` DCE, `XZCE` CZCE, `XINE` INE, `OF` off-exchange funds.
    pub code: String,
    /// Security type, e.g. `stock`, `fund`, `index`, `futures`.
    #[serde(rename = "type")]
    pub security_type: String,
    /// Listing date.
    pub start_date: NaiveDate,
    /// Delisting date; far in the future for listed securities.
    pub end_date: Option<NaiveDate>,
    /// Short name.
    pub name: Option<String>,
    /// Display (Chinese) name.
    pub display_name: Option<String>,
    /// Parent fund of a structured fund.
    pub parent: Option<String>,
    /// Columns without a dedicated field.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Security {
    /// Build from `(column, value)` pairs. Empty values count as absent.
    ///
    /// # Errors
    /// Returns `JqError::Data` when `code`, `type` or `start_date` is missing or a date
    /// cannot be parsed.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, JqError> {
        let mut code = None;
        let mut security_type = None;
        let mut start_date = None;
        let mut end_date = None;
        let mut name = None;
        let mut display_name = None;
        let mut parent = None;
        let mut extra = BTreeMap::new();

        for (key, value) in fields {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                "code" => code = Some(value.to_string()),
                "type" => security_type = Some(value.to_string()),
                "start_date" => start_date = Some(parse_date(value).map_err(date_err)?),
                "end_date" => end_date = Some(parse_date(value).map_err(date_err)?),
                "name" => name = Some(value.to_string()),
                "display_name" => display_name = Some(value.to_string()),
                "parent" => parent = Some(value.to_string()),
                other => {
                    extra.insert(other.to_string(), value.to_string());
                }
            }
        }

        let missing = || JqError::Data("security requires code, type and start_date".into());
        Ok(Self {
            code: code.ok_or_else(missing)?,
            security_type: security_type.ok_or_else(missing)?,
            start_date: start_date.ok_or_else(missing)?,
            end_date,
            name,
            display_name,
            parent,
            extra,
        })
    }
}

fn date_err(e: JqError) -> JqError {
    JqError::Data(format!("security date: {e}"))
}
