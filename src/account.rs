//! Account quota.

use crate::core::{JqClient, JqError, Params};

/// Which part of the daily quota [`get_query_count`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotaField {
    /// Remaining rows today (the service default).
    #[default]
    Spare,
    /// Total rows allowed per day.
    Total,
}

impl QuotaField {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Spare => "spare",
            Self::Total => "total",
        }
    }
}

impl std::str::FromStr for QuotaField {
    type Err = JqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "spare" => Ok(Self::Spare),
            "total" => Ok(Self::Total),
            other => Err(JqError::InvalidParams(format!(
                "query count field must be 'total' or 'spare', got '{other}'"
            ))),
        }
    }
}

/// Rows of daily quota, total or remaining. `None` leaves the choice to the service,
/// which reports the remaining rows.
///
/// # Errors
/// `Data` when the reply is not an integer; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_query_count(client: &JqClient, field: Option<QuotaField>) -> Result<i64, JqError> {
    let params = Params::new().set_opt("field", field.map(QuotaField::as_str));
    client
        .fetch_shaped("get_query_count", params)
        .await?
        .into_integer()
}
