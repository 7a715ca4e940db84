//! Exchange trading calendar.

use chrono::NaiveDate;

use crate::core::dates::{DateLike, opt_date, parse_date, today_shanghai};
use crate::core::{JqClient, JqError, Params};

fn parse_days(body: &str) -> Result<Vec<NaiveDate>, JqError> {
    body.split_whitespace()
        .map(|s| parse_date(s).map_err(|e| JqError::Data(format!("trade day '{s}': {e}"))))
        .collect()
}

/// Every trading day the service knows, ascending.
///
/// # Errors
/// Any dispatch error, or `Data` when a day cannot be parsed.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_all_trade_days(client: &JqClient) -> Result<Vec<NaiveDate>, JqError> {
    let body = client.call("get_all_trade_days", &Params::new()).await?;
    parse_days(&body)
}

/// Trading days in a window ending at `end_date` (default: today in Shanghai).
///
/// - with `start_date`: every trading day in `[start_date, end_date]`;
/// - with `count`: the last `count` trading days up to `end_date`;
/// - with neither: every trading day up to `end_date`.
///
/// # Errors
/// `InvalidParams` when both `start_date` and `count` are given, when `count` is zero,
/// or for unparsable dates. Validation happens before any request is sent.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_trade_days(
    client: &JqClient,
    start_date: Option<DateLike>,
    end_date: Option<DateLike>,
    count: Option<usize>,
) -> Result<Vec<NaiveDate>, JqError> {
    if start_date.is_some() && count.is_some() {
        return Err(JqError::InvalidParams(
            "start_date and count are mutually exclusive".into(),
        ));
    }
    if count == Some(0) {
        return Err(JqError::InvalidParams("count must be greater than 0".into()));
    }
    let start = opt_date(start_date.as_ref())?;
    let end = opt_date(end_date.as_ref())?.unwrap_or_else(today_shanghai);

    if let Some(start) = start {
        if start > end {
            return Ok(Vec::new());
        }
        let body = client
            .call(
                "get_trade_days",
                &Params::new().set("date", start).set("end_date", end),
            )
            .await?;
        return parse_days(&body);
    }

    let days = get_all_trade_days(client).await?;
    Ok(window_ending_at(&days, end, count).to_vec())
}

/// The last `count` days (all when `None`) that are not after `end`.
fn window_ending_at(days: &[NaiveDate], end: NaiveDate, count: Option<usize>) -> &[NaiveDate] {
    let end_idx = days.partition_point(|d| *d <= end);
    let start_idx = count.map_or(0, |n| end_idx.saturating_sub(n));
    &days[start_idx..end_idx]
}
