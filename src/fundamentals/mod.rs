//! Financial statements, factor values, fund information and generic table queries.

mod query;

pub use query::{MAX_QUERY_COUNT, Op, Query};

use serde_json::Value;

use crate::core::dates::{DateLike, Window, opt_date};
use crate::core::{JqClient, JqError, Params};
use crate::market::fetch_per_code;
use crate::securities::{IntoCodes, normalize_code, require_codes};
use crate::table::Table;

/// Default start of a factor window when neither start nor count is given.
const DEFAULT_FACTOR_START: &str = "2015-01-01";

/// Rows of a financial table (`valuation`, `balance`, `income`, `cash_flow`,
/// `indicator`, ...) for one code.
///
/// `date` picks the latest report known on that day; `count` returns that many trailing
/// trading days instead of one.
///
/// # Errors
/// `InvalidParams` for an empty table or code, a zero count or a bad date; any dispatch
/// error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_fundamentals(
    client: &JqClient,
    table: &str,
    columns: &[&str],
    code: &str,
    date: Option<DateLike>,
    count: Option<usize>,
) -> Result<Table, JqError> {
    let (table, code) = (table.trim(), code.trim());
    if table.is_empty() || code.is_empty() {
        return Err(JqError::InvalidParams("table and code are required".into()));
    }
    if count == Some(0) {
        return Err(JqError::InvalidParams("count must be greater than 0".into()));
    }
    let params = Params::new()
        .set("table", table)
        .set_opt("columns", (!columns.is_empty()).then_some(columns))
        .set("code", code)
        .set_opt("date", opt_date(date.as_ref())?)
        .set_opt("count", count);
    client.fetch_shaped("get_fundamentals", params).await?.into_table()
}

/// Run a [`Query`] against a data table.
///
/// # Errors
/// `InvalidParams` for an invalid query (before any request); any dispatch error
/// otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn run_query(client: &JqClient, query: &Query) -> Result<Table, JqError> {
    let params = query.to_params()?;
    client.fetch_shaped("run_query", params).await?.into_table()
}

/// Basic information of a fund as a JSON document.
///
/// # Errors
/// `InvalidParams` for an empty code or bad date; `Json` when the reply is not JSON;
/// any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_fund_info(
    client: &JqClient,
    code: &str,
    date: Option<DateLike>,
) -> Result<Value, JqError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(JqError::InvalidParams("security is required".into()));
    }
    let params = Params::new()
        .set("code", code)
        .set_opt("date", opt_date(date.as_ref())?);
    client.fetch_shaped("get_fund_info", params).await?.into_json()
}

/// Factor values of each code over a window. Without start or count the window starts
/// at `2015-01-01`.
///
/// # Errors
/// `InvalidParams` for an empty code or factor list, both start and count, a zero
/// count or a bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_factor_values(
    client: &JqClient,
    codes: impl IntoCodes,
    factors: &[&str],
    start_date: Option<DateLike>,
    end_date: Option<DateLike>,
    count: Option<usize>,
) -> Result<Table, JqError> {
    let codes = require_codes(codes, "securities")?;
    if factors.iter().all(|f| f.trim().is_empty()) {
        return Err(JqError::InvalidParams("factors is required".into()));
    }
    let start_date = match (start_date, count) {
        (None, None) => Some(DateLike::from(DEFAULT_FACTOR_START)),
        (start, _) => start,
    };
    let window = Window::resolve(start_date.as_ref(), end_date.as_ref(), count)?;
    let params = window.apply(Params::new()).set("columns", factors);
    fetch_per_code(client, "get_factor_values", &codes, &params, &[]).await
}

/// Layered back-test of one factor over an index: the index constituents are split
/// into `group_num` groups by factor value and rebalanced every `period` (`1D`, `1W`,
/// `1M`, ...).
///
/// # Errors
/// `InvalidParams` for anything but a single index code, a zero group count, a period
/// not ending in `D`, `W` or `M`, an empty factor or a bad date; any dispatch error
/// otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_factor_effect(
    client: &JqClient,
    index_code: &str,
    start_date: DateLike,
    end_date: DateLike,
    period: &str,
    factor: &str,
    group_num: usize,
) -> Result<Table, JqError> {
    let code = index_code.trim();
    if code.is_empty() || code.contains(',') {
        return Err(JqError::InvalidParams("security must be a single index code".into()));
    }
    if group_num == 0 {
        return Err(JqError::InvalidParams("group_num must be greater than 0".into()));
    }
    let period = period.trim();
    if !period.ends_with(['D', 'W', 'M']) {
        return Err(JqError::InvalidParams(format!(
            "period '{period}' must end with one of D, W, M"
        )));
    }
    let factor = factor.trim();
    if factor.is_empty() {
        return Err(JqError::InvalidParams("factor is required".into()));
    }
    let params = Params::new()
        .set("code", code)
        .set("date", start_date.to_date()?)
        .set("end_date", end_date.to_date()?)
        .set("period", period)
        .set("factor", factor)
        .set("group_num", group_num);
    client.fetch_shaped("get_factor_effect", params).await?.into_table()
}

/// Baidu search-volume factor, filtered by category, day, stock and province.
///
/// # Errors
/// `InvalidParams` for a stock code that cannot be normalized or a bad date; any
/// dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_baidu_factor(
    client: &JqClient,
    category: Option<&str>,
    day: Option<DateLike>,
    stock: Option<&str>,
    province: Option<&str>,
) -> Result<Table, JqError> {
    let stock = stock.map(normalize_code).transpose()?;
    let params = Params::new()
        .set_opt("category", category)
        .set_opt("day", opt_date(day.as_ref())?)
        .set_opt("stock", stock)
        .set_opt("province", province);
    client.fetch_shaped("get_baidu_factor", params).await?.into_table()
}

/// Every factor the service offers, with its category.
///
/// # Errors
/// Any dispatch error.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_all_factors(client: &JqClient) -> Result<Table, JqError> {
    client
        .fetch_shaped("get_all_factors", Params::new())
        .await?
        .into_table()
}
