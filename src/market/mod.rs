//! Market data returned as tables: money flow, margin trading, billboard, lock-up
//! expiries, extras, index weights, industries, concepts and call auctions.

use futures::future::try_join_all;

use crate::core::dates::{DateLike, Window, opt_date};
use crate::core::{JqClient, JqError, Params};
use crate::securities::{IntoCodes, require_codes};
use crate::table::Table;

/// Industry classification schemes accepted by [`get_industries`].
pub const INDUSTRY_SCHEMES: &[&str] = &["sw_l1", "sw_l2", "sw_l3", "jq_l1", "jq_l2", "zjw"];

/// Series accepted by [`get_extras`].
pub const EXTRAS_INFO: &[&str] = &[
    "is_st",
    "acc_net_value",
    "unit_net_value",
    "futures_sett_price",
    "futures_positions",
    "adj_net_value",
];

/// Fetch one table per code concurrently and stack them, each tagged with its `code`.
///
/// `fields`, when non-empty, selects the columns kept from each table.
pub(crate) async fn fetch_per_code(
    client: &JqClient,
    method: &str,
    codes: &[String],
    base: &Params,
    fields: &[&str],
) -> Result<Table, JqError> {
    let futures = codes.iter().map(|code| {
        let mut params = base.clone();
        params.insert("code", Some(code.into()));
        async move {
            let table = client.fetch_shaped(method, params).await?.into_table()?;
            let table = if fields.is_empty() || table.columns().is_empty() {
                table
            } else {
                table.select(fields)?
            };
            Ok::<_, JqError>(table.with_key_column("code", code))
        }
    });
    let mut out = Table::default();
    for table in try_join_all(futures).await? {
        out.append(table)?;
    }
    Ok(out)
}

async fn single_table(client: &JqClient, method: &str, params: Params) -> Result<Table, JqError> {
    client.fetch_shaped(method, params).await?.into_table()
}

/// Daily money flow of each code over a window.
///
/// # Errors
/// `InvalidParams` for an empty code list, both start and count, a zero count or a bad
/// date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_money_flow(
    client: &JqClient,
    codes: impl IntoCodes,
    start_date: Option<DateLike>,
    end_date: Option<DateLike>,
    count: Option<usize>,
    fields: &[&str],
) -> Result<Table, JqError> {
    let codes = require_codes(codes, "security_list")?;
    let window = Window::resolve(start_date.as_ref(), end_date.as_ref(), count)?;
    fetch_per_code(client, "get_money_flow", &codes, &window.apply(Params::new()), fields).await
}

/// Margin trading and short selling balances of each code over a window.
///
/// Exactly one of `start_date` and `count` must be given.
///
/// # Errors
/// `InvalidParams` for an empty code list, neither or both of start and count, a zero
/// count or a bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_mtss(
    client: &JqClient,
    codes: impl IntoCodes,
    start_date: Option<DateLike>,
    end_date: Option<DateLike>,
    count: Option<usize>,
    fields: &[&str],
) -> Result<Table, JqError> {
    let codes = require_codes(codes, "security_list")?;
    if start_date.is_none() && count.is_none() {
        return Err(JqError::InvalidParams("one of start_date and count is required".into()));
    }
    let window = Window::resolve(start_date.as_ref(), end_date.as_ref(), count)?;
    fetch_per_code(client, "get_mtss", &codes, &window.apply(Params::new()), fields).await
}

/// Dragon-tiger billboard entries over a window, optionally limited to some codes.
///
/// # Errors
/// `InvalidParams` for both start and count, a zero count or a bad date; any dispatch
/// error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_billboard_list(
    client: &JqClient,
    codes: impl IntoCodes,
    start_date: Option<DateLike>,
    end_date: Option<DateLike>,
    count: Option<usize>,
) -> Result<Table, JqError> {
    let codes = codes.into_codes();
    let window = Window::resolve(start_date.as_ref(), end_date.as_ref(), count)?;
    let params = window
        .apply(Params::new())
        .set_opt("code", (!codes.is_empty()).then_some(codes));
    single_table(client, "get_billboard_list", params).await
}

/// Lock-up expiries of each code from `start_date` up to `end_date`, or for
/// `forward_count` days after `start_date`.
///
/// # Errors
/// `InvalidParams` for an empty code list, a missing start date, both `end_date` and
/// `forward_count`, a zero count or a bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_locked_shares(
    client: &JqClient,
    codes: impl IntoCodes,
    start_date: DateLike,
    end_date: Option<DateLike>,
    forward_count: Option<usize>,
) -> Result<Table, JqError> {
    let codes = require_codes(codes, "stock_list")?;
    if end_date.is_some() && forward_count.is_some() {
        return Err(JqError::InvalidParams(
            "end_date and forward_count are mutually exclusive".into(),
        ));
    }
    if forward_count == Some(0) {
        return Err(JqError::InvalidParams("forward_count must be greater than 0".into()));
    }
    let params = Params::new()
        .set("date", start_date.to_date()?)
        .set_opt("end_date", opt_date(end_date.as_ref())?)
        .set_opt("forward_count", forward_count);
    fetch_per_code(client, "get_locked_shares", &codes, &params, &[]).await
}

/// One extra daily series (see [`EXTRAS_INFO`]) for each code over a window.
///
/// # Errors
/// `InvalidParams` for an unknown series, an empty code list, both start and count, a
/// zero count or a bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_extras(
    client: &JqClient,
    info: &str,
    codes: impl IntoCodes,
    start_date: Option<DateLike>,
    end_date: Option<DateLike>,
    count: Option<usize>,
) -> Result<Table, JqError> {
    if !EXTRAS_INFO.contains(&info) {
        return Err(JqError::InvalidParams(format!("unknown extras info '{info}'")));
    }
    let codes = require_codes(codes, "security_list")?;
    let window = Window::resolve(start_date.as_ref(), end_date.as_ref(), count)?;
    let params = window.apply(Params::new()).set("info", info);
    fetch_per_code(client, "get_extras", &codes, &params, &[]).await
}

/// Constituent weights of an index on `date`.
///
/// # Errors
/// `InvalidParams` for an empty index code or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_index_weights(
    client: &JqClient,
    index_id: &str,
    date: Option<DateLike>,
) -> Result<Table, JqError> {
    let index_id = index_id.trim();
    if index_id.is_empty() {
        return Err(JqError::InvalidParams("index_id is required".into()));
    }
    let params = Params::new()
        .set("code", index_id)
        .set_opt("date", opt_date(date.as_ref())?);
    single_table(client, "get_index_weights", params).await
}

/// Industries of one classification scheme (default `zjw`) on `date`.
///
/// # Errors
/// `InvalidParams` for an unknown scheme or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_industries(
    client: &JqClient,
    scheme: Option<&str>,
    date: Option<DateLike>,
) -> Result<Table, JqError> {
    let scheme = scheme.unwrap_or("zjw");
    if !INDUSTRY_SCHEMES.contains(&scheme) {
        return Err(JqError::InvalidParams(format!("unknown industry scheme '{scheme}'")));
    }
    let params = Params::new()
        .set("code", scheme)
        .set_opt("date", opt_date(date.as_ref())?);
    single_table(client, "get_industries", params).await
}

/// Industry membership of each code on `date`, across all schemes.
///
/// # Errors
/// `InvalidParams` for an empty code list or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_industry(
    client: &JqClient,
    codes: impl IntoCodes,
    date: Option<DateLike>,
) -> Result<Table, JqError> {
    let codes = require_codes(codes, "security")?;
    let params = Params::new().set_opt("date", opt_date(date.as_ref())?);
    fetch_per_code(client, "get_industry", &codes, &params, &[]).await
}

/// Every concept board.
///
/// # Errors
/// Any dispatch error.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_concepts(client: &JqClient) -> Result<Table, JqError> {
    single_table(client, "get_concepts", Params::new()).await
}

/// Concept boards each code belongs to on `date`.
///
/// # Errors
/// `InvalidParams` for an empty code list or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_concept(
    client: &JqClient,
    codes: impl IntoCodes,
    date: DateLike,
) -> Result<Table, JqError> {
    let codes = require_codes(codes, "security")?;
    let params = Params::new().set("date", date.to_date()?);
    fetch_per_code(client, "get_concept", &codes, &params, &[]).await
}

/// Call-auction snapshots of each code between two dates.
///
/// # Errors
/// `InvalidParams` for an empty code list, a start after the end or a bad date; any
/// dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client, codes), err))]
pub async fn get_call_auction(
    client: &JqClient,
    codes: impl IntoCodes,
    start_date: DateLike,
    end_date: DateLike,
    fields: &[&str],
) -> Result<Table, JqError> {
    let codes = require_codes(codes, "security")?;
    let (start, end) = (start_date.to_date()?, end_date.to_date()?);
    if start > end {
        return Err(JqError::InvalidParams("start_date is after end_date".into()));
    }
    let params = Params::new().set("date", start).set("end_date", end);
    fetch_per_code(client, "get_call_auction", &codes, &params, fields).await
}
