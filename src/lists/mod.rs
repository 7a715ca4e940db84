//! Constituent and contract lists returned as bare code lists.

use crate::core::dates::{DateLike, opt_date};
use crate::core::{JqClient, JqError, Params};

fn required<'a>(value: &'a str, what: &str) -> Result<&'a str, JqError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(JqError::InvalidParams(format!("{what} is required")));
    }
    Ok(value)
}

async fn code_list(
    client: &JqClient,
    method: &str,
    key: Option<(&str, &str)>,
    date: Option<DateLike>,
) -> Result<Vec<String>, JqError> {
    let date = opt_date(date.as_ref())?;
    let mut params = Params::new().set_opt("date", date);
    if let Some((name, value)) = key {
        params.insert(name, Some(value.into()));
    }
    client.fetch_shaped(method, params).await?.into_tokens()
}

/// Constituents of an index on `date` (default: latest), e.g. `000300.XSHG`.
///
/// # Errors
/// `InvalidParams` for an empty symbol or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_index_stocks(
    client: &JqClient,
    index_symbol: &str,
    date: Option<DateLike>,
) -> Result<Vec<String>, JqError> {
    let code = required(index_symbol, "index_symbol")?;
    code_list(client, "get_index_stocks", Some(("code", code)), date).await
}

/// Members of an industry on `date`, e.g. `I64` or `801010`.
///
/// # Errors
/// `InvalidParams` for an empty code or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_industry_stocks(
    client: &JqClient,
    industry_code: &str,
    date: Option<DateLike>,
) -> Result<Vec<String>, JqError> {
    let code = required(industry_code, "industry_code")?;
    code_list(client, "get_industry_stocks", Some(("code", code)), date).await
}

/// Members of a concept board on `date`, e.g. `SC0084`.
///
/// # Errors
/// `InvalidParams` for an empty code or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_concept_stocks(
    client: &JqClient,
    concept_code: &str,
    date: Option<DateLike>,
) -> Result<Vec<String>, JqError> {
    let code = required(concept_code, "concept_code")?;
    code_list(client, "get_concept_stocks", Some(("code", code)), date).await
}

/// Securities eligible for margin buying in the latest disclosure up to `date`.
///
/// # Errors
/// `InvalidParams` for a bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_margincash_stocks(
    client: &JqClient,
    date: Option<DateLike>,
) -> Result<Vec<String>, JqError> {
    code_list(client, "get_margincash_stocks", None, date).await
}

/// Securities eligible for short selling in the latest disclosure up to `date`.
///
/// # Errors
/// `InvalidParams` for a bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_marginsec_stocks(
    client: &JqClient,
    date: Option<DateLike>,
) -> Result<Vec<String>, JqError> {
    code_list(client, "get_marginsec_stocks", None, date).await
}

/// Tradable contracts of a futures product on `date`, e.g. `AU`.
///
/// # Errors
/// `InvalidParams` for an empty symbol or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_future_contracts(
    client: &JqClient,
    underlying_symbol: &str,
    date: Option<DateLike>,
) -> Result<Vec<String>, JqError> {
    let code = required(underlying_symbol, "underlying_symbol")?;
    code_list(client, "get_future_contracts", Some(("code", code)), date).await
}

/// The dominant contract of a futures product on `date`; `None` when there is none.
///
/// # Errors
/// `InvalidParams` for an empty symbol or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_dominant_future(
    client: &JqClient,
    underlying_symbol: &str,
    date: Option<DateLike>,
) -> Result<Option<String>, JqError> {
    let code = required(underlying_symbol, "underlying_symbol")?;
    let date = opt_date(date.as_ref())?;
    let body = client
        .call(
            "get_dominant_future",
            &Params::new().set("code", code).set_opt("date", date),
        )
        .await?;
    let code = body.trim();
    Ok((!code.is_empty()).then(|| code.to_string()))
}
