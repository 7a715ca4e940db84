//! Security reference data, code normalization, and code-list arguments.

mod codes;
mod model;

pub use codes::{IntoCodes, normalize_code};
pub use model::Security;

pub(crate) use codes::require_codes;

use futures::future::try_join_all;

use crate::core::dates::{DateLike, opt_date};
use crate::core::{JqClient, JqError, Params};

/// Decode a header + rows payload into securities.
fn parse_securities(body: &str) -> Result<Vec<Security>, JqError> {
    let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let names: Vec<&str> = header.split(',').collect();
    lines
        .map(|line| Security::from_fields(names.iter().copied().zip(line.split(','))))
        .collect()
}

/// Fetch reference data for one security. `Ok(None)` when the service knows no such code.
///
/// # Errors
/// `InvalidParams` for an empty code or bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_security_info(
    client: &JqClient,
    code: &str,
    date: Option<DateLike>,
) -> Result<Option<Security>, JqError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(JqError::InvalidParams("code is required".into()));
    }
    let date = opt_date(date.as_ref())?;

    let body = client
        .call(
            "get_security_info",
            &Params::new().set("code", code).set_opt("date", date),
        )
        .await?;
    Ok(parse_securities(&body)?.into_iter().next())
}

/// Fetch every security of the given types (`stock`, `fund`, `index`, `futures`,
/// `etf`, `lof`, `options`, ...). Defaults to `stock` when `types` is empty.
///
/// One request is sent per type, concurrently; results keep the order of `types`.
///
/// # Errors
/// `InvalidParams` for a bad date; any dispatch error otherwise.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(client), err))]
pub async fn get_all_securities(
    client: &JqClient,
    types: &[&str],
    date: Option<DateLike>,
) -> Result<Vec<Security>, JqError> {
    let date = opt_date(date.as_ref())?;
    let types: Vec<&str> = if types.is_empty() { vec!["stock"] } else { types.to_vec() };

    let futures = types.into_iter().map(|ty| async move {
        let body = client
            .call(
                "get_all_securities",
                &Params::new().set("code", ty).set_opt("date", date),
            )
            .await?;
        parse_securities(&body)
    });

    Ok(try_join_all(futures).await?.into_iter().flatten().collect())
}
