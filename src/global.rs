//! Process-wide default client with an explicit lifecycle.
//!
//! Nothing is created implicitly: call [`init`] or [`auth`] first, and [`logout`] to
//! tear the default client down again.

use std::sync::{PoisonError, RwLock};

use crate::core::{JqClient, JqError};

static DEFAULT: RwLock<Option<JqClient>> = RwLock::new(None);

/// Install `client` as the default, returning the one it replaces.
pub fn init(client: JqClient) -> Option<JqClient> {
    DEFAULT
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(client)
}

/// The default client.
///
/// # Errors
/// `NotInitialized` before [`init`] or [`auth`], and after [`logout`].
pub fn client() -> Result<JqClient, JqError> {
    DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(JqError::NotInitialized)
}

/// True while a default client is installed.
pub fn is_initialized() -> bool {
    DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Log in on the default client, building one from configuration when none is
/// installed.
///
/// # Errors
/// Client construction errors and any error of [`JqClient::auth`]. A client built here
/// stays installed even when the login fails.
pub async fn auth(username: &str, password: &str) -> Result<JqClient, JqError> {
    let client = {
        let mut slot = DEFAULT.write().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Some(client) => client.clone(),
            None => {
                let client = JqClient::builder().build()?;
                *slot = Some(client.clone());
                client
            }
        }
    };
    client.auth(username, password).await?;
    Ok(client)
}

/// Log out and remove the default client. A no-op when none is installed.
pub async fn logout() {
    let client = DEFAULT.write().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(client) = client {
        client.logout().await;
    }
}
