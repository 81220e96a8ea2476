use delia_core::api::ApiClient;
use delia_core::auth::TokenStore;

use crate::events::UiEvent;

/// Logs in and stores the token.
///
/// A token that cannot be written to disk still logs the session in; only
/// the next launch will ask again.
pub async fn login(
    client: ApiClient,
    store: TokenStore,
    username: String,
    password: String,
) -> UiEvent {
    let result = client
        .login(&username, &password)
        .await
        .map(|response| response.access_token);
    if let Ok(token) = &result
        && let Err(err) = store.save(token)
    {
        tracing::warn!("could not store token: {err:#}");
    }
    UiEvent::LoginResult(result)
}

/// Deletes the stored token.
pub fn clear_token(store: &TokenStore) {
    match store.clear() {
        Ok(true) => tracing::info!("stored token removed"),
        Ok(false) => {}
        Err(err) => tracing::warn!("could not remove token: {err:#}"),
    }
}
