use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{types::AuthorizationState, warning};

/// Receives the redirect from Spotify's authorization page.
///
/// The `state` parameter must match the pending authorization; only then is
/// the code stored for the waiting auth flow to exchange.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<AuthorizationState>>>>,
) -> Html<&'static str> {
    if let Some(reason) = params.get("error") {
        warning!("Authorization was declined: {}", reason);
        return Html("<h4>Authorization failed. Please try again.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let mut state = shared_state.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    if params.get("state") != Some(&pending.state) {
        warning!("Ignoring callback with an unexpected state parameter");
        return Html("<h4>Authorization state mismatch.</h4>");
    }

    pending.code = Some(code.clone());
    Html("<h2>Authorization successful.</h2><p>You can close this window.</p>")
}
