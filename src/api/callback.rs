use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{
    quill::auth::exchange_code,
    server::CallbackContext,
    types::OauthResult,
    warning,
};

/// Handles the authorization redirect from the identity provider.
///
/// Exchanges the code for a session and publishes the outcome to the login
/// flow polling the handshake slot. The exchange runs at most once per
/// attempt: a re-delivered redirect finds the guard already set and does
/// nothing.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(context): Extension<Arc<CallbackContext>>,
) -> Html<&'static str> {
    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };
    let state = params.get("state").cloned().unwrap_or_default();

    {
        let mut slot = context.slot.lock().await;
        if !slot.begin_exchange() {
            return Html("<h4>Sign-in already handled.</h4>");
        }
    }

    match exchange_code(&context.client, code, &state).await {
        Ok(_) => {
            let mut slot = context.slot.lock().await;
            slot.publish(OauthResult::success());
            Html("<h2>Sign-in successful.</h2><p>You can close this window.</p>")
        }
        Err(e) => {
            warning!("Code exchange failed: {}", e);
            let mut slot = context.slot.lock().await;
            slot.publish(OauthResult::failure(e.to_string()));
            Html("<h4>Sign-in failed.</h4>")
        }
    }
}
