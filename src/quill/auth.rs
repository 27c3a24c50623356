use std::{sync::Arc, time::Duration};

use reqwest::Method;
use tokio::sync::Mutex;

use crate::{
    error::ApiError,
    info,
    quill::client::{ApiClient, parse_json},
    server::{CallbackContext, start_callback_server},
    types::{
        HandshakeSlot, LoginRecord, LoginRequest, OauthLoginRequest, OauthResult,
        OauthUrlResponse,
    },
    utils, warning,
};

/// How often the login flow checks the handshake slot for a completion
/// message while the browser window is out.
const COMPLETION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Upper bound on one sign-in attempt. The browser gives no signal when the
/// user abandons the page, so the wait is bounded here; reaching the bound
/// is treated as a silent cancellation, not an error.
const MAX_COMPLETION_WAIT: Duration = Duration::from_secs(300);

/// Outcome of one GitHub sign-in attempt. Both `Completed` and `Failed` are
/// terminal for the attempt; a new attempt starts a fresh cycle.
#[derive(Debug)]
pub enum OauthLogin {
    Completed,
    Failed(String),
    Abandoned,
}

/// Signs in with username and password.
///
/// Sends the credentials on the unauthenticated pipeline, validates the
/// response as a complete login record, and persists it. A payload missing
/// either token or the user is rejected outright; a partial session is
/// never stored.
///
/// # Errors
///
/// - [`ApiError::Status`] for rejected credentials
/// - [`ApiError::InvalidResponse`] for incomplete login payloads
/// - [`ApiError::Network`] / [`ApiError::Timeout`] for transport failures
pub async fn login_with_password(
    client: &ApiClient,
    username: &str,
    password: &str,
) -> Result<LoginRecord, ApiError> {
    let response = client
        .anno_request(Method::POST, "/api/auth/login")
        .json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .send()
        .await?;

    let record: LoginRecord = parse_json(response).await?;
    if !utils::check_login_record(Some(&record)) {
        return Err(ApiError::InvalidResponse(
            "login response is missing a token or the user".to_string(),
        ));
    }

    client
        .session()
        .set_login(&record)
        .await
        .map_err(ApiError::Storage)?;
    Ok(record)
}

/// Runs the complete GitHub OAuth sign-in handshake.
///
/// The flow synchronizes two independent actors without a shared process:
/// this function, and the callback handler the authorization server
/// redirects the browser to.
///
/// 1. Fetches the authorization URL from the backend and persists the
///    one-time `state` value it carries.
/// 2. Starts the local callback server and opens the URL in the system
///    browser. If no browser can be opened the attempt ends here.
/// 3. Polls the shared handshake slot every 500ms for the completion
///    message the callback handler publishes after exchanging the code.
/// 4. Clears the stored state value once the handshake settles, and maps
///    the message to [`OauthLogin`]: an empty message is success, anything
///    else is surfaced as a failure, and silence until the wait bound is a
///    cancellation.
///
/// The callback handler persists the login record itself before posting its
/// message, so on `Completed` the session is already in storage.
///
/// # Errors
///
/// Errors are transport or backend failures while preparing the attempt
/// (fetching the URL, missing `state` parameter, persisting it). Outcomes
/// of the handshake itself are expressed through [`OauthLogin`].
pub async fn login_with_github(client: &ApiClient) -> Result<OauthLogin, ApiError> {
    let response = client
        .anno_request(Method::GET, "/api/oauth/url")
        .send()
        .await?;
    let auth_url: OauthUrlResponse = parse_json(response).await?;

    let state = utils::extract_state_param(&auth_url.url).ok_or_else(|| {
        ApiError::InvalidResponse("authorization URL carries no state parameter".to_string())
    })?;
    client
        .session()
        .set_oauth_state(&state)
        .await
        .map_err(ApiError::Storage)?;

    let slot = Arc::new(Mutex::new(HandshakeSlot::default()));
    let context = Arc::new(CallbackContext {
        client: client.clone(),
        slot: Arc::clone(&slot),
    });
    tokio::spawn(async move {
        start_callback_server(context).await;
    });

    if webbrowser::open(&auth_url.url).is_err() {
        // No browser window means no handshake; end the attempt before any
        // polling starts.
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url.url
        );
        client.session().clear_oauth_state().await;
        return Ok(OauthLogin::Failed(
            "could not open a browser window".to_string(),
        ));
    }

    info!("Waiting for the browser sign-in to finish...");
    let outcome = wait_for_completion(slot, MAX_COMPLETION_WAIT).await;
    client.session().clear_oauth_state().await;

    match outcome {
        Some(result) if result.is_success() => Ok(OauthLogin::Completed),
        Some(result) => Ok(OauthLogin::Failed(result.message)),
        None => Ok(OauthLogin::Abandoned),
    }
}

/// Polls the handshake slot until a completion message arrives or the wait
/// bound is reached. The slot hands each message out at most once, so a
/// duplicate or late message cannot complete a second attempt.
pub async fn wait_for_completion(
    slot: Arc<Mutex<HandshakeSlot>>,
    max_wait: Duration,
) -> Option<OauthResult> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        {
            let mut slot = slot.lock().await;
            if let Some(outcome) = slot.take_outcome() {
                return Some(outcome);
            }
        }
        tokio::time::sleep(COMPLETION_POLL_INTERVAL).await;
    }

    None
}

/// Exchanges an authorization code for a login record.
///
/// Runs inside the callback handler. Sends the code together with the
/// stored one-time state (header `X-Oauth-State`) and the state echoed by
/// the authorization server (query `state`) so the backend can reject a
/// response that belongs to a different attempt. A complete record is
/// persisted before this returns; an incomplete one is rejected and nothing
/// is stored.
pub async fn exchange_code(
    client: &ApiClient,
    code: &str,
    state: &str,
) -> Result<LoginRecord, ApiError> {
    let stored_state = client.session().oauth_state().await.unwrap_or_default();

    let response = client
        .anno_request(Method::POST, "/api/oauth/login")
        .header("X-Oauth-State", stored_state)
        .query(&[("state", state)])
        .json(&OauthLoginRequest {
            code: code.to_string(),
        })
        .send()
        .await?;

    let record: LoginRecord = parse_json(response).await?;
    if !utils::check_login_record(Some(&record)) {
        return Err(ApiError::InvalidResponse(
            "login response is missing a token or the user".to_string(),
        ));
    }

    client
        .session()
        .set_login(&record)
        .await
        .map_err(ApiError::Storage)?;
    Ok(record)
}

/// Ends the session: removes the persisted record and any leftover OAuth
/// state. Purely local; the backend keeps no session to invalidate.
pub async fn logout(client: &ApiClient) {
    client.session().clear_login().await;
    client.session().clear_oauth_state().await;
}
