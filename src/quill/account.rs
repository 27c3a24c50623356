use reqwest::Method;

use crate::{
    error::ApiError,
    quill::client::{ApiClient, expect_success, parse_json},
    types::{ApiKeyResponse, ChangePasswordRequest},
};

/// Fetches the account's post key and its creation time.
pub async fn get_api_key(client: &ApiClient) -> Result<ApiKeyResponse, ApiError> {
    let response = client
        .send_authorized::<()>(Method::GET, "/api/post_key", None, None)
        .await?;

    parse_json(response).await
}

/// Changes the account password. The server answers with a bare
/// acknowledgement, so only the status is checked.
pub async fn change_password(
    client: &ApiClient,
    current_password: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let response = client
        .send_authorized(
            Method::POST,
            "/api/auth/change-password",
            None,
            Some(&ChangePasswordRequest {
                current_password: current_password.to_string(),
                new_password: new_password.to_string(),
            }),
        )
        .await?;

    expect_success(response).await
}
