use reqwest::Method;

use crate::{
    error::ApiError,
    quill::client::{ApiClient, parse_json},
    types::{CreateTestPostRequest, CreateTestPostResponse, PostsPage},
};

/// Fetches one page of the account's posts.
///
/// Runs on the authenticated pipeline: the request carries the stored
/// bearer token and is retried once behind a coordinated token refresh if
/// the server answers 401.
pub async fn fetch_posts(client: &ApiClient, page: u32, limit: u32) -> Result<PostsPage, ApiError> {
    let query = [
        ("page", page.to_string()),
        ("limit", limit.to_string()),
    ];
    let response = client
        .send_authorized::<()>(Method::GET, "/api/posts", Some(&query), None)
        .await?;

    parse_json(response).await
}

/// Creates a test post through the capability URL.
///
/// The post key acts as the credential here, so the request goes out on the
/// unauthenticated pipeline.
pub async fn create_test_post(
    client: &ApiClient,
    post_key: &str,
    title: &str,
    body: &str,
) -> Result<CreateTestPostResponse, ApiError> {
    let response = client
        .anno_request(Method::POST, &format!("/{post_key}"))
        .json(&CreateTestPostRequest {
            title: title.to_string(),
            body: body.to_string(),
        })
        .send()
        .await?;

    parse_json(response).await
}
