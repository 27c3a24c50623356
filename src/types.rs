use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Message type tag carried by every OAuth completion message.
pub const OAUTH_RESULT_TYPE: &str = "oauth_result";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_id: Option<i64>,
}

/// The persisted session record. Every field is defaulted on deserialization
/// so that partial payloads parse and are then rejected by
/// [`crate::utils::check_login_record`] instead of erroring mid-read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRecord {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthUrlResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthLoginRequest {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponse {
    pub post_key: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListItem {
    pub id: String,
    pub title: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsPage {
    pub posts: Vec<PostListItem>,
    pub pagination: Pagination,
}

#[derive(Tabled)]
pub struct PostTableRow {
    pub id: String,
    pub title: String,
    pub created: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTestPostRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTestPostResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Completion message posted by the OAuth callback handler to the waiting
/// login flow. An empty `message` signals success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OauthResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl OauthResult {
    pub fn success() -> Self {
        OauthResult {
            kind: OAUTH_RESULT_TYPE.to_string(),
            message: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        OauthResult {
            kind: OAUTH_RESULT_TYPE.to_string(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.message.is_empty()
    }
}

/// Shared slot between the callback handler and the login flow polling it.
///
/// The handler publishes at most one completion message; the poller takes it
/// at most once. Duplicate or late messages therefore cannot re-trigger
/// navigation or teardown.
#[derive(Debug, Default)]
pub struct HandshakeSlot {
    outcome: Option<OauthResult>,
    exchanged: bool,
}

impl HandshakeSlot {
    /// Marks the code exchange as started. Returns false if it already ran,
    /// so a re-delivered callback request cannot fire the exchange twice.
    pub fn begin_exchange(&mut self) -> bool {
        if self.exchanged {
            return false;
        }
        self.exchanged = true;
        true
    }

    /// Publishes the completion message. Only the first publication sticks.
    pub fn publish(&mut self, result: OauthResult) {
        if self.outcome.is_none() {
            self.outcome = Some(result);
        }
    }

    /// Removes and returns the completion message, if one has arrived.
    pub fn take_outcome(&mut self) -> Option<OauthResult> {
        self.outcome.take()
    }
}
