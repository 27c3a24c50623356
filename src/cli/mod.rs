//! # CLI Module
//!
//! User-facing commands for the Quill CLI. Each command wires user input to
//! the backend integration layer in [`crate::quill`] and renders the result
//! with the shared status macros and tables.
//!
//! ## Command Categories
//!
//! ### Session
//!
//! - [`login`] - Password sign-in, or the GitHub OAuth browser handshake
//! - [`logout`] - Removes the persisted session record
//! - [`whoami`] - Shows the signed-in user
//!
//! ### Account
//!
//! - [`dashboard`] - Shows the account API key and when it was created
//! - [`change_password`] - Interactive password change
//!
//! ### Posts
//!
//! - [`list_posts`] - Paginated table of the account's posts
//! - [`create_test_post`] - Creates a post through the capability URL
//!
//! ## Session guarding
//!
//! Commands that need a session check the persisted record first and point
//! the user at `quillcli login` instead of sending requests that are bound
//! to be rejected. The inverse guard applies to `login`, which reports the
//! current user when a valid session already exists.
//!
//! Session-ending failures (an exhausted token refresh) surface as
//! [`crate::error::ApiError::SessionExpired`] and are handled in one place
//! here rather than at every call site.

mod account;
mod auth;
mod posts;

pub use account::change_password;
pub use account::dashboard;
pub use auth::login;
pub use auth::logout;
pub use auth::whoami;
pub use posts::create_test_post;
pub use posts::list_posts;

use crate::{
    config, error,
    error::ApiError,
    management::SessionManager,
    quill::client::ApiClient,
    types::LoginRecord,
};

/// Builds the backend client from the environment configuration.
pub(crate) fn api_client() -> ApiClient {
    let session = SessionManager::open_default();
    match ApiClient::new(config::api_base_url(), config::language(), session) {
        Ok(client) => client,
        Err(e) => error!("Failed to initialize HTTP client: {}", e),
    }
}

/// Route guard for commands that need a session. Diverges with a sign-in
/// hint when storage holds no valid record.
pub(crate) async fn require_session(client: &ApiClient) -> LoginRecord {
    match client.session().login().await {
        Some(record) => record,
        None => error!("You are not signed in. Run quillcli login first."),
    }
}

/// Central handler for command-level failures. Session-ending errors get
/// the sign-in hint; everything else is printed as-is.
pub(crate) fn fail(err: ApiError) -> ! {
    match err {
        ApiError::SessionExpired => {
            error!("Session expired. Run quillcli login to sign in again.")
        }
        e => error!("{}", e),
    }
}
