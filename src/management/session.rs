use crate::{management::Storage, types::LoginRecord, utils};

/// Storage key for the persisted login record.
pub const LOGIN_KEY: &str = "login";
/// Storage key for the one-time OAuth state value.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

/// Owner of the persisted session record and the ephemeral OAuth state.
///
/// Storage is the single source of truth: every accessor re-reads it, so
/// consumers never hold a copy that can drift from what is on disk.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Storage,
}

impl SessionManager {
    pub fn new(store: Storage) -> Self {
        SessionManager { store }
    }

    pub fn open_default() -> Self {
        SessionManager {
            store: Storage::open_default(),
        }
    }

    /// Returns the current login record, or `None` when storage holds
    /// nothing usable. Partial records are treated as absent.
    pub async fn login(&self) -> Option<LoginRecord> {
        let record: Option<LoginRecord> = self.store.get(LOGIN_KEY).await;
        record.filter(|r| utils::check_login_record(Some(r)))
    }

    pub async fn set_login(&self, record: &LoginRecord) -> Result<(), String> {
        self.store.set(LOGIN_KEY, record).await
    }

    pub async fn clear_login(&self) {
        self.store.remove(LOGIN_KEY).await;
    }

    /// Whether the persisted record currently amounts to a valid session.
    pub async fn is_authenticated(&self) -> bool {
        self.login().await.is_some()
    }

    pub async fn oauth_state(&self) -> Option<String> {
        self.store.get(OAUTH_STATE_KEY).await
    }

    pub async fn set_oauth_state(&self, state: &str) -> Result<(), String> {
        self.store.set(OAUTH_STATE_KEY, &state.to_string()).await
    }

    pub async fn clear_oauth_state(&self) {
        self.store.remove(OAUTH_STATE_KEY).await;
    }
}
