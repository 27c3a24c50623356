use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Method;
use serde_json::json;

use quillcli::{
    error::ApiError,
    management::{SessionManager, Storage},
    quill::{account, auth, client::ApiClient},
    types::{LoginRecord, User},
};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let counter = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "quillcli-refresh-test-{}-{}-{}",
        std::process::id(),
        nanos,
        counter
    ));
    dir
}

fn seeded_record(access: &str, refresh: &str) -> LoginRecord {
    LoginRecord {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        user: Some(User {
            id: Some(1),
            username: "tester".to_string(),
            post_key: None,
            github_id: None,
        }),
    }
}

/// Scripted stand-in for the Quill backend.
struct TestBackend {
    /// Bearer token the protected endpoints accept; `None` rejects everyone.
    bearer_accept: Option<String>,
    /// Whether the refresh endpoint hands out a new record or rejects.
    refresh_ok: bool,
    /// Delay before the refresh endpoint answers, so that every concurrent
    /// 401 lands while the refresh is still in flight.
    refresh_delay: Duration,
    refresh_calls: AtomicUsize,
    seen_authorization: Mutex<Option<String>>,
    seen_accept_language: Mutex<Option<String>>,
}

impl TestBackend {
    fn new(bearer_accept: Option<&str>, refresh_ok: bool, refresh_delay: Duration) -> Arc<Self> {
        Arc::new(TestBackend {
            bearer_accept: bearer_accept.map(str::to_string),
            refresh_ok,
            refresh_delay,
            refresh_calls: AtomicUsize::new(0),
            seen_authorization: Mutex::new(None),
            seen_accept_language: Mutex::new(None),
        })
    }
}

fn bearer_of(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn accepts(backend: &TestBackend, headers: &HeaderMap) -> bool {
    match &backend.bearer_accept {
        Some(token) => bearer_of(headers) == format!("Bearer {token}"),
        None => false,
    }
}

async fn posts_handler(
    State(backend): State<Arc<TestBackend>>,
    headers: HeaderMap,
) -> Response {
    if accepts(&backend, &headers) {
        Json(json!({
            "posts": [{"id": "p1", "title": "First post", "created_at": "2026-08-01T10:00:00Z"}],
            "pagination": {"page": 1, "limit": 20, "total": 1, "total_pages": 1}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "unauthorized"})),
        )
            .into_response()
    }
}

async fn post_key_handler(
    State(backend): State<Arc<TestBackend>>,
    headers: HeaderMap,
) -> Response {
    *backend.seen_authorization.lock().unwrap() = Some(bearer_of(&headers));
    *backend.seen_accept_language.lock().unwrap() = headers
        .get("accept-language")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if accepts(&backend, &headers) {
        Json(json!({"post_key": "k1", "created_at": "2026-08-01T10:00:00Z"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "unauthorized"})),
        )
            .into_response()
    }
}

async fn refresh_handler(State(backend): State<Arc<TestBackend>>) -> Response {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(backend.refresh_delay).await;

    if backend.refresh_ok {
        Json(json!({
            "access_token": "t2",
            "refresh_token": "r2",
            "user": {"id": 1, "username": "tester"}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "refresh rejected"})),
        )
            .into_response()
    }
}

async fn login_handler() -> Response {
    Json(json!({
        "access_token": "t",
        "refresh_token": "r",
        "user": {"id": 1, "username": "tester"}
    }))
    .into_response()
}

async fn start_backend(backend: Arc<TestBackend>) -> SocketAddr {
    let app = Router::new()
        .route("/api/posts", get(posts_handler))
        .route("/api/post_key", get(post_key_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/login", post(login_handler))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn client_against(addr: SocketAddr) -> ApiClient {
    let session = SessionManager::new(Storage::new(temp_dir()));
    ApiClient::new(format!("http://{addr}"), "en".to_string(), session).unwrap()
}

#[tokio::test]
async fn test_concurrent_401s_issue_exactly_one_refresh() {
    // Protected endpoints only accept the refreshed token; the refresh
    // answer is delayed so all six rejections land while it is in flight.
    let backend = TestBackend::new(Some("t2"), true, Duration::from_millis(500));
    let addr = start_backend(Arc::clone(&backend)).await;

    let client = client_against(addr).await;
    client
        .session()
        .set_login(&seeded_record("t", "r"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .send_authorized::<()>(Method::GET, "/api/posts", None, None)
                .await
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    // One refresh for six concurrent failures
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);

    // The renewed record was persisted
    let record = client.session().login().await.unwrap();
    assert_eq!(record.access_token, "t2");
    assert_eq!(record.refresh_token, "r2");
}

#[tokio::test]
async fn test_failed_refresh_rejects_all_pending_and_clears_session() {
    let backend = TestBackend::new(Some("t2"), false, Duration::from_millis(500));
    let addr = start_backend(Arc::clone(&backend)).await;

    let client = client_against(addr).await;
    client
        .session()
        .set_login(&seeded_record("t", "r"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .send_authorized::<()>(Method::GET, "/api/posts", None, None)
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_err());
    }

    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(client.session().login().await.is_none());
}

#[tokio::test]
async fn test_retried_request_rejected_again_ends_session() {
    // The refresh succeeds, but the protected endpoint rejects every token:
    // the one permitted retry fails and the session is torn down without a
    // second refresh.
    let backend = TestBackend::new(None, true, Duration::from_millis(0));
    let addr = start_backend(Arc::clone(&backend)).await;

    let client = client_against(addr).await;
    client
        .session()
        .set_login(&seeded_record("t", "r"))
        .await
        .unwrap();

    let result = client
        .send_authorized::<()>(Method::GET, "/api/posts", None, None)
        .await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));

    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(client.session().login().await.is_none());
}

#[tokio::test]
async fn test_401_without_refresh_token_ends_session_without_refresh_call() {
    let backend = TestBackend::new(None, true, Duration::from_millis(0));
    let addr = start_backend(Arc::clone(&backend)).await;

    let client = client_against(addr).await;
    // Nothing stored at all: the request goes out without a bearer, the
    // server rejects it, and there is no refresh token to try.
    let result = client
        .send_authorized::<()>(Method::GET, "/api/posts", None, None)
        .await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_password_login_persists_record_and_bearer_follows() {
    let backend = TestBackend::new(Some("t"), true, Duration::from_millis(0));
    let addr = start_backend(Arc::clone(&backend)).await;
    let client = client_against(addr).await;

    let record = auth::login_with_password(&client, "tester", "secret")
        .await
        .unwrap();
    assert_eq!(record.access_token, "t");
    assert_eq!(record.refresh_token, "r");

    // Persisted record equals the payload
    let stored = client.session().login().await.unwrap();
    assert_eq!(stored.access_token, "t");
    assert_eq!(stored.refresh_token, "r");
    assert_eq!(stored.user.unwrap().username, "tester");

    // The next authenticated request carries the stored token and locale
    let api_key = account::get_api_key(&client).await.unwrap();
    assert_eq!(api_key.post_key, "k1");
    assert_eq!(
        backend.seen_authorization.lock().unwrap().as_deref(),
        Some("Bearer t")
    );
    assert_eq!(
        backend.seen_accept_language.lock().unwrap().as_deref(),
        Some("en-US,en;q=0.9")
    );
}

#[tokio::test]
async fn test_result_after_refresh_reaches_caller_with_new_bearer() {
    // The stored token is stale; the caller still gets the post key, never
    // the 401, and the resubmission carries the refreshed token.
    let backend = TestBackend::new(Some("t2"), true, Duration::from_millis(0));
    let addr = start_backend(Arc::clone(&backend)).await;

    let client = client_against(addr).await;
    client
        .session()
        .set_login(&seeded_record("t", "r"))
        .await
        .unwrap();

    let api_key = account::get_api_key(&client).await.unwrap();
    assert_eq!(api_key.post_key, "k1");

    assert_eq!(backend.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        backend.seen_authorization.lock().unwrap().as_deref(),
        Some("Bearer t2")
    );

    let record = client.session().login().await.unwrap();
    assert_eq!(record.access_token, "t2");
}
