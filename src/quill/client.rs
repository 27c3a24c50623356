use std::{sync::Arc, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::ApiError,
    management::SessionManager,
    quill::refresh::{RefreshCoordinator, RefreshTicket},
    types::{LoginRecord, RefreshRequest},
    utils,
};

/// Fixed timeout applied to every request on both pipelines.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP access to the Quill backend.
///
/// Holds two request pipelines over a shared base address: `anno` sends
/// plain requests, `auth` re-reads the stored login record before each
/// request, attaches the bearer token, and runs the refresh protocol when
/// the server answers 401. Both attach an Accept-Language header computed
/// from the active UI language.
///
/// Cloning is cheap and clones share the same session store and refresh
/// coordinator, so the single-flight guarantee holds across clones.
#[derive(Debug, Clone)]
pub struct ApiClient {
    anno: Client,
    auth: Client,
    base_url: String,
    language: String,
    session: SessionManager,
    refresh: Arc<RefreshCoordinator>,
}

impl ApiClient {
    pub fn new(
        base_url: String,
        language: String,
        session: SessionManager,
    ) -> Result<Self, ApiError> {
        let anno = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let auth = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(ApiClient {
            anno,
            auth,
            base_url: base_url.trim_end_matches('/').to_string(),
            language,
            session,
            refresh: Arc::new(RefreshCoordinator::new()),
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// A request on the unauthenticated pipeline. Carries the locale header
    /// and nothing else.
    pub fn anno_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.anno.request(method, self.url(path)).header(
            header::ACCEPT_LANGUAGE,
            utils::accept_language_header(&self.language),
        )
    }

    /// Sends a request on the authenticated pipeline, handling 401 per the
    /// refresh protocol: a pure network failure propagates untouched, the
    /// first 401 triggers one coordinated refresh and one resubmission with
    /// the new token, and a second 401 on the resubmission tears the session
    /// down. Non-401 responses are returned as-is for the caller to map.
    pub async fn send_authorized<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&T>,
    ) -> Result<Response, ApiError> {
        let first = self
            .dispatch_authorized(method.clone(), path, query, body, None)
            .await?;
        if first.status() != StatusCode::UNAUTHORIZED {
            return Ok(first);
        }

        // First 401 for this request: this is its one permitted retry.
        let token = self.refresh_access_token().await?;
        let second = self
            .dispatch_authorized(method, path, query, body, Some(&token))
            .await?;
        if second.status() == StatusCode::UNAUTHORIZED {
            // Already retried once; a second rejection is unrecoverable.
            self.session.clear_login().await;
            return Err(ApiError::SessionExpired);
        }

        Ok(second)
    }

    async fn dispatch_authorized<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&T>,
        bearer_override: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self.auth.request(method, self.url(path)).header(
            header::ACCEPT_LANGUAGE,
            utils::accept_language_header(&self.language),
        );

        // Read the record fresh before every request; a missing token is not
        // an error here, the server rejects the request instead.
        let bearer = match bearer_override {
            Some(token) => Some(token.to_string()),
            None => self
                .session
                .login()
                .await
                .map(|record| record.access_token)
                .filter(|token| !token.is_empty()),
        };
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Obtains a fresh access token, issuing at most one refresh call no
    /// matter how many requests hit 401 concurrently. Followers suspend on
    /// the coordinator queue and are replayed with the leader's outcome.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        match self.refresh.join() {
            RefreshTicket::Follower(rx) => match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(ApiError::SessionExpired),
            },
            RefreshTicket::Leader => {
                let outcome = self.run_refresh().await;
                self.refresh.settle(&outcome);
                outcome
            }
        }
    }

    /// The leader path: reads the stored refresh token, exchanges it, and
    /// persists the new record. Any failure destroys the session record so
    /// the next command lands on the sign-in guard.
    async fn run_refresh(&self) -> Result<String, ApiError> {
        let refresh_token = match self.session.login().await {
            Some(record) if !record.refresh_token.is_empty() => record.refresh_token,
            _ => {
                self.session.clear_login().await;
                return Err(ApiError::SessionExpired);
            }
        };

        let outcome = self.request_refresh(&refresh_token).await;
        if outcome.is_err() {
            self.session.clear_login().await;
        }
        outcome
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response = self
            .anno_request(Method::POST, "/api/auth/refresh")
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let record: LoginRecord = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        if !utils::check_login_record(Some(&record)) {
            return Err(ApiError::InvalidResponse(
                "refresh response is missing a token or the user".to_string(),
            ));
        }

        self.session
            .set_login(&record)
            .await
            .map_err(ApiError::Storage)?;
        Ok(record.access_token)
    }
}

/// Maps a response to `R`, turning non-success statuses into
/// [`ApiError::Status`] with the server's message when one is present.
pub async fn parse_json<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Checks a response for success, discarding any body.
pub async fn expect_success(response: Response) -> Result<(), ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(())
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .or_else(|| body.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "request failed".to_string());

    ApiError::Status { status, message }
}
