//! HTTP plumbing shared by every endpoint group
//!
//! The client attaches the stored bearer token to each request and turns
//! non-success responses into `ApiError`s. A 401 also wipes the stored
//! session so the next command starts from a clean "logged out" state.

use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::api::types::{ErrorBody, LoginRequest, LoginResponse, User};
use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use crate::storage::KeyValueStore;

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key for the cached user record (JSON)
pub const USER_KEY: &str = "user";

/// Typed client for the costing backend
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    /// Create a client from configuration
    ///
    /// `session` holds the auth token and cached user between runs.
    pub fn new(config: &ApiConfig, session: Arc<dyn KeyValueStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("printquote/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/api/jobs`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The stored bearer token, if any
    ///
    /// A storage failure is logged and treated as "no token".
    pub fn token(&self) -> Option<String> {
        match self.session.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read auth token: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// The user cached at login, without a network round trip
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.session.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read cached user: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("Ignoring unreadable cached user: {}", e);
                None
            }
        }
    }

    /// Forget the stored token and user
    pub fn clear_session(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.session.remove(key) {
                tracing::warn!("Failed to clear '{}' from session storage: {}", key, e);
            }
        }
    }

    /// Start a request with JSON and auth headers attached
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = self.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and map failure statuses to errors
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status();

        tracing::debug!("{} {}", status.as_u16(), response.url().path());

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("Backend rejected credentials, clearing session");
            self.clear_session();
        }
        Err(status_error(status, &body).into())
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    pub(crate) async fn get_json_query<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        decode(response).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path).json(body)).await?;
        decode(response).await
    }

    pub(crate) async fn send_bytes(&self, method: Method, path: &str) -> Result<Vec<u8>> {
        let response = self
            .send(self.request(method, path).body("{}"))
            .await?;
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        Ok(bytes.to_vec())
    }

    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        self.send(self.request(method, path)).await?;
        Ok(())
    }

    /// Log in and store the returned token and user
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        tracing::debug!("Logging in as {} at {}", email, self.base_url);

        let response: LoginResponse = self
            .send_json(Method::POST, "/api/auth/login", &request)
            .await?;

        self.session.set(TOKEN_KEY, &response.token)?;
        let user = serde_json::to_string(&response.user)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.session.set(USER_KEY, &user)?;

        Ok(response)
    }

    /// Log out on the backend and clear the local session
    ///
    /// The local session is cleared even when the backend call fails. A 401
    /// from the backend counts as success since the session is gone anyway.
    pub async fn logout(&self) -> Result<()> {
        let result = self.send_empty(Method::POST, "/api/auth/logout").await;
        self.clear_session();

        match result {
            Err(crate::PrintQuoteError::Api(ApiError::Unauthorized(_))) => Ok(()),
            other => other,
        }
    }

    /// Fetch the logged-in user from the backend
    pub async fn me(&self) -> Result<User> {
        self.get_json("/api/auth/me").await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await.map_err(ApiError::from)?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()).into())
}

/// Map a failure status and body to an error
///
/// Prefers the backend's `{"error": "..."}` message, then the raw body, then
/// the status reason phrase.
pub fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Role;
    use crate::storage::MemoryStore;

    fn client_with(store: Arc<MemoryStore>) -> ApiClient {
        let config = ApiConfig {
            base_url: "http://quotes.test:8080/".to_string(),
            timeout_secs: 5,
        };
        ApiClient::new(&config, store).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = client_with(Arc::new(MemoryStore::new()));
        assert_eq!(client.base_url(), "http://quotes.test:8080");
        assert_eq!(client.url("/api/jobs"), "http://quotes.test:8080/api/jobs");
        assert_eq!(client.url("api/jobs"), "http://quotes.test:8080/api/jobs");
    }

    #[test]
    fn test_request_without_token_has_no_auth_header() {
        let client = client_with(Arc::new(MemoryStore::new()));
        let request = client.request(Method::GET, "/api/jobs").build().unwrap();

        assert!(request.headers().get(header::AUTHORIZATION).is_none());
        assert_eq!(
            request.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_request_with_token_is_bearer() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "abc123").unwrap();
        let client = client_with(store);

        let request = client.request(Method::POST, "/api/cost/calculate").build().unwrap();
        assert_eq!(
            request.headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer abc123"
        );
        assert!(client.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "").unwrap();
        let client = client_with(store);
        assert_eq!(client.token(), None);
    }

    #[test]
    fn test_clear_session_removes_token_and_user() {
        let store = Arc::new(MemoryStore::new());
        store.set(TOKEN_KEY, "abc").unwrap();
        store.set(USER_KEY, "{}").unwrap();
        store.set("preferredCurrency", "EUR").unwrap();

        let client = client_with(store.clone());
        client.clear_session();

        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_KEY).unwrap(), None);
        assert_eq!(store.get("preferredCurrency").unwrap().as_deref(), Some("EUR"));
    }

    #[test]
    fn test_current_user_from_cache() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                USER_KEY,
                r#"{"id":"u1","email":"ana@example.com","name":"Ana","role":"Manager"}"#,
            )
            .unwrap();
        let client = client_with(store.clone());

        let user = client.current_user().unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.role, Role::Manager);

        store.set(USER_KEY, "garbage").unwrap();
        assert!(client.current_user().is_none());
    }

    #[test]
    fn test_status_error_prefers_error_body() {
        let err = status_error(StatusCode::BAD_REQUEST, r#"{"error":"quantity required","status":400}"#);
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "quantity required");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_error_variants() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized(msg) if msg == "Unauthorized"
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "no such job"),
            ApiError::NotFound(msg) if msg == "no such job"
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "  "),
            ApiError::Status { status: 500, message } if message == "Internal Server Error"
        ));
    }
}
