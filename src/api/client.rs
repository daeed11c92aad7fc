//! HTTP client for the dashboard backend
//!
//! One reqwest::Client shared across all calls, with the auth and
//! dashboard surfaces split into traits so the session and query layers
//! can be tested against mock collaborators.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use super::errors::{ApiError, ApiResult};
use super::types::{
    AuthResponse, CreateWebhookRequest, LoginRequest, ProfileUpdate, Quote, RegisterRequest,
    ScreenerRequest, ScreenerRow, User, Webhook,
};

/// Timeout for REST API calls (10 seconds)
const REST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Authentication surface of the backend
///
/// Consumed by the session manager; mocked in tests so the session
/// state machine can be exercised without a network.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Validate a bearer token and return the identity behind it
    async fn me(&self, token: &str) -> ApiResult<User>;

    /// Exchange credentials for a token + user
    async fn login(&self, req: &LoginRequest) -> ApiResult<AuthResponse>;

    /// Create an account and log it in, in one step
    async fn register(&self, req: &RegisterRequest) -> ApiResult<AuthResponse>;

    /// Apply a partial profile update, returning the full updated user
    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> ApiResult<User>;
}

/// Data surface of the backend (market data, screener, webhooks)
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn quotes(&self, token: &str, symbols: &[String]) -> ApiResult<Vec<Quote>>;

    async fn run_screener(&self, token: &str, req: &ScreenerRequest)
        -> ApiResult<Vec<ScreenerRow>>;

    async fn list_webhooks(&self, token: &str) -> ApiResult<Vec<Webhook>>;

    async fn create_webhook(&self, token: &str, req: &CreateWebhookRequest) -> ApiResult<Webhook>;

    async fn delete_webhook(&self, token: &str, id: Uuid) -> ApiResult<()>;
}

// ============================================================================
// ApiClient
// ============================================================================

/// Concrete reqwest-backed implementation of both API surfaces
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Backend base URL without trailing slash
    base_url: String,
    /// HTTP client shared across all requests
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(REST_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map an HTTP response to a parsed body or an ApiError
    ///
    /// 200/201 parse the JSON body; 401 becomes Unauthorized; every other
    /// status carries its body for logging.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(ApiError::Parse)
            }
            StatusCode::UNAUTHORIZED => {
                let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
                Err(ApiError::Unauthorized(body))
            }
            status => {
                let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// Map a response where success carries no meaningful body
    async fn decode_empty(response: reqwest::Response) -> ApiResult<()> {
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::UNAUTHORIZED => {
                let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
                Err(ApiError::Unauthorized(body))
            }
            status => {
                let body = response.text().await.unwrap_or_else(|_| "<no body>".to_string());
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn me(&self, token: &str) -> ApiResult<User> {
        debug!("GET /api/auth/me");
        let response = self
            .http_client
            .get(self.url("/api/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn login(&self, req: &LoginRequest) -> ApiResult<AuthResponse> {
        debug!(username = %req.username, "POST /api/auth/login");
        let response = self
            .http_client
            .post(self.url("/api/auth/login"))
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn register(&self, req: &RegisterRequest) -> ApiResult<AuthResponse> {
        debug!(username = %req.username, "POST /api/auth/register");
        let response = self
            .http_client
            .post(self.url("/api/auth/register"))
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> ApiResult<User> {
        debug!("PUT /api/users/profile");
        let response = self
            .http_client
            .put(self.url("/api/users/profile"))
            .bearer_auth(token)
            .json(update)
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn quotes(&self, token: &str, symbols: &[String]) -> ApiResult<Vec<Quote>> {
        debug!(symbols = ?symbols, "GET /api/market/quotes");
        let response = self
            .http_client
            .get(self.url("/api/market/quotes"))
            .query(&[("symbols", symbols.join(","))])
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn run_screener(
        &self,
        token: &str,
        req: &ScreenerRequest,
    ) -> ApiResult<Vec<ScreenerRow>> {
        debug!("POST /api/screener/run");
        let response = self
            .http_client
            .post(self.url("/api/screener/run"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn list_webhooks(&self, token: &str) -> ApiResult<Vec<Webhook>> {
        debug!("GET /api/webhooks");
        let response = self
            .http_client
            .get(self.url("/api/webhooks"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn create_webhook(&self, token: &str, req: &CreateWebhookRequest) -> ApiResult<Webhook> {
        debug!(url = %req.url, "POST /api/webhooks");
        let response = self
            .http_client
            .post(self.url("/api/webhooks"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_webhook(&self, token: &str, id: Uuid) -> ApiResult<()> {
        debug!(id = %id, "DELETE /api/webhooks/{{id}}");
        let response = self
            .http_client
            .delete(self.url(&format!("/api/webhooks/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode_empty(response).await
    }
}

// ============================================================================
// Tests
// ============================================================================
