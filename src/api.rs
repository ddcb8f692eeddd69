//! Client for the remote task API.
//!
//! Two endpoints: a health check (`GET /api/hello`) and a login
//! (`POST /api/auth/login`) that authorizes the session when the response
//! names a user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without trailing slash
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Get the health check endpoint URL.
    pub fn hello_url(&self) -> String {
        format!("{}/api/hello", self.base_url)
    }

    /// Get the login endpoint URL.
    pub fn login_url(&self) -> String {
        format!("{}/api/auth/login", self.base_url)
    }
}

impl From<&crate::config::Config> for ApiConfig {
    fn from(config: &crate::config::Config) -> Self {
        Self::new(config.api_base_url.clone())
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("API config error: {0}")]
    Config(String),
    #[error("API network error: {0}")]
    Network(String),
    #[error("API server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("API response error: {0}")]
    Response(String),
    #[error("login rejected: response carries no user name")]
    Unauthorized,
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub pass: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LoginResponse {
    data: Option<LoginData>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoginData {
    user: Option<LoginUser>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoginUser {
    name: Option<String>,
}

/// Extract the authorized user name from a login response body.
pub fn user_name(body: &serde_json::Value) -> Result<String, ApiError> {
    let response: LoginResponse = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::Response(e.to_string()))?;

    response
        .data
        .and_then(|d| d.user)
        .and_then(|u| u.name)
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::Unauthorized)
}

fn device_id() -> String {
    let hostname = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!(
        "sensor-hooks-{}-{}",
        hostname,
        &uuid::Uuid::new_v4().to_string()[..8]
    )
}

/// Async API client.
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::Client,
    device_id: String,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            device_id: device_id(),
        })
    }

    /// Call the health check endpoint and return its JSON body.
    pub async fn hello(&self) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .get(self.config.hello_url())
            .header("X-Device-Id", &self.device_id)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::json_body(response).await
    }

    /// Log in and return the user name the server reports.
    pub async fn login(&self, email: &str, pass: &str) -> Result<String, ApiError> {
        if email.is_empty() || pass.is_empty() {
            return Err(ApiError::MissingCredentials);
        }

        let response = self
            .client
            .post(self.config.login_url())
            .header("X-Device-Id", &self.device_id)
            .json(&LoginRequest { email, pass })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let body = Self::json_body(response).await?;
        let name = user_name(&body)?;
        tracing::info!(user = %name, "logged in");
        Ok(name)
    }

    async fn json_body(response: reqwest::Response) -> Result<serde_json::Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Response(e.to_string()))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// Blocking API client for use in synchronous contexts.
pub struct BlockingApiClient {
    inner: ApiClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: ApiClient::new(config)?,
            runtime,
        })
    }

    pub fn hello(&self) -> Result<serde_json::Value, ApiError> {
        self.runtime.block_on(self.inner.hello())
    }

    pub fn login(&self, email: &str, pass: &str) -> Result<String, ApiError> {
        self.runtime.block_on(self.inner.login(email, pass))
    }

    pub fn device_id(&self) -> &str {
        self.inner.device_id()
    }
}
