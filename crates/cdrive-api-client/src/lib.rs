//! HTTP client for the CDrive API.
//!
//! This is the only component that talks to the network. Every request carries
//! the current session token as a bearer credential when one is present, and
//! every failure is normalized into `cdrive_core::ClientError` before it leaves
//! this crate. Domain operations live in [`api`] behind the [`Gateway`] trait.

pub mod api;
pub mod gateway;

use std::sync::Arc;

use bytes::Bytes;
use cdrive_core::{Acknowledgement, ClientConfig, ClientError, SessionStore};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

pub use gateway::Gateway;

/// Message used when a failure carries a JSON body without a `message` field.
pub const GENERIC_FAILURE: &str = "API request failed";

/// Message used when a failure carries no structured body at all.
pub const NON_JSON_FAILURE: &str = "API request failed with non-JSON response";

/// Fallback for a structured passcode rejection without a `message` field.
pub const VERIFY_FAILURE: &str = "Failed to verify OTP";

/// Which family of endpoints a request belongs to. Decides how a structured
/// failure is classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorScope {
    /// register, login
    Auth,
    /// passcode verification
    Verify,
    /// everything under `/files`
    Files,
}

impl ErrorScope {
    fn fallback_message(self) -> &'static str {
        match self {
            ErrorScope::Verify => VERIFY_FAILURE,
            ErrorScope::Auth | ErrorScope::Files => GENERIC_FAILURE,
        }
    }
}

/// HTTP client for the CDrive API with session-based auth.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Create client from environment: CDRIVE_API_URL (or API_URL).
    pub fn from_env(session: Arc<dyn SessionStore>) -> Result<Self, ClientError> {
        Self::new(&ClientConfig::from_env(), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send a request and return the raw success body.
    async fn execute(
        &self,
        request: RequestBuilder,
        scope: ErrorScope,
    ) -> Result<Bytes, ClientError> {
        let request = self.apply_auth(request);

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to send request");
            ClientError::Transport(NON_JSON_FAILURE.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = normalize_error(status, &body, scope);
            tracing::warn!(
                status = status.as_u16(),
                error_type = err.error_type(),
                "API request failed"
            );
            return Err(err);
        }

        response.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read response body");
            ClientError::Transport(NON_JSON_FAILURE.to_string())
        })
    }

    /// GET request. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        scope: ErrorScope,
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(method = "GET", path, "API request");
        let body = self.execute(self.client.get(&url), scope).await?;
        decode(&body)
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        scope: ErrorScope,
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(method = "POST", path, "API request");
        let body = self.execute(self.client.post(&url).json(body), scope).await?;
        decode(&body)
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        scope: ErrorScope,
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(method = "PUT", path, "API request");
        let body = self.execute(self.client.put(&url).json(body), scope).await?;
        decode(&body)
    }

    /// POST multipart form and deserialize response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        scope: ErrorScope,
    ) -> Result<T, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(method = "POST", path, "API multipart request");
        let body = self
            .execute(self.client.post(&url).multipart(form), scope)
            .await?;
        decode(&body)
    }

    /// DELETE request. An empty success body is a bare acknowledgement.
    pub async fn delete(
        &self,
        path: &str,
        scope: ErrorScope,
    ) -> Result<Acknowledgement, ClientError> {
        let url = self.build_url(path);
        tracing::debug!(method = "DELETE", path, "API request");
        let body = self.execute(self.client.delete(&url), scope).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Acknowledgement::default());
        }
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to parse response as JSON");
        ClientError::Transport(NON_JSON_FAILURE.to_string())
    })
}

/// Fold an HTTP failure into the closed error set.
///
/// Only a JSON object body counts as structured; anything else is a transport
/// failure with a generic message.
pub fn normalize_error(status: StatusCode, body: &[u8], scope: ErrorScope) -> ClientError {
    let object = match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => return ClientError::Transport(NON_JSON_FAILURE.to_string()),
    };

    let message = object
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or(scope.fallback_message())
        .to_string();

    match scope {
        ErrorScope::Auth | ErrorScope::Verify => ClientError::Auth(message),
        ErrorScope::Files => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Auth(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Transport(message),
        },
    }
}

// Re-export domain types for convenience.
pub use cdrive_core::{AuthPayload, Credentials, FileKind, FileResource, LoginResponse};
