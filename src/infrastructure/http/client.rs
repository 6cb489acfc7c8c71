use crate::error::{AppError, AppResult, ErrorResponse, SIGN_IN_REQUIRED};
use crate::infrastructure::storage::{LocalStore, TOKEN_KEY};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("runbox-client/", env!("CARGO_PKG_VERSION"));

/// Thin JSON client for the backend API.
///
/// Authenticated calls read the bearer token from the local store on every
/// request, so signing in or out takes effect without rebuilding the client.
pub struct ApiClient {
    base_url: String,
    http_client: reqwest::Client,
    store: Arc<dyn LocalStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, store: Arc<dyn LocalStore>) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            store,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self.http_client.get(self.url(path));
        Self::send_json(request, path).await
    }

    pub async fn get_with_auth<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let token = self.bearer_token().await?;
        let request = self.http_client.get(self.url(path)).bearer_auth(token);
        Self::send_json(request, path).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let request = self.http_client.post(self.url(path)).json(body);
        Self::send_json(request, path).await
    }

    pub async fn post_with_auth<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let token = self.bearer_token().await?;
        let request = self
            .http_client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body);
        Self::send_json(request, path).await
    }

    /// PUT whose response carries only a status.
    pub async fn put_with_auth<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<()> {
        let token = self.bearer_token().await?;
        let request = self
            .http_client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body);
        Self::send(request, path).await.map(|_| ())
    }

    /// DELETE whose response carries only a status.
    pub async fn delete_with_auth(&self, path: &str) -> AppResult<()> {
        let token = self.bearer_token().await?;
        let request = self.http_client.delete(self.url(path)).bearer_auth(token);
        Self::send(request, path).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn bearer_token(&self) -> AppResult<String> {
        self.store
            .get(TOKEN_KEY)
            .await?
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| AppError::Unauthorized(SIGN_IN_REQUIRED.to_string()))
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder, path: &str) -> AppResult<T> {
        let response = Self::send(request, path).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to decode response body");
            AppError::Decode(format!("{}: {}", path, e))
        })
    }

    async fn send(request: RequestBuilder, path: &str) -> AppResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(path = %path, error = %e, "HTTP request failed");
            AppError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let backend_message = serde_json::from_str::<ErrorResponse>(&error_text)
            .ok()
            .and_then(|body| body.error);

        tracing::warn!(
            path = %path,
            status = status.as_u16(),
            message = backend_message.as_deref().unwrap_or(""),
            "Backend returned an error status"
        );

        Err(match (status, backend_message) {
            (StatusCode::UNAUTHORIZED, message) => {
                AppError::Unauthorized(message.unwrap_or_else(|| SIGN_IN_REQUIRED.to_string()))
            }
            (_, Some(message)) => AppError::Rejected(message),
            (status, None) => AppError::Http {
                status: status.as_u16(),
                message: error_text,
            },
        })
    }
}
