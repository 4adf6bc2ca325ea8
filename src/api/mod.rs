//! HTTP helpers for the JSON backend with consistent error handling. Flow code
//! goes through [`ApiClient`] so every request shares one user agent, one URL
//! policy and one mapping from transport/HTTP failures to [`AppError`]. The
//! helpers never log request bodies; callers pass passwords, codes and tokens
//! through them.

pub mod config;
pub mod errors;

pub use config::AppConfig;
pub use errors::AppError;

use crate::APP_USER_AGENT;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    config: AppConfig,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Posts JSON to a backend path and parses a JSON response.
    ///
    /// # Errors
    /// Returns `AppError` on transport failure, non-success status, or an undecodable body.
    #[instrument(skip(self, body))]
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = self.config.api_url(path);
        self.post_json_to(&url, body).await
    }

    /// Posts JSON to a backend path and ignores the response body.
    ///
    /// # Errors
    /// Returns `AppError` on transport failure or non-success status.
    #[instrument(skip(self, body))]
    pub async fn post_json_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), AppError> {
        let url = self.config.api_url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_empty_response(response).await
    }

    /// Posts JSON to an absolute URL, used when the URL carries its own query.
    ///
    /// # Errors
    /// Returns `AppError` on transport failure, non-success status, or an undecodable body.
    pub async fn post_json_to<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, AppError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }
}

/// Maps reqwest failures into transport-level `AppError` variants.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<(), AppError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let (message, code) = error_details(&body);
    debug!("HTTP {} error: {}", status, message);

    AppError::Http {
        status,
        message,
        code,
    }
}

/// Pulls a user-facing message and the machine-readable `error` field out of an
/// error body. JSON `message` wins over `error`; non-JSON bodies are sanitized.
fn error_details(body: &str) -> (String, Option<String>) {
    let json: Option<Value> = serde_json::from_str(body).ok();

    let field = |name: &str| {
        json.as_ref()
            .and_then(|value| value.get(name))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let code = field("error");
    let message = field("message")
        .or_else(|| code.clone())
        .map(|message| message.chars().take(MAX_ERROR_CHARS).collect())
        .unwrap_or_else(|| sanitize_body(body));

    (message, code)
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
