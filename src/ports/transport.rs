//! HTTP transport port: credentialed requests against the backend.
//!
//! This trait abstracts the HTTP client (reqwest) from the application
//! logic. Implementations keep session cookies between calls.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Errors raised before a status code is available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for a JSON body.
    #[must_use]
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    /// 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    /// Returns the decode error if the body is not valid JSON for `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The backend's `{"error": "..."}` message, if present.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()?
            .get("error")?
            .as_str()
            .map(str::to_string)
    }
}

/// Trait for credentialed HTTP calls.
///
/// `path` is relative to the configured backend base URL and may carry a
/// query string. Non-2xx statuses are returned as responses, not errors.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request.
    ///
    /// # Errors
    /// Returns error if the request cannot be sent or no response arrives.
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError>;

    /// Issue a POST request with an optional JSON body.
    ///
    /// # Errors
    /// Returns error if the request cannot be sent or no response arrives.
    async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, TransportError>;
}
