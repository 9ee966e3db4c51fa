//! reqwest-backed [`HttpTransport`].
//!
//! One client per process with a cookie store, so the session cookie set
//! by a login is sent with every later request.

use std::time::Duration;

use async_trait::async_trait;

use crate::ports::{HttpResponse, HttpTransport, TransportError};

/// HTTP transport bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl ReqwestTransport {
    /// Create a transport for `base_url`.
    ///
    /// # Errors
    /// Returns error if the URL is invalid or the client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut base_url = reqwest::Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(base_url.to_string()));
        }
        // Request paths are joined relative to the base, so its path must be a directory.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        tracing::info!("HTTP transport ready for {}", base_url);
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
        let response = request.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_error)?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn map_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, TransportError> {
        let url = self.url(path)?;
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.url(path)?;
        tracing::debug!("POST {}", url);
        let request = match body {
            Some(body) => self.client.post(url).json(body),
            None => self.client.post(url),
        };
        self.send(request).await
    }
}
