//! Plain HTTP transport rooted at a base url

use crate::error::{HttpError, Result};
use crate::request::{ApiRequest, ApiResponse, Transport};
use reqwest::Client;
use std::time::Duration;

/// HTTP client that resolves relative request urls against `base_url`
///
/// # Example
///
/// ```no_run
/// use composable_pokedex_http::{AjaxClient, RequestMethods};
///
/// # async fn run() -> Result<(), composable_pokedex_http::HttpError> {
/// let client = AjaxClient::new("https://pokeapi.co/api/v2");
/// let response = client.get("/pokemon/ditto").await?;
/// assert_eq!(response.status, 200);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AjaxClient {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl AjaxClient {
    /// Create a client for `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest` client
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Set the default timeout for requests that do not carry their own
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base url requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `url` against the base url
    ///
    /// Absolute `http(s)` urls are returned unchanged. Otherwise the base and
    /// the path are joined with exactly one `/`.
    #[must_use]
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }

        let base = self.base_url.trim_end_matches('/');
        let path = url.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

impl Transport for AjaxClient {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let resolved = self.resolve(&request.url);
        let url = reqwest::Url::parse(&resolved).map_err(|e| HttpError::InvalidUrl {
            url: resolved.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout.or(self.timeout) {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        tracing::trace!(status = status.as_u16(), bytes = body.len(), "Response received");

        if status.as_u16() >= 400 {
            let message = if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown status").to_string()
            } else {
                body
            };
            return Err(HttpError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}
