//! Pooled async client

use crate::config::HttpClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::request::{HttpMethod, RequestBuilder};
use crate::response::HttpResponse;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

/// Cheap to clone; clones share the connection pool.
///
/// ```ignore
/// let client = HttpClient::new(HttpClientConfig::new().timeout_secs(10.0))?;
/// let request = client
///     .request(HttpMethod::Get, "https://sheets.googleapis.com/v4/spreadsheets/abc")
///     .bearer_auth(token)
///     .query("fields", "properties.title");
/// let sheet: serde_json::Value = client.send_json(request).await?;
/// ```
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<reqwest::Client>,
    config: Arc<HttpClientConfig>,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> HttpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;

        Ok(Self {
            inner: Arc::new(client),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn request(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// Send and buffer the response, whatever its status
    pub async fn execute(&self, request: RequestBuilder) -> HttpResult<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        let started = Instant::now();

        let response = request
            .into_reqwest(&self.inner)?
            .send()
            .await
            .map_err(HttpError::from_send)?;
        let response = HttpResponse::read(response, started).await?;

        tracing::debug!(
            method = %method,
            url = %url,
            status = response.status_code,
            latency_ms = response.latency_ms,
            "HTTP request completed"
        );
        Ok(response)
    }

    /// Send, fail on non-2xx, deserialize the JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> HttpResult<T> {
        let response = self.execute(request).await?.error_for_status();
        if let Err(err) = &response {
            tracing::warn!(error = %err.sanitized_message(), "Request rejected");
        }
        response?.json()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("timeout", &self.config.timeout)
            .field("user_agent", &self.config.user_agent)
            .finish()
    }
}
