/*
[INPUT]:  HTTP configuration (base URL, timeouts) and the shared JwtManager
[OUTPUT]: Configured reqwest client ready for Task Service calls
[POS]:    HTTP layer - core client implementation and response classification
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::auth::JwtManager;
use crate::http::{Result, TaskdeckError};

/// Default Task Service address (local development backend)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the Task Service and Auth Service
#[derive(Debug, Clone)]
pub struct TaskServiceClient {
    http_client: Client,
    base_url: Url,
    jwt: JwtManager,
}

impl TaskServiceClient {
    /// Create a new client with default configuration
    pub fn new(jwt: JwtManager) -> Result<Self> {
        Self::with_config(ClientConfig::default(), jwt)
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig, jwt: JwtManager) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: parse_base_url(&config.base_url)?,
            jwt,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session token holder shared with the auth layer
    pub fn jwt_manager(&self) -> &JwtManager {
        &self.jwt
    }

    /// Build full URL for an endpoint, keeping any base path prefix
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build a URL from path segments, percent-encoding each one.
    ///
    /// Caller-supplied values (task ids) stay inside their own segment, so
    /// `/`, `?`, `#` and `..` cannot reach another endpoint.
    fn segments_url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            return Err(TaskdeckError::Config(format!("invalid path segment: {bad:?}")));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TaskdeckError::Config(format!("base_url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build an anonymous request (auth endpoints)
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        Ok(self.http_client.request(method, url))
    }

    /// Build a request carrying the bearer token.
    ///
    /// Nothing is sent when no usable token is held.
    pub(crate) fn authed_request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        self.authed(method, url)
    }

    /// Bearer request for a path built from segments (see `segments_url`)
    pub(crate) fn authed_segments_request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder> {
        let url = self.segments_url(segments)?;
        self.authed(method, url)
    }

    fn authed(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self
            .jwt
            .get_token()
            .ok_or(TaskdeckError::MissingCredential)?;
        if self.jwt.is_expired() {
            return Err(TaskdeckError::TokenExpired);
        }
        Ok(self.http_client.request(method, url).bearer_auth(token))
    }

    /// Send and decode a JSON response body
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = check_status(builder.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send and return the raw response body (CSV / PDF downloads)
    pub(crate) async fn send_bytes(&self, builder: RequestBuilder) -> Result<Vec<u8>> {
        let response = check_status(builder.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskdeckError::Config("base_url must not be empty".to_string()));
    }
    // join() replaces the last path segment unless the base ends with '/'
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    tracing::debug!(status = status.as_u16(), "task service returned an error status");
    Err(TaskdeckError::from_status(status, &body, retry_after))
}
