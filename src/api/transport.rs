//! HTTP transport seam.
//!
//! [`ApiClient`](super::ApiClient) builds [`ApiRequest`]s and hands them to a
//! [`Transport`]. Production uses [`ReqwestTransport`]; tests substitute a
//! mock so endpoint paths and decoding can be checked without a network.

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Instant;

/// HTTP methods used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// A request relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path below the base URL, starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a query parameter, if set.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends requests to the backend.
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status; only failures to get a response at all are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl ReqwestTransport {
    /// Create a transport from API settings.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mutualrisk/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = ?request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed");
            Error::from(e)
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(status, duration_ms = start.elapsed().as_millis() as u64, "response received");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/portfolio/backtest")
            .query("portfolioId", "abc")
            .query("timeInterval", "DAY");
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.query_value("portfolioId"), Some("abc"));
        assert_eq!(request.query_value("measure"), None);
    }

    #[test]
    fn test_base_url_join() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/api/v1/".into(),
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        assert_eq!(
            transport.url("/portfolio/my"),
            "http://localhost:8080/api/v1/portfolio/my"
        );
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let config = ApiConfig {
            access_token: Some(String::new()),
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        assert!(transport.access_token.is_none());
    }

    #[test]
    fn test_success_range() {
        assert!(ApiResponse::ok("{}").is_success());
        assert!(!ApiResponse { status: 404, body: String::new() }.is_success());
    }
}
