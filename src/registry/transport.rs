//! HTTP transport for registry API calls
//!
//! The [`HttpTransport`] trait is the single seam between request building
//! and the network. [`ReqwestTransport`] is the production implementation;
//! tests substitute their own.

use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler};
use crate::error::{RegistryError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default per-attempt timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fully built request, ready to be sent
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// Operation name, used for logging and error messages
    pub operation: &'static str,
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub retry: RetryPolicy,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

/// Status, headers and body of an HTTP answer
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn has_body(&self) -> bool {
        self.body.iter().any(|b| !b.is_ascii_whitespace())
    }
}

/// Bounded retry with exponential backoff, disabled unless the caller opts in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub max_interval: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 4;
    pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(30);
    const BASE_DELAY: Duration = Duration::from_secs(1);

    pub const fn disabled() -> Self {
        Self {
            max_retries: 0,
            max_interval: Duration::ZERO,
        }
    }

    /// Zero values fall back to the defaults
    pub fn new(max_retries: u32, max_interval: Duration) -> Self {
        Self {
            max_retries: if max_retries == 0 {
                Self::DEFAULT_MAX_RETRIES
            } else {
                max_retries
            },
            max_interval: if max_interval.is_zero() {
                Self::DEFAULT_MAX_INTERVAL
            } else {
                max_interval
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Exponential backoff: 1s, 2s, 4s... capped at `max_interval`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = 2_u32.saturating_pow(attempt.min(16));
        Self::BASE_DELAY
            .saturating_mul(multiplier)
            .min(self.max_interval)
    }

    /// Delay before the next attempt, or `None` when the outcome is final
    pub fn retry_delay(
        &self,
        attempt: u32,
        method: &Method,
        outcome: &Result<RawResponse>,
    ) -> Option<Duration> {
        if attempt >= self.max_retries || !is_idempotent(method) {
            return None;
        }

        match outcome {
            Ok(_) => None,
            Err(RegistryError::Transport(_)) => Some(self.backoff(attempt)),
            Err(RegistryError::Api {
                status, response, ..
            }) if is_retryable_status(*status) => Some(
                retry_after(&response.headers)
                    .map(|d| d.min(self.max_interval))
                    .unwrap_or_else(|| self.backoff(attempt)),
            ),
            Err(_) => None,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        method.as_str(),
        "GET" | "HEAD" | "PUT" | "DELETE" | "OPTIONS"
    )
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Performs one logical exchange, including any retries
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Send the request. Non-2xx answers come back as [`RegistryError::Api`].
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(skip_tls: bool, timeout: Duration) -> Result<Self> {
        let builder = Client::builder().timeout(timeout);
        let builder = if skip_tls {
            builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
        } else {
            builder
        };

        let client = builder.build().map_err(|e| {
            RegistryError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send_once(&self, request: &PreparedRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, request.operation))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, request.operation))?
            .to_vec();

        let raw = RawResponse::new(status, headers, body);
        if status.is_success() {
            Ok(raw)
        } else {
            Err(HttpErrorHandler::handle_api_error(raw, request.operation))
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
        let mut attempt = 0;
        loop {
            debug!(
                operation = request.operation,
                method = %request.method,
                url = %request.url,
                attempt,
                "sending request"
            );

            let outcome = self.send_once(&request).await;

            match request.retry.retry_delay(attempt, &request.method, &outcome) {
                Some(delay) => {
                    debug!(
                        operation = request.operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    if let Ok(raw) = &outcome {
                        debug!(operation = request.operation, status = %raw.status, "request completed");
                    }
                    return outcome;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn api_error(status: u16, headers: HeaderMap) -> Result<RawResponse> {
        let raw = RawResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Vec::new(),
        );
        Err(RegistryError::Api {
            status,
            message: "failed".to_string(),
            response: Box::new(raw),
        })
    }

    #[test]
    fn disabled_policy_never_retries() {
        let policy = RetryPolicy::disabled();
        assert!(!policy.is_enabled());
        assert!(policy.retry_delay(0, &Method::GET, &api_error(503, HeaderMap::new())).is_none());
    }

    #[test]
    fn zero_values_use_defaults() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_retries, RetryPolicy::DEFAULT_MAX_RETRIES);
        assert_eq!(policy.max_interval, RetryPolicy::DEFAULT_MAX_INTERVAL);
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy::new(10, Duration::from_secs(5));
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(5));
        assert_eq!(policy.backoff(30), Duration::from_secs(5));
    }

    #[test]
    fn only_idempotent_methods_retry() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        let outcome = api_error(503, HeaderMap::new());
        assert!(policy.retry_delay(0, &Method::GET, &outcome).is_some());
        assert!(policy.retry_delay(0, &Method::DELETE, &outcome).is_some());
        assert!(policy.retry_delay(0, &Method::POST, &outcome).is_none());
        assert!(policy.retry_delay(0, &Method::PATCH, &outcome).is_none());
    }

    #[test]
    fn retry_stops_at_the_bound() {
        let policy = RetryPolicy::new(2, Duration::from_secs(10));
        let outcome: Result<RawResponse> = Err(RegistryError::Transport("reset".to_string()));
        assert!(policy.retry_delay(1, &Method::GET, &outcome).is_some());
        assert!(policy.retry_delay(2, &Method::GET, &outcome).is_none());
    }

    #[test]
    fn client_errors_are_final() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        assert!(policy.retry_delay(0, &Method::GET, &api_error(404, HeaderMap::new())).is_none());
        assert!(policy.retry_delay(0, &Method::GET, &api_error(501, HeaderMap::new())).is_none());
        let validation: Result<RawResponse> = Err(RegistryError::Validation("x".to_string()));
        assert!(policy.retry_delay(0, &Method::GET, &validation).is_none());
    }

    #[test]
    fn retry_after_is_honored_and_capped() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        assert_eq!(
            policy.retry_delay(0, &Method::GET, &api_error(429, headers)),
            Some(Duration::from_secs(3))
        );

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));
        assert_eq!(
            policy.retry_delay(0, &Method::GET, &api_error(429, headers)),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn blank_bodies_are_detected() {
        let raw = RawResponse::new(StatusCode::OK, HeaderMap::new(), b" \n".to_vec());
        assert!(!raw.has_body());
        let raw = RawResponse::new(StatusCode::OK, HeaderMap::new(), b"[]".to_vec());
        assert!(raw.has_body());
    }
}
