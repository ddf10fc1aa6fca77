//! Endpoint descriptors and the per-call request/response types
//!
//! Every remote operation is described by an options type implementing
//! [`Operation`]: a static [`Endpoint`] plus the path, query, header and body
//! values taken from the options. The client drives all of them through one
//! generic code path.

use crate::error::{RegistryError, Result};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What the client should do with a successful response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Decode the body as JSON into the operation output
    Json,
    /// The operation has no response body
    Empty,
}

/// Static description of one remote operation
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: Method,
    /// Path template, placeholders written as `{name}`
    pub path: &'static str,
    pub response: ResponseKind,
}

/// Options of a single remote operation
pub trait Operation: Send + Sync {
    type Output: DeserializeOwned + Send;

    const ENDPOINT: Endpoint;

    /// Presence checks on required fields
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    /// Query parameters, only those that are set
    fn query_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Operation specific headers, only those that are set
    fn headers(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// JSON body built from the set fields
    fn body(&self) -> Result<Option<Value>> {
        Ok(None)
    }

    fn custom_headers(&self) -> &BTreeMap<String, String>;

    fn custom_headers_mut(&mut self) -> &mut BTreeMap<String, String>;

    /// Add a caller supplied header; it overrides anything the client sets
    fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.custom_headers_mut().insert(name.into(), value.into());
        self
    }

    /// Target a different account for this call only
    fn with_account(self, account: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.with_header(super::client::ACCOUNT_HEADER, account)
    }
}

/// Typed result of a call together with the response metadata
#[derive(Debug, Clone)]
pub struct DetailedResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// `None` when the operation has no body or the body was empty
    pub result: Option<T>,
}

impl<T> DetailedResponse<T> {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn into_result(self) -> Option<T> {
        self.result
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Deadline and cancellation for a single call
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call once `timeout` has elapsed from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run `future` under this context's deadline and cancellation token
    pub(crate) async fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, future)
                    .await
                    .map_err(|_| RegistryError::DeadlineExceeded)?,
                None => future.await,
            }
        };

        match &self.cancellation {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => Err(RegistryError::Cancelled),
                    result = bounded => result,
                }
            }
            None => bounded.await,
        }
    }
}

/// Expand a path template against the service URL and append query parameters.
///
/// Path values are pushed as single segments, so a `/` inside an image name
/// is percent-encoded rather than splitting the path.
pub(crate) fn resolve_url(
    service_url: &str,
    template: &str,
    path_params: &[(&'static str, &str)],
    query_params: &[(&'static str, String)],
) -> Result<Url> {
    let mut url = Url::parse(service_url).map_err(|e| {
        RegistryError::Configuration(format!("Invalid service URL '{}': {}", service_url, e))
    })?;

    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            RegistryError::Configuration(format!("Service URL '{}' cannot be a base", service_url))
        })?;
        segments.pop_if_empty();

        for part in template.split('/').filter(|p| !p.is_empty()) {
            match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => {
                    let value = path_params
                        .iter()
                        .find(|(key, _)| *key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            RegistryError::Validation(format!("Missing path parameter '{}'", name))
                        })?;
                    segments.push(value);
                }
                None => {
                    segments.push(part);
                }
            }
        }
    }

    if !query_params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query_params {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_templates_and_encodes_segments() {
        let url = resolve_url(
            "https://us.icr.io",
            "/api/v1/images/{image}/json",
            &[("image", "us.icr.io/birds/parrot:1")],
            &[],
        )
        .unwrap();

        assert_eq!(url.path(), "/api/v1/images/us.icr.io%2Fbirds%2Fparrot:1/json");
    }

    #[test]
    fn keeps_a_base_path() {
        let url = resolve_url("http://localhost:8080/proxy/", "/api/v1/auth", &[], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/api/v1/auth");
    }

    #[test]
    fn appends_query_pairs() {
        let url = resolve_url(
            "https://us.icr.io",
            "/api/v1/images/tags",
            &[],
            &[("fromimage", "a:1".to_string()), ("toimage", "a:2".to_string())],
        )
        .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("fromimage".to_string(), "a:1".to_string()),
                ("toimage".to_string(), "a:2".to_string())
            ]
        );
    }

    #[test]
    fn missing_path_parameter_is_a_validation_error() {
        let err = resolve_url("https://us.icr.io", "/api/v1/namespaces/{name}", &[], &[]).unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[test]
    fn malformed_service_url_is_a_configuration_error() {
        let err = resolve_url("not a url", "/api/v1/auth", &[], &[]).unwrap_err();
        assert!(matches!(err, RegistryError::Configuration(_)));
    }

    #[tokio::test]
    async fn context_deadline_aborts_slow_futures() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(20));
        assert!(ctx.deadline().unwrap() <= Instant::now() + Duration::from_millis(20));
        assert!(RequestContext::new().deadline().is_none());
        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(RegistryError::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn context_cancellation_wins() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new().with_cancellation(token.clone());
        token.cancel();

        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(RegistryError::Cancelled)));
    }
}
