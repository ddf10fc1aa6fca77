//! Registry API client
//!
//! [`RegistryClient`] holds the service URL, the authenticator, the default
//! account and the transport. Every typed operation method funnels into
//! [`RegistryClient::execute_with_context`], which validates the options,
//! builds the request from the operation's [`Endpoint`], sends it and decodes
//! the answer.

use crate::config::{DEFAULT_SERVICE_URL, ServiceConfig};
use crate::error::handlers::ValidationErrorHandler;
use crate::error::{RegistryError, Result};
use crate::regions::service_url_for_region;
use crate::registry::auth::Authenticator;
use crate::registry::request::{
    DetailedResponse, Endpoint, Operation, RequestContext, ResponseKind, resolve_url,
};
use crate::registry::transport::{
    DEFAULT_REQUEST_TIMEOUT, HttpTransport, PreparedRequest, RawResponse, ReqwestTransport,
    RetryPolicy,
};
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::header::{
    ACCEPT, CONTENT_ENCODING, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT,
};
use serde::de::DeserializeOwned;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Header carrying the targeted account id
pub const ACCOUNT_HEADER: &str = "Account";

const JSON_MEDIA_TYPE: &str = "application/json";

pub struct RegistryClientBuilder {
    service_url: Option<String>,
    authenticator: Option<Arc<dyn Authenticator>>,
    account: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    skip_tls: bool,
    request_timeout: Duration,
    retry: RetryPolicy,
    enable_gzip: bool,
}

impl RegistryClientBuilder {
    pub fn new() -> Self {
        Self {
            service_url: None,
            authenticator: None,
            account: None,
            transport: None,
            skip_tls: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::disabled(),
            enable_gzip: false,
        }
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    /// Use the fixed endpoint of a known region
    pub fn with_region(mut self, region: &str) -> Result<Self> {
        self.service_url = Some(service_url_for_region(region)?.to_string());
        Ok(self)
    }

    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    pub fn with_shared_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Account sent in the `Account` header of every call
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_skip_tls(mut self, skip_tls: bool) -> Self {
        self.skip_tls = skip_tls;
        self
    }

    /// Per-attempt timeout of the default transport
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, max_interval: Duration) -> Self {
        self.retry = RetryPolicy::new(max_retries, max_interval);
        self
    }

    pub fn with_gzip(mut self, enable: bool) -> Self {
        self.enable_gzip = enable;
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        let authenticator = self.authenticator.ok_or_else(|| {
            RegistryError::Configuration("An authenticator is required".to_string())
        })?;
        authenticator.validate()?;

        let service_url = self
            .service_url
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        let service_url = normalize_service_url(&service_url)?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.skip_tls, self.request_timeout)?),
        };

        let default_account = self.account.filter(|a| !a.is_empty());

        Ok(RegistryClient {
            service_url,
            default_account,
            authenticator,
            transport,
            retry: self.retry,
            enable_gzip: self.enable_gzip,
            user_agent: default_user_agent(),
        })
    }
}

impl Default for RegistryClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Typed client of the registry API
///
/// Cloning is cheap; the authenticator and transport are shared.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    service_url: String,
    default_account: Option<String>,
    authenticator: Arc<dyn Authenticator>,
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
    enable_gzip: bool,
    user_agent: String,
}

impl RegistryClient {
    pub fn builder() -> RegistryClientBuilder {
        RegistryClientBuilder::new()
    }

    /// Build a client from environment or credentials-file settings
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .with_shared_authenticator(config.authenticator()?)
            .with_skip_tls(config.disable_ssl)
            .with_gzip(config.enable_gzip);

        if let Some(url) = &config.url {
            builder = builder.with_service_url(url.clone());
        }
        if let Some(account) = &config.account {
            builder = builder.with_account(account.clone());
        }
        if config.enable_retries {
            builder = builder.with_retries(
                config.max_retries.unwrap_or_default(),
                Duration::from_secs(config.retry_interval.unwrap_or_default()),
            );
        }

        builder.build()
    }

    /// Client configured from the `CONTAINER_REGISTRY_*` settings
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ServiceConfig::from_env(crate::config::DEFAULT_SERVICE_NAME)?)
    }

    pub fn service_url(&self) -> &str {
        &self.service_url
    }

    /// Change the service URL. An empty URL is accepted but makes every
    /// operation fail with [`RegistryError::ServiceUrlMissing`].
    pub fn set_service_url(&mut self, url: &str) -> Result<()> {
        self.service_url = if url.is_empty() {
            String::new()
        } else {
            normalize_service_url(url)?
        };
        Ok(())
    }

    pub fn default_account(&self) -> Option<&str> {
        self.default_account.as_deref()
    }

    pub fn set_default_account(&mut self, account: Option<String>) {
        self.default_account = account.filter(|a| !a.is_empty());
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }

    /// Retry idempotent requests on connection errors, 429 and 5xx answers.
    /// Zero values select the defaults (4 retries, 30s interval cap).
    pub fn enable_retries(&mut self, max_retries: u32, max_interval: Duration) {
        self.retry = RetryPolicy::new(max_retries, max_interval);
    }

    pub fn disable_retries(&mut self) {
        self.retry = RetryPolicy::disabled();
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Gzip request bodies
    pub fn set_enable_gzip(&mut self, enable: bool) {
        self.enable_gzip = enable;
    }

    pub fn is_gzip_enabled(&self) -> bool {
        self.enable_gzip
    }

    /// Run any operation. `None` options fail validation without a request.
    pub async fn execute<O: Operation>(
        &self,
        options: Option<&O>,
    ) -> Result<DetailedResponse<O::Output>> {
        self.execute_with_context(&RequestContext::default(), options)
            .await
    }

    pub async fn execute_with_context<O: Operation>(
        &self,
        ctx: &RequestContext,
        options: Option<&O>,
    ) -> Result<DetailedResponse<O::Output>> {
        let endpoint = O::ENDPOINT;
        let options = options.ok_or_else(|| {
            RegistryError::Validation(format!("{}: options cannot be nil", endpoint.name))
        })?;
        options.validate()?;
        for (field, value) in options.path_params() {
            ValidationErrorHandler::require_path_segment(endpoint.name, field, value)?;
        }

        let raw = ctx
            .run(async {
                let request = self.prepare(&endpoint, options).await?;
                self.transport.send(request).await
            })
            .await?;

        decode_response(&endpoint, raw)
    }

    /// Build the request for `options` without sending it
    pub async fn prepare<O: Operation>(
        &self,
        endpoint: &Endpoint,
        options: &O,
    ) -> Result<PreparedRequest> {
        if self.service_url.is_empty() {
            return Err(RegistryError::ServiceUrlMissing);
        }

        let url = resolve_url(
            &self.service_url,
            endpoint.path,
            &options.path_params(),
            &options.query_params(),
        )?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &self.user_agent)?);

        if let Some(account) = &self.default_account {
            headers.insert(ACCOUNT_HEADER, header_value(ACCOUNT_HEADER, account)?);
        }
        if endpoint.response == ResponseKind::Json {
            headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));
        }
        for (name, value) in options.headers() {
            headers.insert(name, header_value(name, &value)?);
        }

        let body = match options.body()? {
            Some(value) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
                let bytes = serde_json::to_vec(&value)?;
                if self.enable_gzip {
                    headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
                    Some(gzip(&bytes)?)
                } else {
                    Some(bytes)
                }
            }
            None => None,
        };

        for (name, value) in options.custom_headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                RegistryError::Validation(format!("Invalid header name '{}'", name))
            })?;
            headers.insert(header_name, header_value(name, value)?);
        }

        self.authenticator.authenticate(&mut headers).await?;

        debug!(
            operation = endpoint.name,
            method = %endpoint.method,
            url = %url,
            "prepared request"
        );

        Ok(PreparedRequest {
            operation: endpoint.name,
            method: endpoint.method.clone(),
            url,
            headers,
            body,
            retry: self.retry,
        })
    }
}

/// Turn a successful raw response into the operation's typed result
fn decode_response<T: DeserializeOwned>(
    endpoint: &Endpoint,
    raw: RawResponse,
) -> Result<DetailedResponse<T>> {
    let result = match endpoint.response {
        ResponseKind::Empty => None,
        ResponseKind::Json if !raw.has_body() => None,
        ResponseKind::Json => match serde_json::from_slice(&raw.body) {
            Ok(value) => Some(value),
            Err(e) => {
                return Err(RegistryError::ResponseProcessing {
                    message: format!("{}: {}", endpoint.name, e),
                    response: Box::new(raw),
                });
            }
        },
    };

    Ok(DetailedResponse {
        status: raw.status,
        headers: raw.headers,
        result,
    })
}

fn normalize_service_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let parsed = url::Url::parse(trimmed).map_err(|e| {
        RegistryError::Configuration(format!("Invalid service URL '{}': {}", url, e))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RegistryError::Configuration(format!(
            "Service URL '{}' must use http or https",
            url
        )));
    }
    Ok(trimmed.to_string())
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| RegistryError::Validation(format!("Invalid value for header '{}'", name)))
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn default_user_agent() -> String {
    format!(
        "{}/{} ({}; {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
