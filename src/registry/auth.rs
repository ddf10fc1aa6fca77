//! Authenticators that decorate outgoing requests with credentials

use crate::error::{RegistryError, Result};
use crate::registry::token_manager::{IamTokenRequest, TokenManager};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::str::FromStr;

/// Default IAM token service
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    NoAuth,
    Basic,
    BearerToken,
    Iam,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::NoAuth => "noauth",
            AuthType::Basic => "basic",
            AuthType::BearerToken => "bearertoken",
            AuthType::Iam => "iam",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noauth" | "none" => Ok(AuthType::NoAuth),
            "basic" => Ok(AuthType::Basic),
            "bearertoken" | "bearer" => Ok(AuthType::BearerToken),
            "iam" => Ok(AuthType::Iam),
            other => Err(RegistryError::Configuration(format!(
                "Unsupported authentication type '{}'",
                other
            ))),
        }
    }
}

/// Adds credentials to a request before it is sent
#[async_trait]
pub trait Authenticator: Send + Sync + fmt::Debug {
    fn auth_type(&self) -> AuthType;

    /// Check the configuration without touching the network
    fn validate(&self) -> Result<()>;

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()>;
}

/// Credentials wrapped in braces or quotes are almost always a copy/paste slip
fn has_bad_first_or_last_char(value: &str) -> bool {
    value.starts_with('{')
        || value.starts_with('"')
        || value.ends_with('}')
        || value.ends_with('"')
}

fn check_credential(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RegistryError::Configuration(format!("{} cannot be empty", field)));
    }
    if has_bad_first_or_last_char(value) {
        return Err(RegistryError::Configuration(format!(
            "{} cannot start or end with curly brackets or quotation marks",
            field
        )));
    }
    Ok(())
}

fn authorization_value(value: String) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(&value).map_err(|_| {
        RegistryError::Authentication("Credentials contain characters not allowed in headers".to_string())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// Sends requests without credentials
#[derive(Debug, Clone, Default)]
pub struct NoAuthAuthenticator;

#[async_trait]
impl Authenticator for NoAuthAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::NoAuth
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    async fn authenticate(&self, _headers: &mut HeaderMap) -> Result<()> {
        Ok(())
    }
}

/// HTTP basic authentication
#[derive(Debug, Clone)]
pub struct BasicAuthenticator {
    username: String,
    password: Secret<String>,
}

impl BasicAuthenticator {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let authenticator = Self {
            username: username.into(),
            password: Secret::new(password.into()),
        };
        authenticator.validate()?;
        Ok(authenticator)
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::Basic
    }

    fn validate(&self) -> Result<()> {
        check_credential("username", &self.username)?;
        check_credential("password", self.password.expose_secret())
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        let encoded = STANDARD.encode(format!(
            "{}:{}",
            self.username,
            self.password.expose_secret()
        ));
        headers.insert(AUTHORIZATION, authorization_value(format!("Basic {}", encoded))?);
        Ok(())
    }
}

/// Static bearer token supplied by the caller
#[derive(Debug, Clone)]
pub struct BearerTokenAuthenticator {
    token: Secret<String>,
}

impl BearerTokenAuthenticator {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let authenticator = Self {
            token: Secret::new(token.into()),
        };
        authenticator.validate()?;
        Ok(authenticator)
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Secret::new(token.into());
    }
}

#[async_trait]
impl Authenticator for BearerTokenAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::BearerToken
    }

    fn validate(&self) -> Result<()> {
        if self.token.expose_secret().is_empty() {
            return Err(RegistryError::Configuration("bearer token cannot be empty".to_string()));
        }
        Ok(())
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(
            AUTHORIZATION,
            authorization_value(format!("Bearer {}", self.token.expose_secret()))?,
        );
        Ok(())
    }
}

/// Exchanges an API key for IAM access tokens and caches them
#[derive(Debug, Clone)]
pub struct IamAuthenticator {
    request: IamTokenRequest,
    token_manager: TokenManager,
}

impl IamAuthenticator {
    pub fn new(apikey: impl Into<String>) -> Result<Self> {
        Self::builder(apikey).build()
    }

    pub fn builder(apikey: impl Into<String>) -> IamAuthenticatorBuilder {
        IamAuthenticatorBuilder::new(apikey)
    }

    pub fn token_url(&self) -> &str {
        &self.request.url
    }
}

pub struct IamAuthenticatorBuilder {
    apikey: String,
    url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    skip_tls: bool,
}

impl IamAuthenticatorBuilder {
    pub fn new(apikey: impl Into<String>) -> Self {
        Self {
            apikey: apikey.into(),
            url: None,
            client_id: None,
            client_secret: None,
            skip_tls: false,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn with_skip_tls(mut self, skip_tls: bool) -> Self {
        self.skip_tls = skip_tls;
        self
    }

    pub fn build(self) -> Result<IamAuthenticator> {
        let url = self
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_IAM_URL.to_string());
        let client_credentials = match (self.client_id, self.client_secret) {
            (Some(id), Some(secret)) => Some((id, Secret::new(secret))),
            (None, None) => None,
            _ => {
                return Err(RegistryError::Configuration(
                    "client id and client secret must be set together".to_string(),
                ));
            }
        };

        let request = IamTokenRequest {
            url: url.trim_end_matches('/').to_string(),
            apikey: Secret::new(self.apikey),
            client_credentials,
        };
        let token_manager = TokenManager::new(self.skip_tls)?;

        let authenticator = IamAuthenticator {
            request,
            token_manager,
        };
        authenticator.validate()?;
        Ok(authenticator)
    }
}

#[async_trait]
impl Authenticator for IamAuthenticator {
    fn auth_type(&self) -> AuthType {
        AuthType::Iam
    }

    fn validate(&self) -> Result<()> {
        check_credential("apikey", self.request.apikey.expose_secret())?;
        url::Url::parse(&self.request.url).map_err(|e| {
            RegistryError::Configuration(format!("Invalid IAM URL '{}': {}", self.request.url, e))
        })?;
        Ok(())
    }

    async fn authenticate(&self, headers: &mut HeaderMap) -> Result<()> {
        let token = self.token_manager.get_valid_token(&self.request).await?;
        headers.insert(
            AUTHORIZATION,
            authorization_value(format!("Bearer {}", token.expose_secret()))?,
        );
        Ok(())
    }
}
