//! IAM access token cache with automatic refresh
//!
//! Tokens are fetched lazily on first use and refreshed once 80% of their
//! lifetime has elapsed. The cache is shared between clones so concurrent
//! calls reuse the same token, and at most one exchange is in flight.

use crate::error::{RegistryError, Result};
use reqwest::Client;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const GRANT_TYPE_APIKEY: &str = "urn:ibm:params:oauth:grant-type:apikey";
const TOKEN_PATH: &str = "/identity/token";

/// Parameters of the API key exchange
#[derive(Debug, Clone)]
pub struct IamTokenRequest {
    pub url: String,
    pub apikey: Secret<String>,
    pub client_credentials: Option<(String, Secret<String>)>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    expiration: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub token: Secret<String>,
    /// Unix seconds at which the token stops being accepted
    pub expiration: i64,
    /// Unix seconds after which a new token is requested
    pub refresh_at: i64,
}

impl TokenInfo {
    pub fn new(token: String, expires_in: i64, expiration: i64) -> Self {
        let lifetime = expires_in.max(0);
        Self {
            token: Secret::new(token),
            expiration,
            refresh_at: expiration - lifetime / 5,
        }
    }

    pub fn needs_refresh(&self, now: i64) -> bool {
        now >= self.refresh_at
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expiration
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Thread-safe token cache
#[derive(Debug, Clone)]
pub struct TokenManager {
    client: Client,
    token_info: Arc<RwLock<Option<TokenInfo>>>,
    /// Held for the duration of a token exchange
    refresh_lock: Arc<Mutex<()>>,
}

impl TokenManager {
    pub fn new(skip_tls: bool) -> Result<Self> {
        let client = if skip_tls {
            Client::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
        } else {
            Client::builder().build()
        }
        .map_err(|e| RegistryError::Configuration(format!("Failed to create auth client: {}", e)))?;

        Ok(Self {
            client,
            token_info: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Seed the cache, mainly useful when a token was obtained elsewhere
    pub fn with_token_info(self, token_info: Option<TokenInfo>) -> Self {
        if let Ok(mut guard) = self.token_info.write() {
            *guard = token_info;
        }
        self
    }

    fn cached(&self) -> Result<Option<TokenInfo>> {
        let guard = self.token_info.read().map_err(|_| {
            RegistryError::Authentication("Failed to acquire token read lock".to_string())
        })?;
        Ok(guard.clone())
    }

    /// Current token, fetching or refreshing it when needed
    pub async fn get_valid_token(&self, request: &IamTokenRequest) -> Result<Secret<String>> {
        if let Some(info) = self.cached()? {
            if !info.needs_refresh(unix_now()) {
                return Ok(info.token);
            }
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited
        let now = unix_now();
        match self.cached()? {
            Some(info) if !info.needs_refresh(now) => Ok(info.token),
            Some(info) if !info.is_expired(now) => {
                // Still usable: a failed refresh falls back to the old token
                match self.store(self.request_token(request).await) {
                    Ok(token) => Ok(token),
                    Err(e) => {
                        warn!(error = %e, "IAM token refresh failed, using cached token");
                        Ok(info.token)
                    }
                }
            }
            _ => self.store(self.request_token(request).await),
        }
    }

    /// Force a token exchange and store the result
    pub async fn refresh_token(&self, request: &IamTokenRequest) -> Result<Secret<String>> {
        let _guard = self.refresh_lock.lock().await;
        self.store(self.request_token(request).await)
    }

    fn store(&self, fetched: Result<TokenInfo>) -> Result<Secret<String>> {
        let info = fetched?;
        let token = info.token.clone();

        let mut guard = self.token_info.write().map_err(|_| {
            RegistryError::Authentication("Failed to acquire token write lock".to_string())
        })?;
        *guard = Some(info);

        Ok(token)
    }

    async fn request_token(&self, request: &IamTokenRequest) -> Result<TokenInfo> {
        let url = format!("{}{}", request.url, TOKEN_PATH);
        debug!(url = %url, "requesting IAM access token");

        let form = [
            ("grant_type", GRANT_TYPE_APIKEY),
            ("apikey", request.apikey.expose_secret().as_str()),
            ("response_type", "cloud_iam"),
        ];

        let mut builder = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&form);

        if let Some((id, secret)) = &request.client_credentials {
            builder = builder.basic_auth(id, Some(secret.expose_secret()));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RegistryError::Authentication(format!("Failed to get IAM token: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(RegistryError::Authentication(format!(
                "IAM token request failed with status {}: {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            RegistryError::Authentication(format!("Failed to parse IAM token response: {}", e))
        })?;

        let now = unix_now();
        let expires_in = token.expires_in.unwrap_or(3600);
        let expiration = token.expiration.unwrap_or(now + expires_in);
        debug!(expires_in, "IAM access token obtained");

        Ok(TokenInfo::new(token.access_token, expires_in, expiration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_happens_before_expiry() {
        let info = TokenInfo::new("t".to_string(), 3600, 10_000);
        assert_eq!(info.refresh_at, 10_000 - 720);
        assert!(!info.needs_refresh(9_000));
        assert!(info.needs_refresh(9_280));
        assert!(!info.is_expired(9_999));
        assert!(info.is_expired(10_000));
    }

    #[tokio::test]
    async fn fresh_cached_token_is_reused_without_network() {
        let now = unix_now();
        let manager = TokenManager::new(false)
            .unwrap()
            .with_token_info(Some(TokenInfo::new("cached".to_string(), 3600, now + 3600)));

        let request = IamTokenRequest {
            // Unroutable: any network attempt would fail the test
            url: "http://127.0.0.1:9".to_string(),
            apikey: Secret::new("key".to_string()),
            client_credentials: None,
        };

        let token = manager.get_valid_token(&request).await.unwrap();
        assert_eq!(token.expose_secret(), "cached");
    }
}
