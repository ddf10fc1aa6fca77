//! Service configuration from the environment or a credentials file
//!
//! Settings are read from `<SERVICE_NAME>_*` variables, e.g.
//! `CONTAINER_REGISTRY_URL` and `CONTAINER_REGISTRY_APIKEY`. When
//! `CREDENTIALS_FILE` names a `KEY=VALUE` file that contains settings for the
//! service, the file wins over the process environment.

use crate::error::{RegistryError, Result};
use crate::registry::auth::{
    AuthType, Authenticator, BasicAuthenticator, BearerTokenAuthenticator, IamAuthenticator,
    NoAuthAuthenticator,
};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_SERVICE_NAME: &str = "container_registry";
pub const DEFAULT_SERVICE_URL: &str = "https://us.icr.io";
/// Environment variable naming an external credentials file
pub const CREDENTIALS_FILE_ENV: &str = "CREDENTIALS_FILE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    pub url: Option<String>,
    pub auth_type: Option<String>,
    pub apikey: Option<Secret<String>>,
    pub username: Option<String>,
    pub password: Option<Secret<String>>,
    pub bearer_token: Option<Secret<String>>,
    /// IAM token service URL
    pub auth_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<Secret<String>>,
    #[serde(default)]
    pub disable_ssl: bool,
    #[serde(default)]
    pub enable_gzip: bool,
    #[serde(default)]
    pub enable_retries: bool,
    pub max_retries: Option<u32>,
    /// Maximum retry interval in seconds
    pub retry_interval: Option<u64>,
    pub account: Option<String>,
}

/// `container_registry` -> `CONTAINER_REGISTRY_`
pub fn env_prefix(service_name: &str) -> String {
    format!("{}_", service_name.replace('-', "_").to_ascii_uppercase())
}

impl ServiceConfig {
    /// Load from the credentials file, falling back to the process environment
    pub fn from_env(service_name: &str) -> Result<Self> {
        Self::resolve(
            service_name,
            env::var(CREDENTIALS_FILE_ENV).ok().as_deref(),
            env::vars(),
        )
    }

    /// A credentials file with settings for the service wins outright; its
    /// entries are never merged with `vars`. Otherwise `vars` is used.
    pub fn resolve<I>(service_name: &str, credentials_file: Option<&str>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if let Some(path) = credentials_file {
            if let Some(config) = Self::from_credentials_file(path, service_name)? {
                debug!(path = %path, "loaded service configuration from credentials file");
                return Ok(config);
            }
        }

        let prefix = env_prefix(service_name);
        Self::from_pairs(&prefix, vars)?.ok_or_else(|| {
            RegistryError::Configuration(format!(
                "No {}* settings found in the environment",
                prefix
            ))
        })
    }

    /// Settings for `service_name` in a `KEY=VALUE` file, `None` if it has none
    pub fn from_credentials_file(
        path: impl AsRef<Path>,
        service_name: &str,
    ) -> Result<Option<Self>> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path)
            .map_err(|e| {
                RegistryError::Configuration(format!(
                    "Cannot read credentials file {}: {}",
                    path.display(),
                    e
                ))
            })?
            .collect::<std::result::Result<Vec<(String, String)>, _>>()
            .map_err(|e| {
                RegistryError::Configuration(format!(
                    "Malformed credentials file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Self::from_pairs(&env_prefix(service_name), entries)
    }

    /// Deserialize the prefixed entries; `None` when no key carries the prefix
    pub fn from_pairs<I>(prefix: &str, pairs: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .collect();

        if pairs.is_empty() {
            return Ok(None);
        }

        envy::prefixed(prefix.to_string())
            .from_iter(pairs)
            .map(Some)
            .map_err(|e| RegistryError::Configuration(format!("Invalid {}* setting: {}", prefix, e)))
    }

    /// Explicit auth type, otherwise inferred from which credentials are present
    pub fn resolved_auth_type(&self) -> Result<AuthType> {
        if let Some(auth_type) = &self.auth_type {
            return auth_type.parse();
        }
        if self.apikey.is_some() {
            Ok(AuthType::Iam)
        } else if self.bearer_token.is_some() {
            Ok(AuthType::BearerToken)
        } else if self.username.is_some() {
            Ok(AuthType::Basic)
        } else {
            Err(RegistryError::Configuration(
                "No authentication configuration found".to_string(),
            ))
        }
    }

    pub fn authenticator(&self) -> Result<Arc<dyn Authenticator>> {
        let authenticator: Arc<dyn Authenticator> = match self.resolved_auth_type()? {
            AuthType::NoAuth => Arc::new(NoAuthAuthenticator),
            AuthType::Basic => {
                let username = required(&self.username, "USERNAME")?;
                let password = required(&self.password, "PASSWORD")?;
                Arc::new(BasicAuthenticator::new(
                    username.clone(),
                    password.expose_secret().clone(),
                )?)
            }
            AuthType::BearerToken => {
                let token = required(&self.bearer_token, "BEARER_TOKEN")?;
                Arc::new(BearerTokenAuthenticator::new(token.expose_secret().clone())?)
            }
            AuthType::Iam => {
                let apikey = required(&self.apikey, "APIKEY")?;
                let mut builder = IamAuthenticator::builder(apikey.expose_secret().clone())
                    .with_skip_tls(self.disable_ssl);
                if let Some(url) = &self.auth_url {
                    builder = builder.with_url(url.clone());
                }
                if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
                    builder = builder.with_client_credentials(id.clone(), secret.expose_secret().clone());
                }
                Arc::new(builder.build()?)
            }
        };
        Ok(authenticator)
    }
}

fn required<'a, T>(value: &'a Option<T>, key: &str) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| {
        RegistryError::Configuration(format!("Missing {} for the selected authentication type", key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefix_is_derived_from_the_service_name() {
        assert_eq!(env_prefix("container_registry"), "CONTAINER_REGISTRY_");
        assert_eq!(env_prefix("container-registry"), "CONTAINER_REGISTRY_");
    }

    #[test]
    fn prefixed_pairs_are_deserialized() {
        let config = ServiceConfig::from_pairs(
            "CONTAINER_REGISTRY_",
            pairs(&[
                ("CONTAINER_REGISTRY_URL", "https://de.icr.io"),
                ("CONTAINER_REGISTRY_APIKEY", "key-123"),
                ("CONTAINER_REGISTRY_ENABLE_RETRIES", "true"),
                ("CONTAINER_REGISTRY_MAX_RETRIES", "2"),
                ("CONTAINER_REGISTRY_ACCOUNT", "acct"),
                ("OTHER_SERVICE_APIKEY", "ignored"),
            ]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(config.url.as_deref(), Some("https://de.icr.io"));
        assert_eq!(config.apikey.as_ref().unwrap().expose_secret(), "key-123");
        assert!(config.enable_retries);
        assert!(!config.enable_gzip);
        assert_eq!(config.max_retries, Some(2));
        assert_eq!(config.account.as_deref(), Some("acct"));
        assert_eq!(config.resolved_auth_type().unwrap(), AuthType::Iam);
    }

    #[test]
    fn no_prefixed_keys_means_no_config() {
        let config =
            ServiceConfig::from_pairs("CONTAINER_REGISTRY_", pairs(&[("HOME", "/root")])).unwrap();
        assert!(config.is_none());
    }

    #[test]
    fn explicit_auth_type_wins() {
        let config = ServiceConfig::from_pairs(
            "CONTAINER_REGISTRY_",
            pairs(&[
                ("CONTAINER_REGISTRY_AUTH_TYPE", "basic"),
                ("CONTAINER_REGISTRY_USERNAME", "iamapikey"),
                ("CONTAINER_REGISTRY_PASSWORD", "pw"),
                ("CONTAINER_REGISTRY_APIKEY", "unused"),
            ]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(config.authenticator().unwrap().auth_type(), AuthType::Basic);
    }

    #[test]
    fn missing_credentials_are_reported() {
        let config = ServiceConfig {
            auth_type: Some("bearertoken".to_string()),
            ..ServiceConfig::default()
        };
        assert!(config.authenticator().is_err());
        assert!(ServiceConfig::default().authenticator().is_err());
    }

    #[test]
    fn credentials_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CONTAINER_REGISTRY_AUTH_TYPE=noauth").unwrap();
        writeln!(file, "CONTAINER_REGISTRY_URL=http://localhost:5000").unwrap();
        writeln!(file, "CONTAINER_REGISTRY_ENABLE_GZIP=true").unwrap();

        let config = ServiceConfig::from_credentials_file(file.path(), DEFAULT_SERVICE_NAME)
            .unwrap()
            .unwrap();
        assert_eq!(config.url.as_deref(), Some("http://localhost:5000"));
        assert!(config.enable_gzip);
        assert_eq!(config.authenticator().unwrap().auth_type(), AuthType::NoAuth);

        assert!(ServiceConfig::from_credentials_file(file.path(), "other_service")
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_credentials_file_is_an_error() {
        assert!(ServiceConfig::from_credentials_file("/nonexistent/credentials.env", DEFAULT_SERVICE_NAME).is_err());
    }

    #[test]
    fn credentials_file_wins_over_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CONTAINER_REGISTRY_AUTH_TYPE=noauth").unwrap();
        writeln!(file, "CONTAINER_REGISTRY_URL=https://de.icr.io").unwrap();
        let path = file.path().to_str().unwrap();

        let vars = pairs(&[
            ("CONTAINER_REGISTRY_URL", "https://us.icr.io"),
            ("CONTAINER_REGISTRY_ACCOUNT", "env-account"),
        ]);
        let config = ServiceConfig::resolve(DEFAULT_SERVICE_NAME, Some(path), vars).unwrap();

        assert_eq!(config.url.as_deref(), Some("https://de.icr.io"));
        // Not merged: the environment account is ignored
        assert!(config.account.is_none());
        assert_eq!(config.resolved_auth_type().unwrap(), AuthType::NoAuth);
    }

    #[test]
    fn file_without_service_settings_falls_back_to_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "OTHER_SERVICE_URL=https://example.com").unwrap();
        let path = file.path().to_str().unwrap();

        let vars = pairs(&[
            ("CONTAINER_REGISTRY_URL", "https://us.icr.io"),
            ("CONTAINER_REGISTRY_APIKEY", "key-123"),
        ]);
        let config = ServiceConfig::resolve(DEFAULT_SERVICE_NAME, Some(path), vars).unwrap();
        assert_eq!(config.url.as_deref(), Some("https://us.icr.io"));
        assert_eq!(config.resolved_auth_type().unwrap(), AuthType::Iam);

        let config = ServiceConfig::resolve(
            DEFAULT_SERVICE_NAME,
            None,
            pairs(&[("CONTAINER_REGISTRY_AUTH_TYPE", "noauth")]),
        )
        .unwrap();
        assert!(config.url.is_none());
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let err = ServiceConfig::resolve(DEFAULT_SERVICE_NAME, None, pairs(&[("HOME", "/root")]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Configuration(_)));
    }
}
