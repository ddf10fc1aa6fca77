//! Error types and handlers for registry API calls

pub mod handlers;

use crate::registry::transport::RawResponse;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Every failure a client call can surface.
///
/// Variants are grouped by the stage that produced them: construction
/// (`Configuration`, `UnknownRegion`), request validation (`Validation`,
/// `ServiceUrlMissing`), the exchange itself (`Authentication`, `Transport`,
/// `DeadlineExceeded`, `Cancelled`, `Api`) and decoding
/// (`ResponseProcessing`). The last two keep the raw response so callers can
/// still inspect status and headers.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Options rejected before any request was built
    #[error("Validation error: {0}")]
    Validation(String),
    /// The client has no service URL
    #[error("Service URL is missing; set it before invoking operations")]
    ServiceUrlMissing,
    /// Request body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Credentials were rejected or a token could not be obtained
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// Connection level failure
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Deadline exceeded")]
    DeadlineExceeded,
    #[error("Request cancelled")]
    Cancelled,
    /// Non-2xx answer from the service
    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        response: Box<RawResponse>,
    },
    /// Successful answer whose body could not be decoded
    #[error("Operation response processing error: {message}")]
    ResponseProcessing {
        message: String,
        response: Box<RawResponse>,
    },
    #[error("Unknown region '{0}'")]
    UnknownRegion(String),
}

impl RegistryError {
    /// Raw response attached to the error, if the service answered at all
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            RegistryError::Api { response, .. } | RegistryError::ResponseProcessing { response, .. } => {
                Some(response)
            }
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status.as_u16())
    }

    /// True for errors raised before any network activity
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            RegistryError::Configuration(_)
                | RegistryError::Validation(_)
                | RegistryError::ServiceUrlMissing
                | RegistryError::Serialization(_)
                | RegistryError::UnknownRegion(_)
        )
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for RegistryError {
    fn from(err: url::ParseError) -> Self {
        RegistryError::Configuration(format!("Invalid URL: {}", err))
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Serialization(format!("IO error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;

    #[test]
    fn api_errors_keep_the_raw_response() {
        let raw = RawResponse::new(StatusCode::NOT_FOUND, HeaderMap::new(), b"{}".to_vec());
        let err = RegistryError::Api {
            status: 404,
            message: "namespace not found".to_string(),
            response: Box::new(raw),
        };

        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_client_side());
        assert_eq!(err.to_string(), "API error (status 404): namespace not found");
    }

    #[test]
    fn validation_errors_have_no_response() {
        let err = RegistryError::Validation("image cannot be empty".to_string());
        assert!(err.response().is_none());
        assert!(err.is_client_side());
    }
}
