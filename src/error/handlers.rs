//! Standardized error handling patterns shared by every operation

use crate::error::{RegistryError, Result};
use crate::registry::transport::RawResponse;
use serde_json::Value;

/// Turns non-2xx responses into [`RegistryError::Api`]
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Build an API error, preferring the message the service put in the body
    pub fn handle_api_error(response: RawResponse, operation: &str) -> RegistryError {
        let status = response.status;
        let message = Self::extract_error_message(&response.body)
            .unwrap_or_else(|| Self::default_message(status.as_u16(), operation));

        RegistryError::Api {
            status: status.as_u16(),
            message,
            response: Box::new(response),
        }
    }

    /// Pull a human readable message out of a JSON error body.
    ///
    /// Understands `{"errors":[{"message":..}]}`, `{"error":..}`,
    /// `{"message":..}` and `{"errorMessage":..}`.
    pub fn extract_error_message(body: &[u8]) -> Option<String> {
        let value: Value = serde_json::from_slice(body).ok()?;

        if let Some(message) = value
            .get("errors")
            .and_then(|e| e.as_array())
            .and_then(|errors| errors.first())
            .and_then(|first| first.get("message"))
            .and_then(|m| m.as_str())
        {
            return Some(message.to_string());
        }

        ["error", "message", "errorMessage"]
            .iter()
            .filter_map(|key| value.get(*key))
            .find_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj.get("message").and_then(|m| m.as_str()).map(String::from),
                _ => None,
            })
    }

    fn default_message(status: u16, operation: &str) -> String {
        match status {
            400 => format!("Bad request for {}", operation),
            401 => format!("Unauthorized to perform {}", operation),
            403 => format!("Forbidden: insufficient permissions for {}", operation),
            404 => format!("Resource not found for {}", operation),
            409 => format!("Conflict during {}", operation),
            429 => format!("Rate limited during {}", operation),
            500 => format!("Registry server error during {}", operation),
            502 | 503 => format!("Registry unavailable for {}", operation),
            _ => format!("{} failed (status {})", operation, status),
        }
    }
}

/// Network error categorization
pub struct NetworkErrorHandler;

impl NetworkErrorHandler {
    pub fn handle_network_error(error: &reqwest::Error, context: &str) -> RegistryError {
        if error.is_timeout() {
            RegistryError::Transport(format!("{} timeout: {}", context, error))
        } else if error.is_connect() {
            RegistryError::Transport(format!("Connection error during {}: {}", context, error))
        } else if error.to_string().contains("dns") {
            RegistryError::Transport(format!("DNS resolution error for {}: {}", context, error))
        } else if error.to_string().contains("certificate") {
            RegistryError::Transport(format!(
                "TLS certificate error during {}: {}",
                context, error
            ))
        } else {
            RegistryError::Transport(format!("{} network error: {}", context, error))
        }
    }
}

/// Presence checks applied to options before a request is built
pub struct ValidationErrorHandler;

impl ValidationErrorHandler {
    pub fn require_non_empty(operation: &str, field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(RegistryError::Validation(format!(
                "{}: {} cannot be empty",
                operation, field
            )));
        }
        Ok(())
    }

    pub fn require_non_empty_list<T>(operation: &str, field: &str, values: &[T]) -> Result<()> {
        if values.is_empty() {
            return Err(RegistryError::Validation(format!(
                "{}: {} must contain at least one entry",
                operation, field
            )));
        }
        Ok(())
    }

    pub fn require_present<T>(operation: &str, field: &str, value: &Option<T>) -> Result<()> {
        if value.is_none() {
            return Err(RegistryError::Validation(format!(
                "{}: {} must be set",
                operation, field
            )));
        }
        Ok(())
    }

    /// A path value must not be a dot segment; URL normalization would drop
    /// it and the request would land on the parent resource
    pub fn require_path_segment(operation: &str, field: &str, value: &str) -> Result<()> {
        if matches!(value, "." | "..") {
            return Err(RegistryError::Validation(format!(
                "{}: {} cannot be '{}'",
                operation, field, value
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_nested_error_messages() {
        let body = br#"{"errors":[{"code":"CRG0010E","message":"The namespace is already in use"}]}"#;
        assert_eq!(
            HttpErrorHandler::extract_error_message(body).as_deref(),
            Some("The namespace is already in use")
        );

        let body = br#"{"error":{"message":"bad token"}}"#;
        assert_eq!(HttpErrorHandler::extract_error_message(body).as_deref(), Some("bad token"));

        let body = br#"{"errorMessage":"quota exceeded"}"#;
        assert_eq!(HttpErrorHandler::extract_error_message(body).as_deref(), Some("quota exceeded"));
    }

    #[test]
    fn non_json_bodies_have_no_message() {
        assert!(HttpErrorHandler::extract_error_message(b"<html>502</html>").is_none());
        assert!(HttpErrorHandler::extract_error_message(b"").is_none());
    }

    #[test]
    fn blank_fields_fail_validation() {
        assert!(ValidationErrorHandler::require_non_empty("delete_image", "image", "  ").is_err());
        assert!(ValidationErrorHandler::require_non_empty("delete_image", "image", "a:b").is_ok());
        assert!(ValidationErrorHandler::require_non_empty_list::<String>("bulk", "images", &[]).is_err());
        assert!(ValidationErrorHandler::require_present::<bool>("x", "flag", &None).is_err());
    }

    #[test]
    fn dot_segments_are_rejected() {
        for value in [".", ".."] {
            let err =
                ValidationErrorHandler::require_path_segment("delete_namespace", "name", value)
                    .unwrap_err();
            assert!(matches!(err, RegistryError::Validation(ref m) if m.contains("name cannot be")));
        }
        assert!(ValidationErrorHandler::require_path_segment("delete_namespace", "name", "...").is_ok());
        assert!(ValidationErrorHandler::require_path_segment("restore_tags", "digest", "sha256:ab").is_ok());
    }
}
