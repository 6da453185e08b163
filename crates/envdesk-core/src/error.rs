//! Error types for envdesk-core.
//!
//! Every remote call in this crate (telemetry channel, inference endpoint,
//! persistence store) reports failures through [`Error`].
//!
//! # Recovery
//!
//! None of these errors are retried with backoff. The pollers and the
//! suggestion engine absorb them where they occur:
//!
//! | Error Type | Handled by | Effect |
//! |------------|------------|--------|
//! | [`Error::Http`] | pollers, suggestion engine | previous value kept / fallback suggestions |
//! | [`Error::Api`] | pollers, suggestion engine | previous value kept / fallback suggestions |
//! | [`Error::InvalidResponse`] | suggestion engine | fallback suggestions |
//! | [`Error::Json`] | suggestion engine | fallback suggestions |
//! | [`Error::MissingCredentials`] | suggestion engine, store | network call skipped |
//! | [`Error::InvalidUrl`] | client construction | reported to the user |
//! | [`Error::Config`] | startup | reported to the user |
//!
//! The next scheduled interval simply tries again.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur when talking to remote services.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the body, or the status text.
        message: String,
    },

    /// A base URL was not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response had an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The response body was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A required API key or token is not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Create an API error from a status code and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

impl From<envdesk_types::ParseError> for Error {
    fn from(err: envdesk_types::ParseError) -> Self {
        Error::InvalidResponse(err.to_string())
    }
}

/// Result type alias using envdesk-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validate and normalize a base URL: must be http(s); trailing slashes are removed.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }

    Ok(base_url)
}

/// Map a non-success response to [`Error::Api`], pulling a message out of the
/// body when it is JSON with an `error` or `message` field.
pub(crate) async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|e| e.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| status.to_string());

    Error::api(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::api(503, "Service Unavailable");
        assert_eq!(err.to_string(), "API error (503): Service Unavailable");

        let err = Error::invalid_response("no generated_text");
        assert_eq!(err.to_string(), "Invalid response: no generated_text");

        let err = Error::MissingCredentials("inference token");
        assert!(err.to_string().contains("inference token"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: Error = envdesk_types::ParseError::UnknownMetric("co2".into()).into();
        assert!(matches!(err, Error::InvalidResponse(_)));
        assert!(err.to_string().contains("co2"));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://api.thingspeak.com/").unwrap(),
            "https://api.thingspeak.com"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080").unwrap(),
            "http://localhost:8080"
        );
        assert!(matches!(
            normalize_base_url("api.thingspeak.com"),
            Err(Error::InvalidUrl(_))
        ));
    }
}
