//! Error types for data parsing in envdesk-types.

use thiserror::Error;

/// Errors that can occur when parsing envdesk data values.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A metric name did not match any known metric.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// A Pomodoro status name did not match any known status.
    #[error("Unknown Pomodoro status: {0}")]
    UnknownStatus(String),

    /// An optimal range string was not of the form `min-max`.
    #[error("Invalid range '{0}': expected format 'min-max'")]
    InvalidRange(String),

    /// Generic invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using envdesk-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
