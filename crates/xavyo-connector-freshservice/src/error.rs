//! Error types for the Freshservice connector.

use thiserror::Error;
use xavyo_connector::error::ConnectorError;

/// Result type alias using `FreshserviceError`.
pub type FreshserviceResult<T> = Result<T, FreshserviceError>;

/// Errors that can occur when talking to the Freshservice API.
#[derive(Debug, Error)]
pub enum FreshserviceError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Non-success response not covered by a more specific variant.
    #[error("Freshservice API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// 401, the API key was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 403, the key lacks a required privilege.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 429, quota exhausted. Never retried here.
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// 408 from the API.
    #[error("Request timed out: {0}")]
    RequestTimeout(String),

    /// An id that should be numeric was not.
    #[error("Invalid id '{0}'")]
    InvalidId(String),
}

impl FreshserviceError {
    /// Soft errors mark a pagination boundary rather than a failure.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(self, FreshserviceError::RequestTimeout(_))
    }
}

impl From<FreshserviceError> for ConnectorError {
    fn from(err: FreshserviceError) -> Self {
        match err {
            FreshserviceError::Config(message) => ConnectorError::InvalidConfiguration { message },
            FreshserviceError::Url(e) => ConnectorError::InvalidConfiguration {
                message: e.to_string(),
            },
            FreshserviceError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    ConnectorError::connection_failed_with_source("Freshservice request failed", e)
                } else {
                    ConnectorError::operation_failed_with_source("Freshservice request failed", e)
                }
            }
            FreshserviceError::Json(e) => ConnectorError::InvalidData {
                message: format!("unexpected Freshservice response: {e}"),
            },
            FreshserviceError::Api { status, message } if status >= 500 => {
                ConnectorError::TargetUnavailable {
                    message: format!("{status} - {message}"),
                }
            }
            FreshserviceError::Api { status, message } => {
                ConnectorError::operation_failed(format!("{status} - {message}"))
            }
            FreshserviceError::Unauthorized(_) => ConnectorError::AuthenticationFailed,
            FreshserviceError::Forbidden(operation) => {
                ConnectorError::AuthorizationFailed { operation }
            }
            FreshserviceError::NotFound(identifier) => ConnectorError::ObjectNotFound { identifier },
            FreshserviceError::RateLimited { retry_after_secs } => {
                ConnectorError::RateLimited { retry_after_secs }
            }
            FreshserviceError::RequestTimeout(message) => {
                ConnectorError::TargetUnavailable { message }
            }
            FreshserviceError::InvalidId(id) => ConnectorError::InvalidData {
                message: format!("invalid Freshservice id '{id}'"),
            },
        }
    }
}
