//! Error types for the offline sync crate.

use fitlog_core::sync::{classify_http_status, SyncRetryClass};
use thiserror::Error;

/// Result type alias for offline sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

pub const OFFLINE_MESSAGE: &str = "Cannot make request while offline";

#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure: no response, connection refused, timeout.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the backend.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The connectivity monitor reported offline; nothing was sent.
    #[error("{}", OFFLINE_MESSAGE)]
    Offline,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Local failure: queue storage, owner id validation.
    #[error("Local error: {0}")]
    Local(#[from] fitlog_core::Error),
}

pub(crate) fn is_retryable_transport_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
}

impl SyncError {
    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable code from the error envelope, when the backend sent one.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Classify error for retry policy.
    pub fn retry_class(&self) -> SyncRetryClass {
        match self {
            Self::Api { status, .. } => classify_http_status(*status),
            Self::Http(err) if is_retryable_transport_error(err) => SyncRetryClass::Retryable,
            Self::Http(_) => SyncRetryClass::Permanent,
            Self::Json(_) => SyncRetryClass::Permanent,
            Self::Offline => SyncRetryClass::Permanent,
            Self::InvalidRequest(_) => SyncRetryClass::Permanent,
            Self::Local(_) => SyncRetryClass::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.retry_class() == SyncRetryClass::Retryable
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_class_follows_status() {
        assert!(SyncError::api(503, None, "unavailable").is_transient());
        assert!(SyncError::api(429, None, "slow down").is_transient());
        assert!(SyncError::api(408, None, "timeout").is_transient());
        assert!(!SyncError::api(400, Some("VALIDATION_ERROR".into()), "bad").is_transient());
        assert!(!SyncError::api(409, Some("DB_DUPLICATE".into()), "dup").is_transient());
    }

    #[test]
    fn offline_is_distinguishable_and_not_retried() {
        let err = SyncError::Offline;
        assert!(err.is_offline());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Cannot make request while offline");
    }
}
