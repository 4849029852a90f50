//! Error taxonomy shared by every fitlog crate.
//!
//! Each variant maps onto the HTTP status and machine-readable code used by the
//! backend's `{ error: { message, code, details? } }` envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Duplicate record: {0}")]
    UniqueViolation(String),

    #[error("Related record not found: {0}")]
    ForeignKeyViolation(String),

    #[error("Cannot delete record because it has related data: {0}")]
    ChildRecords(String),

    #[error("Missing required field: {0}")]
    NotNullViolation(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Start time must be before end time")]
    InvalidTimeRange,

    #[error("Duration must be greater than 0")]
    InvalidDuration,

    #[error("Missing or invalid owner id. Provide the x-owner-id header.")]
    OwnerIdRequired,

    #[error("{field}: {message}")]
    InvalidInput { field: String, message: String },
}

impl Error {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::InvalidInput {
            field: field.into(),
            message: message.into(),
        })
    }

    /// HTTP status the backend answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Database(db) => match db {
                DatabaseError::UniqueViolation(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ChildRecords(_) => 409,
                DatabaseError::NotNullViolation(_) => 400,
                _ => 500,
            },
            Self::Serialization(_) => 400,
            Self::Unexpected(_) => 500,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(v) => match v {
                ValidationError::InvalidTimeRange => "INVALID_TIME_RANGE",
                ValidationError::InvalidDuration => "INVALID_DURATION",
                ValidationError::OwnerIdRequired => "OWNER_ID_REQUIRED",
                ValidationError::InvalidInput { .. } => "VALIDATION_ERROR",
            },
            Self::NotFound { code, .. } | Self::Conflict { code, .. } => code,
            Self::Database(db) => match db {
                DatabaseError::UniqueViolation(_) => "DB_DUPLICATE",
                DatabaseError::ForeignKeyViolation(_) => "DB_FK_NOT_FOUND",
                DatabaseError::ChildRecords(_) => "DB_CHILD_RECORDS",
                DatabaseError::NotNullViolation(_) => "DB_NOT_NULL",
                _ => "DB_ERROR",
            },
            Self::Serialization(_) => "VALIDATION_ERROR",
            Self::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    /// Wire representation of this error.
    pub fn to_envelope(&self) -> ApiErrorEnvelope {
        let details = match self {
            Self::Validation(ValidationError::InvalidInput { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        };
        ApiErrorEnvelope {
            error: ApiErrorBody {
                message: self.to_string(),
                code: Some(self.code().to_string()),
                details,
            },
        }
    }
}

/// `{ error: { message, code, details? } }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_time_range_maps_to_bad_request() {
        let err = Error::from(ValidationError::InvalidTimeRange);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), "INVALID_TIME_RANGE");
    }

    #[test]
    fn database_conflicts_map_to_409() {
        let dup = Error::Database(DatabaseError::UniqueViolation("activities.id".into()));
        assert_eq!(dup.status_code(), 409);
        assert_eq!(dup.code(), "DB_DUPLICATE");

        let fk = Error::Database(DatabaseError::ForeignKeyViolation("owner_id".into()));
        assert_eq!(fk.code(), "DB_FK_NOT_FOUND");

        let internal = Error::Database(DatabaseError::Internal("boom".into()));
        assert_eq!(internal.status_code(), 500);
        assert_eq!(internal.code(), "DB_ERROR");
    }

    #[test]
    fn envelope_carries_code_and_field_details() {
        let err = Error::invalid_input("met", "MET must be greater than 0");
        let json = serde_json::to_value(err.to_envelope()).expect("serialize envelope");
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["details"]["field"], "met");
    }

    #[test]
    fn envelope_parses_without_optional_fields() {
        let parsed: ApiErrorEnvelope =
            serde_json::from_str(r#"{"error":{"message":"Internal server error"}}"#)
                .expect("parse envelope");
        assert_eq!(parsed.error.code, None);
        assert_eq!(parsed.error.message, "Internal server error");
    }
}
