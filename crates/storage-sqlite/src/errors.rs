use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use fitlog_core::errors::{DatabaseError, Error};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Query failed: {0}")]
    Query(#[from] DieselError),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let db = match err {
            StorageError::Query(DieselError::DatabaseError(kind, info)) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => DatabaseError::UniqueViolation(message),
                    DatabaseErrorKind::ForeignKeyViolation => {
                        DatabaseError::ForeignKeyViolation(message)
                    }
                    DatabaseErrorKind::NotNullViolation => DatabaseError::NotNullViolation(message),
                    DatabaseErrorKind::ClosedConnection => DatabaseError::ConnectionFailed(message),
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            StorageError::Query(other) => DatabaseError::QueryFailed(other.to_string()),
            StorageError::InvalidValue(message) => DatabaseError::Internal(message),
        };
        Error::Database(db)
    }
}

/// True for a foreign key failure, which on delete means dependent rows exist.
pub(crate) fn is_foreign_key_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}
