// ⚠️ Repository errors
// Every failure carries the field / key / path it is about, so callers can
// print the error as-is and tests can match on the variant.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("expected {expected} values, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    #[error("a record with key {key} is already registered")]
    DuplicateKey { key: String },

    #[error("invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no record found with key {key}")]
    NotFound { key: String },

    #[error("{field} is part of the key and cannot be modified")]
    ImmutableField { field: String },

    #[error("{field} is not a field of this schema")]
    UnknownField { field: String },

    #[error("the new value of {field} cannot be empty")]
    EmptyValue { field: String },

    #[error("storage I/O failed on {}: {source}", path.display())]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store {}: {reason}", path.display())]
    MalformedStore { path: PathBuf, reason: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl RepositoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepositoryError::StorageIo {
            path: path.into(),
            source,
        }
    }

    /// Split csv errors into I/O failures and content failures.
    pub(crate) fn csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let path = path.into();
        let reason = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => RepositoryError::StorageIo { path, source },
            _ => RepositoryError::MalformedStore { path, reason },
        }
    }

    /// True for failures that were rejected before the store was touched.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            RepositoryError::StorageIo { .. }
                | RepositoryError::MalformedStore { .. }
                | RepositoryError::InvalidSchema(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_subject() {
        let err = RepositoryError::Validation {
            field: "Birth Date".to_string(),
            reason: "'2024-13-40' is not a YYYY-MM-DD date".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for Birth Date: '2024-13-40' is not a YYYY-MM-DD date"
        );

        let err = RepositoryError::ImmutableField {
            field: "ID".to_string(),
        };
        assert!(err.to_string().contains("ID"));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_csv_io_errors_become_storage_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = RepositoryError::csv("athlete.csv", csv::Error::from(io));
        assert!(matches!(err, RepositoryError::StorageIo { .. }));
        assert!(!err.is_rejection());
    }
}
