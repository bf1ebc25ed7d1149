use thiserror::Error;

use crate::validation::ValidationError;

/// Top-level error type for the memo system.
///
/// Point lookups never produce `NotFound`; they return `Ok(None)`. The
/// variant is reserved for writes that address a row which does not exist.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MemoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Subscription closed")]
    SubscriptionClosed,
}

impl MemoError {
    /// True for errors that leave the store untouched because the write was
    /// rejected before or by the database.
    pub fn is_rejected_write(&self) -> bool {
        matches!(
            self,
            MemoError::ConstraintViolation(_)
                | MemoError::Validation(_)
                | MemoError::NotFound { .. }
        )
    }
}

impl From<toml::de::Error> for MemoError {
    fn from(err: toml::de::Error) -> Self {
        MemoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MemoError {
    fn from(err: toml::ser::Error) -> Self {
        MemoError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MemoError {
    fn from(err: serde_json::Error) -> Self {
        MemoError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for memo operations.
pub type Result<T> = std::result::Result<T, MemoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let cases: Vec<(MemoError, &str)> = vec![
            (
                MemoError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                MemoError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                MemoError::ConstraintViolation("FOREIGN KEY constraint failed".to_string()),
                "Constraint violation: FOREIGN KEY constraint failed",
            ),
            (
                MemoError::NotFound {
                    entity: "memo",
                    id: 42,
                },
                "memo 42 not found",
            ),
            (
                MemoError::Validation(ValidationError::EmptyTitle),
                "Validation error: title must not be empty",
            ),
            (MemoError::SubscriptionClosed, "Subscription closed"),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: MemoError = io_err.into();
        assert!(matches!(err, MemoError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: MemoError = ValidationError::EmptyFolderName.into();
        assert!(matches!(
            err,
            MemoError::Validation(ValidationError::EmptyFolderName)
        ));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let memo_err: MemoError = err.unwrap_err().into();
        assert!(matches!(memo_err, MemoError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let memo_err: MemoError = err.unwrap_err().into();
        assert!(matches!(memo_err, MemoError::Serialization(_)));
    }

    #[test]
    fn test_rejected_write_classification() {
        assert!(MemoError::ConstraintViolation("fk".into()).is_rejected_write());
        assert!(MemoError::Validation(ValidationError::EmptyTitle).is_rejected_write());
        assert!(MemoError::NotFound { entity: "folder", id: 1 }.is_rejected_write());
        assert!(!MemoError::Storage("io".into()).is_rejected_write());
    }
}
