// ⚠️ Store Errors
// Every failure the data layer reports is recoverable: callers show it, they don't crash on it.

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Bad user input (empty field, non-numeric price, ...)
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Operation targets an unknown id or an empty selection
    #[error("Not found: {0}")]
    NotFound(String),

    /// Durable file could not be read or written
    #[error("Storage error ({target}): {message}")]
    Storage { target: String, message: String },
}

impl StoreError {
    pub fn validation(field: &str, message: &str) -> Self {
        StoreError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    pub fn storage(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::storage_target(path.display().to_string(), err)
    }

    pub fn storage_target(target: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StoreError::Storage {
            target: target.into(),
            message: err.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, StoreError::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = StoreError::validation("price", "Price must be a valid number.");
        assert_eq!(err.to_string(), "price: Price must be a valid number.");

        let err = StoreError::not_found("Product 'PID9'");
        assert_eq!(err.to_string(), "Not found: Product 'PID9'");

        let err = StoreError::storage(Path::new("db.json"), "permission denied");
        assert_eq!(err.to_string(), "Storage error (db.json): permission denied");
    }

    #[test]
    fn test_kind_predicates() {
        assert!(StoreError::validation("id", "x").is_validation());
        assert!(StoreError::not_found("x").is_not_found());
        assert!(StoreError::storage(Path::new("a"), "b").is_storage());
        assert!(!StoreError::not_found("x").is_storage());
    }
}
