//! Catalog error handling
//!
//! Provides typed errors for loading the book catalog with descriptive
//! messages and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::BookId;

/// Errors that can occur while loading the catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Catalog file does not exist
    #[error("Catalog file not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Permission denied reading the catalog
    #[error("Permission denied: cannot read '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Catalog JSON cannot be parsed
    #[error("Invalid catalog format in '{path}': {source}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Two books share an id
    #[error("Duplicate book id '{id}' in catalog")]
    DuplicateId { id: BookId },
}

impl CatalogError {
    /// Create an error from an I/O error with path context
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => CatalogError::NotFound { path },
            io::ErrorKind::PermissionDenied => CatalogError::PermissionDenied {
                path,
                source: error,
            },
            _ => CatalogError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            CatalogError::NotFound { .. } => {
                Some("Create the file or point books_file at it: shelf config set books_file <path>")
            }
            CatalogError::PermissionDenied { .. } => {
                Some("Check file and directory permissions.")
            }
            CatalogError::InvalidFormat { .. } => {
                Some("The file must contain a JSON object with a \"books\" array.")
            }
            CatalogError::DuplicateId { .. } => Some("Give every book a unique id."),
            CatalogError::ReadError { .. } => None,
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = CatalogError::from_io(io_err, PathBuf::from("/missing/books.json"));

        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = CatalogError::from_io(io_err, PathBuf::from("/test/books.json"));

        assert!(matches!(err, CatalogError::PermissionDenied { .. }));
        let msg = err.to_string();
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("/test/books.json"));
    }

    #[test]
    fn test_duplicate_id_display() {
        let err = CatalogError::DuplicateId {
            id: BookId::new("42"),
        };
        assert!(err.to_string().contains("'42'"));
    }
}
