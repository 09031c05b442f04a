//! Error types for apae-records.
//!
//! Storage failures (`Read`, `Parse`, `Write`) are unrecoverable for the
//! current request, while `NotFound` is the one failure expected in normal
//! operation.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for apae-records operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Collection Errors ===
    /// The backing file could not be read.
    #[error("failed to read collection file {path}: {source}")]
    Read {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON array of records.
    #[error("collection file {path} is not a valid JSON array of records: {source}")]
    Parse {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The backing file could not be written.
    #[error("failed to write collection file {path}: {source}")]
    Write {
        /// Path to the collection file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No record with the given id exists in the collection.
    #[error("{collection} {id} not found")]
    NotFound {
        /// Name of the collection that was searched.
        collection: &'static str,
        /// The id that was looked up.
        id: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for apae-records operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for a collection lookup.
    #[must_use]
    pub fn not_found(collection: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Check if this error means the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("students", "7");
        assert_eq!(err.to_string(), "students 7 not found");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::not_found("users", "1").is_not_found());
        assert!(!Error::Parse {
            path: PathBuf::from("/data/users.json"),
            source: parse_error(),
        }
        .is_not_found());
    }

    #[test]
    fn test_read_error_display() {
        let err = Error::Read {
            path: PathBuf::from("/data/events.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/events.json"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = Error::Parse {
            path: PathBuf::from("/data/events.json"),
            source: parse_error(),
        };
        assert!(err.to_string().contains("not a valid JSON array"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let err: Error = parse_error().into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "port must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("port must be greater than 0"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
