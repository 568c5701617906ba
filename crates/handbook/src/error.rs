//! Error types for handbook.
//!
//! This module defines all error types used throughout the handbook crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for handbook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
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

    // === Document Errors ===
    /// The handbook file could not be read.
    #[error("failed to read handbook {path}: {source}")]
    DocumentRead {
        /// Path to the handbook file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The handbook contains no pages.
    #[error("handbook has no pages")]
    EmptyDocument,

    /// A checklist entry number was outside the document's checklist.
    #[error("no checklist entry {number} (handbook has {total})")]
    NoSuchEntry {
        /// The 1-based entry number that was requested.
        number: usize,
        /// Number of checklist entries in the handbook.
        total: usize,
    },

    // === Platform Errors ===
    /// A platform capability (clipboard, audio, printing) is not available.
    #[error("{capability} is not available: {message}")]
    Unsupported {
        /// Name of the missing capability.
        capability: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// The print command failed.
    #[error("print command '{command}' failed: {message}")]
    Print {
        /// The command that was run.
        command: String,
        /// Description of what went wrong.
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

/// A specialized Result type for handbook operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new unsupported-capability error.
    #[must_use]
    pub fn unsupported(capability: &'static str, message: impl Into<String>) -> Self {
        Self::Unsupported {
            capability,
            message: message.into(),
        }
    }

    /// Create a new print error.
    #[must_use]
    pub fn print(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Print {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Check if this error means a platform capability is missing.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyDocument;
        assert_eq!(err.to_string(), "handbook has no pages");

        let err = Error::unsupported("clipboard", "no display");
        assert_eq!(err.to_string(), "clipboard is not available: no display");
    }

    #[test]
    fn test_error_is_unsupported() {
        assert!(Error::unsupported("audio", "muted").is_unsupported());
        assert!(!Error::EmptyDocument.is_unsupported());
    }

    #[test]
    fn test_print_error_display() {
        let err = Error::print("lp", "No such file or directory");
        let msg = err.to_string();
        assert!(msg.contains("'lp'"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn test_no_such_entry_display() {
        let err = Error::NoSuchEntry {
            number: 7,
            total: 3,
        };
        assert_eq!(err.to_string(), "no checklist entry 7 (handbook has 3)");
    }

    #[test]
    fn test_document_read_display() {
        let err = Error::DocumentRead {
            path: PathBuf::from("/trips/kyoto.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/trips/kyoto.md"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<Vec<bool>, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "settle_ms must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("settle_ms"));
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
