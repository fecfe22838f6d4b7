//! Error types for faqdesk.
//!
//! This module defines all error types used throughout the faqdesk crate,
//! providing detailed context for debugging and operator-facing messages.
//! HTTP clients never see these directly; see [`crate::api`] for the mapping.

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for faqdesk operations.
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

    // === Catalog Errors ===
    /// A locale file could not be read.
    #[error("failed to read locale file {path}: {source}")]
    CatalogRead {
        /// Path to the locale file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A locale file is not a valid message map.
    #[error("failed to parse locale file {path}: {source}")]
    CatalogParse {
        /// Path to the locale file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// No catalog is loaded for the requested locale.
    #[error("unsupported locale: {locale}")]
    UnsupportedLocale {
        /// The locale tag that was requested.
        locale: String,
    },

    /// The locale's catalog has no entry for the message key.
    #[error("message '{key}' missing for locale {locale}")]
    MissingMessage {
        /// The locale tag that was resolved.
        locale: String,
        /// The message key.
        key: &'static str,
    },

    // === Backup Errors ===
    /// Copying the database file to the backup location failed.
    #[error("failed to back up {source_path} to {destination}: {source}")]
    Backup {
        /// The live database file.
        source_path: PathBuf,
        /// The backup file.
        destination: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Server Errors ===
    /// The HTTP listener could not be bound.
    #[error("failed to bind {addr}: {message}")]
    Bind {
        /// Address the server tried to listen on.
        addr: SocketAddr,
        /// Description of what went wrong.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for faqdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an unsupported locale error.
    #[must_use]
    pub fn unsupported_locale(locale: impl Into<String>) -> Self {
        Self::UnsupportedLocale {
            locale: locale.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::unsupported_locale("fr-FR");
        assert_eq!(err.to_string(), "unsupported locale: fr-FR");

        let err = Error::internal("lock poisoned");
        assert_eq!(err.to_string(), "internal error: lock poisoned");
    }

    #[test]
    fn test_missing_message_display() {
        let err = Error::MissingMessage {
            locale: "tr-TR".to_string(),
            key: "faq_added",
        };
        let msg = err.to_string();
        assert!(msg.contains("faq_added"));
        assert!(msg.contains("tr-TR"));
    }

    #[test]
    fn test_backup_error_display() {
        let err = Error::Backup {
            source_path: PathBuf::from("/data/faq.db"),
            destination: PathBuf::from("/data/backup.db"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/faq.db"));
        assert!(msg.contains("/data/backup.db"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("port must be greater than 0");
        assert!(err.to_string().contains("port must be greater than 0"));
    }

    #[test]
    fn test_bind_error_display() {
        let err = Error::Bind {
            addr: "127.0.0.1:8080".parse().unwrap(),
            message: "address in use".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to bind 127.0.0.1:8080: address in use"
        );
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
    fn test_catalog_read_error_display() {
        let err = Error::CatalogRead {
            path: PathBuf::from("locales/en-US.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("locales/en-US.json"));
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
