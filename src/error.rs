//! Error types for user-config

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for user-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for user-config
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Identity Errors
    // -------------------------------------------------------------------------
    #[error("Invalid config name '{name}' or path '{path}'")]
    InvalidIdentity { name: String, path: PathBuf },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to inspect directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Directory Errors
    // -------------------------------------------------------------------------
    #[error("{0} exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("No per-user config directory available on this platform")]
    NoConfigDir,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to parse config document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config document: {0}")]
    Serialize(String),

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid value for {key}: expected {expected}, {reason}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        reason: String,
    },
}

impl Error {
    /// Check if this is a "not found" type error
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_))
    }

    /// Check if the stored document or a stored value could not be decoded.
    ///
    /// Absent keys count as decode failures for the typed getters, so
    /// `KeyNotFound` is included.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::InvalidValue { .. } | Error::KeyNotFound(_)
        )
    }

    /// Check if this error came from the filesystem
    #[must_use]
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Error::FileRead { .. }
                | Error::FileWrite { .. }
                | Error::DirectoryCreate { .. }
                | Error::DirectoryRead { .. }
        )
    }

    pub(crate) fn invalid_value(
        key: &str,
        expected: &'static str,
        reason: impl std::fmt::Display,
    ) -> Self {
        Error::InvalidValue {
            key: key.to_string(),
            expected,
            reason: reason.to_string(),
        }
    }
}
