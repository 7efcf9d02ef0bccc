//! Storage backend trait and implementations

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Trait for storage backend implementations
///
/// The store only ever produces one on-disk format, but keeping the encoder
/// behind a trait lets callers (and tests) wrap or replace the file access.
pub trait StorageBackend: Clone + Send + Sync {
    /// File extension for this storage format (e.g., "conf")
    fn extension(&self) -> &str;

    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T>;

    /// Read and deserialize from file
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.deserialize(&content)
    }

    /// Serialize and write to file
    ///
    /// Uses atomic write: writes to temp file then renames to prevent corruption.
    /// The parent directory must already exist.
    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let content = self.serialize(data)?;

        let file_name = path.file_name().ok_or_else(|| Error::FileWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path must have a filename",
            ),
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = path.with_file_name(temp_filename);

        std::fs::write(&temp_path, &content).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;

        let finish = crate::security::set_config_file_permissions(&temp_path).and_then(|()| {
            std::fs::rename(&temp_path, path).map_err(|e| Error::FileWrite {
                path: path.to_path_buf(),
                source: e,
            })
        });

        if finish.is_err() {
            // The original file is untouched; only the temp copy is stale.
            let _ = std::fs::remove_file(&temp_path);
        }
        finish
    }
}

// =============================================================================
// TOML Storage Implementation
// =============================================================================

/// TOML storage backend writing `.conf` files (default)
#[derive(Clone, Debug, Default)]
pub struct TomlStorage;

impl TomlStorage {
    /// Create a new TOML storage backend
    pub fn new() -> Self {
        Self
    }
}

impl StorageBackend for TomlStorage {
    fn extension(&self) -> &str {
        "conf"
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        toml::to_string(data).map_err(|e| Error::Serialize(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        toml::from_str(content).map_err(Error::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
