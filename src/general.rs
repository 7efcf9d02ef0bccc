//! The primary configuration file of an application
//!
//! [`GeneralConfig`] keeps the whole document of `<dir>/<name>.conf` in memory:
//! a flat string map of general values plus the registries of additional
//! config files and raw files. Typed accessors are projections onto the
//! string map, so integers, timestamps, byte strings and string arrays are
//! all stored as strings.
//!
//! Every mutation follows the same sequence: remember the previous state,
//! apply the change, save, and put the previous state back if the save fails.

use crate::error::{Error, Result};
use crate::storage::{StorageBackend, TomlStorage};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Prefix marking a byte value that was stored as base64.
///
/// Used for payloads that are not valid UTF-8 (or that happen to start with
/// the marker themselves); everything else is stored verbatim.
pub const BINARY_MARKER: &str = "\0base64:";

/// On-disk layout of the primary config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ConfigDocument {
    #[serde(default, rename = "additional_config")]
    config_files: Vec<String>,

    #[serde(default)]
    raw_files: Vec<String>,

    #[serde(default)]
    general: HashMap<String, String>,
}

impl ConfigDocument {
    /// Collapse duplicate registry entries, keeping the first occurrence
    fn dedup_registries(&mut self) {
        dedup_in_order(&mut self.config_files);
        dedup_in_order(&mut self.raw_files);
    }
}

fn dedup_in_order(names: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
}

/// Which registry a file name belongs to
#[derive(Debug, Clone, Copy)]
enum Registry {
    ConfigFiles,
    RawFiles,
}

impl Registry {
    fn list(self, document: &mut ConfigDocument) -> &mut Vec<String> {
        match self {
            Registry::ConfigFiles => &mut document.config_files,
            Registry::RawFiles => &mut document.raw_files,
        }
    }
}

/// In-memory view of an application's primary config file.
///
/// The file at [`file_path`](Self::file_path) is the source of truth: the
/// in-memory document always equals the last snapshot that was successfully
/// loaded or saved. A mutation whose save fails is rolled back before the
/// error is returned.
///
/// Mutating methods take `&mut self`; share a store between threads by
/// wrapping it in a `Mutex`.
///
/// # Example
///
/// ```rust,no_run
/// use user_config::GeneralConfig;
///
/// let mut config = GeneralConfig::new("myapp", "/home/me/.config/myapp")?;
/// config.set("theme", "dark")?;
/// config.set_int("font_size", 14)?;
///
/// assert_eq!(config.get("theme"), "dark");
/// assert_eq!(config.get_int("font_size")?, 14);
/// # Ok::<(), user_config::Error>(())
/// ```
#[derive(Debug)]
pub struct GeneralConfig<S: StorageBackend = TomlStorage> {
    name: String,
    path: PathBuf,
    storage: S,
    document: ConfigDocument,
}

impl GeneralConfig {
    /// Open `<path>/<name>.conf`, creating an empty file if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * `name` or `path` is blank
    /// * The file cannot be created, read, or decoded
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_storage(name, path, TomlStorage::new())
    }
}

impl<S: StorageBackend> GeneralConfig<S> {
    /// Open the config file using a custom storage backend.
    ///
    /// # Errors
    ///
    /// Same as [`GeneralConfig::new`].
    pub fn with_storage(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        storage: S,
    ) -> Result<Self> {
        let mut config = Self {
            name: name.into(),
            path: path.into(),
            storage,
            document: ConfigDocument::default(),
        };
        config.check_identity()?;

        let file_path = config.file_path();
        let exists = file_path.try_exists().map_err(|e| Error::FileRead {
            path: file_path.clone(),
            source: e,
        })?;
        if !exists {
            config.save()?;
            info!("Created config file {}", file_path.display());
        }

        config.load()?;

        info!("Opened config '{}' at {}", config.name, file_path.display());
        Ok(config)
    }

    fn check_identity(&self) -> Result<()> {
        if !crate::paths::is_plain_name(&self.name)
            || self.path.to_string_lossy().trim().is_empty()
        {
            return Err(Error::InvalidIdentity {
                name: self.name.clone(),
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    /// Application name, also the base name of the config file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the config file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full path of the config file: `<path>/<name>.<ext>`
    pub fn file_path(&self) -> PathBuf {
        self.path
            .join(format!("{}.{}", self.name, self.storage.extension()))
    }

    /// Discard the in-memory state and re-read the file.
    ///
    /// A missing or malformed file is an error; in that case the in-memory
    /// state is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The name or path is blank
    /// * The file cannot be read
    /// * The file is not a valid config document
    pub fn load(&mut self) -> Result<()> {
        self.check_identity()?;

        let mut document: ConfigDocument = self.storage.read(&self.file_path())?;
        document.dedup_registries();
        self.document = document;

        debug!(
            "Loaded {} values from {}",
            self.document.general.len(),
            self.file_path().display()
        );
        Ok(())
    }

    /// Write the in-memory state to disk (temp file + rename).
    ///
    /// # Errors
    ///
    /// Returns an error if the name or path is blank, or if the document
    /// cannot be encoded or written.
    pub fn save(&self) -> Result<()> {
        self.check_identity()?;
        self.storage.write(&self.file_path(), &self.document)
    }

    // -------------------------------------------------------------------------
    // String values
    // -------------------------------------------------------------------------

    /// Get a value, or `""` if the key is not set
    pub fn get(&self, key: &str) -> &str {
        self.document.general.get(key).map_or("", String::as_str)
    }

    /// Set a value and save.
    ///
    /// # Errors
    ///
    /// Returns the save error; the previous value (or its absence) is restored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.apply(key, Some(value.into()))?;
        debug!("Saved {key}");
        Ok(())
    }

    /// Remove a key and save. Removing an absent key does nothing.
    ///
    /// # Errors
    ///
    /// Returns the save error; the previous value is restored.
    pub fn delete_key(&mut self, key: &str) -> Result<()> {
        if !self.document.general.contains_key(key) {
            debug!("{key} not set, nothing to delete");
            return Ok(());
        }
        self.apply(key, None)?;
        debug!("Deleted {key}");
        Ok(())
    }

    /// All keys, in no particular order
    pub fn get_key_list(&self) -> Vec<String> {
        self.document.general.keys().cloned().collect()
    }

    /// Stage a change to one key, save, and undo it if the save fails
    fn apply(&mut self, key: &str, value: Option<String>) -> Result<()> {
        let previous = match value {
            Some(value) => self.document.general.insert(key.to_string(), value),
            None => self.document.general.remove(key),
        };

        if let Err(e) = self.save() {
            match previous {
                Some(old) => {
                    self.document.general.insert(key.to_string(), old);
                }
                None => {
                    self.document.general.remove(key);
                }
            }
            debug!("Reverted {key} after failed save");
            return Err(e);
        }
        Ok(())
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.document
            .general
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    // -------------------------------------------------------------------------
    // Typed values
    // -------------------------------------------------------------------------

    /// Store raw bytes.
    ///
    /// UTF-8 payloads are stored as-is. Anything else is stored as
    /// [`BINARY_MARKER`] followed by base64, so every byte sequence survives
    /// a save and reload unchanged.
    ///
    /// # Errors
    ///
    /// Returns the save error; the previous value is restored.
    pub fn set_bytes(&mut self, key: &str, raw: &[u8]) -> Result<()> {
        let value = match std::str::from_utf8(raw) {
            Ok(text) if !text.starts_with(BINARY_MARKER) => text.to_string(),
            _ => format!("{BINARY_MARKER}{}", STANDARD.encode(raw)),
        };
        self.set(key, value)
    }

    /// Bytes of the stored value (empty if absent). Never fails.
    pub fn get_bytes(&self, key: &str) -> Vec<u8> {
        let value = self.get(key);
        if let Some(encoded) = value.strip_prefix(BINARY_MARKER) {
            if let Ok(raw) = STANDARD.decode(encoded) {
                return raw;
            }
        }
        value.as_bytes().to_vec()
    }

    /// Store an integer as a base-10 string.
    ///
    /// # Errors
    ///
    /// Returns the save error; the previous value is restored.
    pub fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.set(key, value.to_string())
    }

    /// Parse the stored value as a base-10 integer.
    ///
    /// # Errors
    ///
    /// * `Error::KeyNotFound` - If the key is not set
    /// * `Error::InvalidValue` - If the value is not an integer literal
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.require(key)?
            .parse::<i64>()
            .map_err(|e| Error::invalid_value(key, "base-10 integer", e))
    }

    /// Store a timestamp as RFC 3339, truncated to whole seconds.
    ///
    /// The UTC offset is kept as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be expressed in RFC 3339
    /// (years outside 0000-9999, offsets with a seconds part), or the save
    /// error; the previous value is restored.
    pub fn set_date_time(&mut self, key: &str, when: OffsetDateTime) -> Result<()> {
        let text = when
            .replace_nanosecond(0)
            .map_err(|e| Error::invalid_value(key, "RFC 3339 timestamp", e))?
            .format(&Rfc3339)
            .map_err(|e| Error::invalid_value(key, "RFC 3339 timestamp", e))?;
        self.set(key, text)
    }

    /// Parse the stored value as an RFC 3339 timestamp.
    ///
    /// # Errors
    ///
    /// * `Error::KeyNotFound` - If the key is not set
    /// * `Error::InvalidValue` - If the value is not RFC 3339
    pub fn get_date_time(&self, key: &str) -> Result<OffsetDateTime> {
        OffsetDateTime::parse(self.require(key)?, &Rfc3339)
            .map_err(|e| Error::invalid_value(key, "RFC 3339 timestamp", e))
    }

    /// Store a list of strings as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns the save error; the previous value is restored.
    pub fn set_array<T: AsRef<str>>(&mut self, key: &str, items: &[T]) -> Result<()> {
        let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
        let text = serde_json::to_string(&items).map_err(|e| Error::Serialize(e.to_string()))?;
        self.set(key, text)
    }

    /// Decode the stored value as a JSON array of strings.
    ///
    /// # Errors
    ///
    /// * `Error::KeyNotFound` - If the key is not set
    /// * `Error::InvalidValue` - If the value is not a JSON string array
    pub fn get_array(&self, key: &str) -> Result<Vec<String>> {
        serde_json::from_str(self.require(key)?)
            .map_err(|e| Error::invalid_value(key, "JSON array of strings", e))
    }

    // -------------------------------------------------------------------------
    // File registries
    // -------------------------------------------------------------------------

    /// Names of the additional config files this config knows about
    pub fn config_files(&self) -> &[String] {
        &self.document.config_files
    }

    /// Names of the raw (non key/value) files this config knows about
    pub fn raw_files(&self) -> &[String] {
        &self.document.raw_files
    }

    /// True if `name` is a registered additional config file
    pub fn has_config_file(&self, name: &str) -> bool {
        self.document.config_files.iter().any(|f| f == name)
    }

    /// True if `name` is a registered raw file
    pub fn has_raw_file(&self, name: &str) -> bool {
        self.document.raw_files.iter().any(|f| f == name)
    }

    /// Register an additional config file name and save.
    ///
    /// Returns `false` (without writing) if the name is already registered.
    /// Only the name is recorded; the file itself is not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is blank, or the save error (the
    /// registration is undone).
    pub fn add_config_file(&mut self, name: &str) -> Result<bool> {
        self.register(Registry::ConfigFiles, name)
    }

    /// Register a raw file name and save.
    ///
    /// # Errors
    ///
    /// Same as [`add_config_file`](Self::add_config_file).
    pub fn add_raw_file(&mut self, name: &str) -> Result<bool> {
        self.register(Registry::RawFiles, name)
    }

    fn register(&mut self, registry: Registry, name: &str) -> Result<bool> {
        if name.trim().is_empty() {
            return Err(Error::InvalidIdentity {
                name: name.to_string(),
                path: self.path.clone(),
            });
        }
        if registry.list(&mut self.document).iter().any(|f| f == name) {
            return Ok(false);
        }

        registry.list(&mut self.document).push(name.to_string());
        if let Err(e) = self.save() {
            registry.list(&mut self.document).pop();
            debug!("Reverted registration of {name} after failed save");
            return Err(e);
        }

        debug!("Registered {name} ({registry:?})");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::macros::datetime;

    #[test]
    fn test_new_creates_file() {
        let dir = tempdir().unwrap();
        let config = GeneralConfig::new("myapp", dir.path()).unwrap();

        assert!(dir.path().join("myapp.conf").exists());
        assert_eq!(config.file_path(), dir.path().join("myapp.conf"));
        assert!(config.get_key_list().is_empty());
        assert!(config.config_files().is_empty());
    }

    #[test]
    fn test_new_rejects_blank_identity() {
        let dir = tempdir().unwrap();

        let result = GeneralConfig::new(" ", dir.path());
        assert!(matches!(result, Err(Error::InvalidIdentity { .. })));

        let result = GeneralConfig::new("myapp", "");
        assert!(matches!(result, Err(Error::InvalidIdentity { .. })));
    }

    #[test]
    fn test_new_rejects_name_with_path_parts() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let escaping = outside.path().join("evil");

        let result = GeneralConfig::new(escaping.to_string_lossy(), dir.path());
        assert!(matches!(result, Err(Error::InvalidIdentity { .. })));
        assert!(!outside.path().join("evil.conf").exists());

        let result = GeneralConfig::new("../myapp", dir.path());
        assert!(matches!(result, Err(Error::InvalidIdentity { .. })));
    }

    #[test]
    fn test_new_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let result = GeneralConfig::new("myapp", dir.path().join("absent"));

        assert!(result.unwrap_err().is_io_error());
    }

    #[test]
    fn test_load_reads_all_sections() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("myapp.conf"),
            r#"additional_config = ["extra", "extra", "more"]
raw_files = ["cache.db"]

[general]
theme = "dark"
"port number" = "8080"
"#,
        )
        .unwrap();

        let config = GeneralConfig::new("myapp", dir.path()).unwrap();

        assert_eq!(config.get("theme"), "dark");
        assert_eq!(config.get_int("port number").unwrap(), 8080);
        assert_eq!(config.config_files(), ["extra", "more"]);
        assert!(config.has_raw_file("cache.db"));
        assert!(!config.has_raw_file("extra"));
    }

    #[test]
    fn test_load_malformed_file_keeps_state() {
        let dir = tempdir().unwrap();
        let mut config = GeneralConfig::new("myapp", dir.path()).unwrap();
        config.set("theme", "dark").unwrap();

        std::fs::write(config.file_path(), "[general\ntheme =").unwrap();

        let result = config.load();
        assert!(matches!(result, Err(Error::Parse(_))));
        assert_eq!(config.get("theme"), "dark");
    }

    #[test]
    fn test_set_rolls_back_when_directory_vanishes() {
        let root = tempdir().unwrap();
        let dir = root.path().join("myapp");
        std::fs::create_dir(&dir).unwrap();

        let mut config = GeneralConfig::new("myapp", &dir).unwrap();
        config.set("theme", "old").unwrap();

        std::fs::remove_dir_all(&dir).unwrap();

        assert!(config.set("theme", "new").is_err());
        assert_eq!(config.get("theme"), "old");

        assert!(config.set("fresh", "value").is_err());
        assert_eq!(config.get("fresh"), "");
        assert!(!config.get_key_list().contains(&"fresh".to_string()));

        assert!(config.delete_key("theme").is_err());
        assert_eq!(config.get("theme"), "old");

        assert!(config.add_config_file("extra").is_err());
        assert!(!config.has_config_file("extra"));
    }

    #[test]
    fn test_date_time_truncates_subseconds() {
        let dir = tempdir().unwrap();
        let mut config = GeneralConfig::new("myapp", dir.path()).unwrap();

        config
            .set_date_time("when", datetime!(2006-01-02 15:04:05.987 -07:00))
            .unwrap();

        assert_eq!(config.get("when"), "2006-01-02T15:04:05-07:00");
        assert_eq!(
            config.get_date_time("when").unwrap(),
            datetime!(2006-01-02 15:04:05 -07:00)
        );
    }

    #[test]
    fn test_bytes_marker_collision_is_encoded() {
        let dir = tempdir().unwrap();
        let mut config = GeneralConfig::new("myapp", dir.path()).unwrap();
        let tricky = format!("{BINARY_MARKER}aGVsbG8=");

        config.set_bytes("blob", tricky.as_bytes()).unwrap();

        assert_ne!(config.get("blob"), tricky);
        assert_eq!(config.get_bytes("blob"), tricky.as_bytes());
    }

    #[test]
    fn test_register_is_deduplicated() {
        let dir = tempdir().unwrap();
        let mut config = GeneralConfig::new("myapp", dir.path()).unwrap();

        assert!(config.add_config_file("extra").unwrap());
        assert!(!config.add_config_file("extra").unwrap());
        assert!(config.add_raw_file("cache.db").unwrap());

        assert_eq!(config.config_files(), ["extra"]);
        assert!(config.add_config_file("").is_err());
    }
}
