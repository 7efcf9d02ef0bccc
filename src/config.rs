//! Application-facing config handle
//!
//! [`UserConfig`] resolves `<config dir>/<app>`, makes sure it exists, and
//! forwards everything else to the [`GeneralConfig`] stored there.

use crate::error::Result;
use crate::general::GeneralConfig;
use crate::paths::{self, DirResolver, FixedDir, PlatformDirs};
use crate::storage::{StorageBackend, TomlStorage};

use log::info;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Config of one application, stored in its per-user config directory.
///
/// # Example
///
/// ```rust,no_run
/// use user_config::UserConfig;
///
/// let mut config = UserConfig::new("myapp")?;
/// config.set("theme", "dark")?;
/// println!("{:?}", config.get_key_list());
/// # Ok::<(), user_config::Error>(())
/// ```
#[derive(Debug)]
pub struct UserConfig<S: StorageBackend = TomlStorage> {
    name: String,
    dir: PathBuf,
    general: GeneralConfig<S>,
}

impl UserConfig {
    /// Open (or create) the config of `name` in the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be resolved or created, or if
    /// the config file cannot be created or loaded.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::builder(name).build()
    }

    /// Create a builder for `UserConfig`
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use user_config::UserConfig;
    ///
    /// let config = UserConfig::builder("myapp")
    ///     .config_root("~/.myapps")
    ///     .build()?;
    /// # Ok::<(), user_config::Error>(())
    /// ```
    pub fn builder(name: impl Into<String>) -> UserConfigBuilder {
        UserConfigBuilder::new(name)
    }
}

impl<S: StorageBackend> UserConfig<S> {
    /// Application name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved application config directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The underlying primary config file
    pub fn general(&self) -> &GeneralConfig<S> {
        &self.general
    }

    /// Re-read the config file from disk
    ///
    /// # Errors
    ///
    /// See [`GeneralConfig::load`].
    pub fn load(&mut self) -> Result<()> {
        self.general.load()
    }

    /// Write the config file to disk
    ///
    /// # Errors
    ///
    /// See [`GeneralConfig::save`].
    pub fn save(&self) -> Result<()> {
        self.general.save()
    }

    /// Get a value, or `""` if the key is not set
    pub fn get(&self, key: &str) -> &str {
        self.general.get(key)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::set`].
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.general.set(key, value)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::set_bytes`].
    pub fn set_bytes(&mut self, key: &str, raw: &[u8]) -> Result<()> {
        self.general.set_bytes(key, raw)
    }

    /// Get a byte value, or an empty vector if the key is not set
    pub fn get_bytes(&self, key: &str) -> Vec<u8> {
        self.general.get_bytes(key)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::set_int`].
    pub fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        self.general.set_int(key, value)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::get_int`].
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.general.get_int(key)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::set_date_time`].
    pub fn set_date_time(&mut self, key: &str, when: OffsetDateTime) -> Result<()> {
        self.general.set_date_time(key, when)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::get_date_time`].
    pub fn get_date_time(&self, key: &str) -> Result<OffsetDateTime> {
        self.general.get_date_time(key)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::set_array`].
    pub fn set_array<T: AsRef<str>>(&mut self, key: &str, items: &[T]) -> Result<()> {
        self.general.set_array(key, items)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::get_array`].
    pub fn get_array(&self, key: &str) -> Result<Vec<String>> {
        self.general.get_array(key)
    }

    /// # Errors
    ///
    /// See [`GeneralConfig::delete_key`].
    pub fn delete_key(&mut self, key: &str) -> Result<()> {
        self.general.delete_key(key)
    }

    /// All keys of the general section, in no particular order
    pub fn get_key_list(&self) -> Vec<String> {
        self.general.get_key_list()
    }

    /// Registered additional config files, in registration order
    pub fn config_files(&self) -> &[String] {
        self.general.config_files()
    }

    /// Registered raw files, in registration order
    pub fn raw_files(&self) -> &[String] {
        self.general.raw_files()
    }

    /// Whether `name` is registered as an additional config file
    pub fn has_config_file(&self, name: &str) -> bool {
        self.general.has_config_file(name)
    }

    /// Whether `name` is registered as a raw file
    pub fn has_raw_file(&self, name: &str) -> bool {
        self.general.has_raw_file(name)
    }

    /// Register an additional config file and save.
    /// Returns `false` if it was already registered.
    ///
    /// # Errors
    ///
    /// See [`GeneralConfig::add_config_file`].
    pub fn add_config_file(&mut self, name: &str) -> Result<bool> {
        self.general.add_config_file(name)
    }

    /// Register a raw file and save.
    /// Returns `false` if it was already registered.
    ///
    /// # Errors
    ///
    /// See [`GeneralConfig::add_raw_file`].
    pub fn add_raw_file(&mut self, name: &str) -> Result<bool> {
        self.general.add_raw_file(name)
    }
}

/// Builder for [`UserConfig`]
///
/// By default the platform config directory and TOML storage are used.
pub struct UserConfigBuilder<S: StorageBackend = TomlStorage> {
    name: String,
    resolver: Box<dyn DirResolver>,
    storage: S,
}

impl UserConfigBuilder {
    /// Create a new builder for the application `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resolver: Box::new(PlatformDirs),
            storage: TomlStorage::new(),
        }
    }
}

impl<S: StorageBackend> UserConfigBuilder<S> {
    /// Use `root` instead of the platform config directory.
    ///
    /// Supports `~` expansion for home directory.
    pub fn config_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let expanded = if root.starts_with("~") {
            match dirs::home_dir() {
                Some(home) => home.join(root.strip_prefix("~").unwrap_or(&root)),
                None => root,
            }
        } else {
            root
        };
        self.resolver = Box::new(FixedDir(expanded));
        self
    }

    /// Use a custom search-path source
    pub fn resolver(mut self, resolver: impl DirResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Use a different storage backend
    pub fn with_storage<T: StorageBackend>(self, storage: T) -> UserConfigBuilder<T> {
        UserConfigBuilder {
            name: self.name,
            resolver: self.resolver,
            storage,
        }
    }

    /// Resolve and create the config directory, then open the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The name is blank or no config directory can be resolved
    /// * The directory is missing and cannot be created, or a non-directory
    ///   occupies its path
    /// * The config file cannot be created or loaded
    pub fn build(self) -> Result<UserConfig<S>> {
        let dir = paths::resolve_with(self.resolver.as_ref(), &self.name)?;
        paths::verify_or_create(&dir)?;

        let general = GeneralConfig::with_storage(self.name.clone(), dir.clone(), self.storage)?;

        info!("Initialized config '{}' at {}", self.name, dir.display());

        Ok(UserConfig {
            name: self.name,
            dir,
            general,
        })
    }
}
