//! Common test utilities for user-config integration tests
//!
//! Provides shared fixtures and a storage backend whose writes can be made to fail.

#![allow(dead_code)]

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use user_config::{Error, GeneralConfig, Result, StorageBackend, TomlStorage, UserConfig};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// =============================================================================
// Fixtures
// =============================================================================

/// A `UserConfig` rooted in its own temporary directory
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub config: UserConfig,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::named("myapp")
    }

    pub fn named(name: &str) -> Self {
        init_logging();
        let temp_dir = TempDir::new().unwrap();
        let config = UserConfig::builder(name)
            .config_root(temp_dir.path())
            .build()
            .unwrap();
        Self { temp_dir, config }
    }

    /// Open a second, independent store on the same file
    pub fn reopen(&self) -> GeneralConfig {
        GeneralConfig::new(self.config.name(), self.config.dir()).unwrap()
    }

    pub fn file_path(&self) -> PathBuf {
        self.config.general().file_path()
    }

    pub fn file_contents(&self) -> String {
        std::fs::read_to_string(self.file_path()).unwrap()
    }
}

// =============================================================================
// Failure Injection
// =============================================================================

/// TOML storage whose writes fail while the switch is on
#[derive(Clone, Debug, Default)]
pub struct FailingStorage {
    inner: TomlStorage,
    fail: Arc<AtomicBool>,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for flipping the switch after the storage has been moved into a store
    pub fn switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail)
    }
}

impl StorageBackend for FailingStorage {
    fn extension(&self) -> &str {
        self.inner.extension()
    }

    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        self.inner.serialize(data)
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        self.inner.deserialize(content)
    }

    fn write<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::FileWrite {
                path: path.to_path_buf(),
                source: std::io::Error::other("injected write failure"),
            });
        }
        self.inner.write(path, data)
    }
}

/// A `UserConfig` backed by `FailingStorage`, plus the switch controlling it
pub struct FailingFixture {
    pub temp_dir: TempDir,
    pub config: UserConfig<FailingStorage>,
    pub fail: Arc<AtomicBool>,
}

impl FailingFixture {
    pub fn new() -> Self {
        init_logging();
        let temp_dir = TempDir::new().unwrap();
        let storage = FailingStorage::new();
        let fail = storage.switch();
        let config = UserConfig::builder("myapp")
            .config_root(temp_dir.path())
            .with_storage(storage)
            .build()
            .unwrap();
        Self {
            temp_dir,
            config,
            fail,
        }
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail.store(on, Ordering::SeqCst);
    }

    pub fn file_contents(&self) -> String {
        std::fs::read_to_string(self.config.general().file_path()).unwrap()
    }
}
