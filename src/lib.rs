//! # user-config - Per-user application config files
//!
//! Keeps one primary config file per application in the standard per-user
//! config directory (`~/.config/<app>/<app>.conf` on Linux) and exposes
//! typed accessors over it.
//!
//! ## Features
//!
//! - **Directory handling**: Resolves the platform config directory and creates
//!   the application directory on first use
//! - **Flat key/value settings**: Strings, with integer, timestamp, byte and
//!   string-array projections
//! - **Safe writes**: Atomic file replacement, and failed writes never leave
//!   the in-memory state out of sync with the file
//! - **File registry**: Remembers the names of additional config and raw files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use user_config::UserConfig;
//!
//! # fn example() -> user_config::Result<()> {
//! let mut config = UserConfig::new("myapp")?;
//!
//! config.set("theme", "dark")?;
//! config.set_int("font_size", 14)?;
//! config.set_array("recent", &["a.txt", "b.txt"])?;
//!
//! assert_eq!(config.get("theme"), "dark");
//! assert_eq!(config.get_int("font_size")?, 14);
//! # Ok(())
//! # }
//! ```
//!
//! ## File Format
//!
//! The config file is TOML with three top-level sections:
//!
//! ```toml
//! additional_config = ["extra"]
//! raw_files = ["cache.db"]
//!
//! [general]
//! theme = "dark"
//! font_size = "14"
//! ```
//!
//! ## Missing vs. Malformed Values
//!
//! [`UserConfig::get`] and [`UserConfig::get_bytes`] return an empty value for
//! unset keys. The typed getters return [`Error::KeyNotFound`] for unset keys
//! and [`Error::InvalidValue`] for values that do not parse; both are reported
//! by [`Error::is_decode_error`].

mod config;
mod error;
mod general;
pub mod paths;
pub mod security;
pub mod storage;

pub use config::{UserConfig, UserConfigBuilder};
pub use error::{Error, Result};
pub use general::{GeneralConfig, BINARY_MARKER};
pub use paths::{DirResolver, FixedDir, PlatformDirs};
pub use storage::{StorageBackend, TomlStorage};
