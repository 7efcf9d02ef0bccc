//! Per-user config directory resolution
//!
//! The search path is supplied by a [`DirResolver`] so that callers and tests
//! can substitute their own root instead of the platform convention.

use crate::error::{Error, Result};
use log::info;
use std::path::{Component, Path, PathBuf};

/// Source of the per-user configuration search path
pub trait DirResolver {
    /// Candidate configuration directories, most preferred first
    fn config_dirs(&self) -> Vec<PathBuf>;
}

/// The platform's per-user config directory (`$XDG_CONFIG_HOME` or
/// `~/.config` on Linux, `~/Library/Application Support` on macOS,
/// `%APPDATA%` on Windows)
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformDirs;

impl DirResolver for PlatformDirs {
    fn config_dirs(&self) -> Vec<PathBuf> {
        dirs::config_dir().into_iter().collect()
    }
}

/// A fixed config root
#[derive(Debug, Clone)]
pub struct FixedDir(pub PathBuf);

impl DirResolver for FixedDir {
    fn config_dirs(&self) -> Vec<PathBuf> {
        vec![self.0.clone()]
    }
}

/// True if `name` is usable as a single directory or file name
///
/// Blank names, absolute paths, `.`/`..` and anything with more than one
/// path component are rejected.
pub fn is_plain_name(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Resolve `<platform config dir>/<app_name>`
///
/// # Errors
///
/// * `Error::InvalidIdentity` - If `app_name` is not a plain name
/// * `Error::NoConfigDir` - If the platform has no per-user config directory
pub fn resolve(app_name: &str) -> Result<PathBuf> {
    resolve_with(&PlatformDirs, app_name)
}

/// Resolve `<first resolver dir>/<app_name>`
///
/// # Errors
///
/// * `Error::InvalidIdentity` - If `app_name` is blank or not a single
///   path component
/// * `Error::NoConfigDir` - If the resolver returns no directories
pub fn resolve_with(resolver: &(impl DirResolver + ?Sized), app_name: &str) -> Result<PathBuf> {
    if !is_plain_name(app_name) {
        return Err(Error::InvalidIdentity {
            name: app_name.to_string(),
            path: PathBuf::new(),
        });
    }

    let root = resolver
        .config_dirs()
        .into_iter()
        .next()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or(Error::NoConfigDir)?;

    Ok(root.join(app_name))
}

/// Make sure `path` is a directory, creating it (one level only) if missing
///
/// # Errors
///
/// * `Error::NotADirectory` - If something other than a directory is at `path`
/// * `Error::DirectoryCreate` - If the directory is missing and cannot be created
/// * `Error::DirectoryRead` - If the path cannot be inspected
pub fn verify_or_create(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            crate::security::create_config_dir(path)?;
            info!("Created config directory {}", path.display());
            Ok(())
        }
        Err(e) => Err(Error::DirectoryRead {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
