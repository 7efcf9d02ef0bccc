//! File and directory permissions for config storage

use crate::error::{Error, Result};
use std::path::Path;

/// Mode for application config directories (owner rwx, group/other r-x)
pub const CONFIG_DIR_MODE: u32 = 0o755;

/// Mode for config files (owner rw, group/other read-only)
pub const CONFIG_FILE_MODE: u32 = 0o644;

/// Create a single directory with [`CONFIG_DIR_MODE`]
///
/// Parents are not created: a missing parent is reported as
/// `Error::DirectoryCreate`, as is an already existing path.
///
/// # Errors
///
/// * `Error::DirectoryCreate` - If the directory cannot be created
#[cfg(unix)]
pub fn create_config_dir(path: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .mode(CONFIG_DIR_MODE)
        .create(path)
        .map_err(|e| Error::DirectoryCreate {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Create a single directory (permissions managed via ACLs on Windows)
#[cfg(not(unix))]
pub fn create_config_dir(path: &Path) -> Result<()> {
    std::fs::create_dir(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Set [`CONFIG_FILE_MODE`] on a file
///
/// # Errors
///
/// * `Error::FileWrite` - If the permissions cannot be changed
#[cfg(unix)]
pub fn set_config_file_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(CONFIG_FILE_MODE)).map_err(
        |e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        },
    )
}

/// No-op on Windows (permissions managed via ACLs)
#[cfg(not(unix))]
pub fn set_config_file_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
