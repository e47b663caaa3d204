//! Directory and collection-file lifecycle.
//!
//! All helpers are idempotent: existing directories and files are left as
//! they are.

use crate::error::{Result, StoreError};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// Create the storage root if it does not exist.
pub fn ensure_root_directory(root: &Path) -> Result<()> {
    if root.exists() && !root.is_dir() {
        return Err(StoreError::io(
            root,
            io::Error::new(io::ErrorKind::AlreadyExists, "exists but is not a directory"),
        ));
    }
    fs::create_dir_all(root).map_err(|e| StoreError::io(root, e))
}

/// Create the database directory that holds `collection_path`.
pub fn ensure_parent_directory(collection_path: &Path) -> Result<()> {
    match collection_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Create an empty collection file unless one already exists.
///
/// Returns `true` if the file was created by this call.
pub fn create_collection_file(path: &Path) -> Result<bool> {
    let mut opts = OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    match opts.open(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_file() => Ok(false),
        Err(e) => Err(StoreError::io(path, e)),
    }
}
