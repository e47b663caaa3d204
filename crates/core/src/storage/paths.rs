//! Collection path resolution.
//!
//! A collection lives at `{root}/{database}/{collection}.{extension}`.

use crate::error::{Result, StoreError};
use std::path::{Path, PathBuf};

/// Resolve the file backing `database`/`collection` under `root`.
///
/// Pure: nothing is touched on disk.
pub fn resolve_collection_path(
    root: &Path,
    database: &str,
    collection: &str,
    extension: &str,
) -> Result<PathBuf> {
    check_name("database", database)?;
    check_name("collection", collection)?;
    Ok(root
        .join(database)
        .join(format!("{collection}.{extension}")))
}

/// The database part of a qualified `"<database>.<collection>"` name.
pub fn database_of(full_name: &str) -> Result<&str> {
    let database = full_name.split('.').next().unwrap_or_default();
    if database.is_empty() {
        return Err(StoreError::invalid_argument(format!(
            "qualified collection name '{full_name}' has no database part"
        )));
    }
    Ok(database)
}

fn check_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::invalid_argument(format!(
            "parameter '{what}' is required"
        )));
    }
    // Names become a single path component.
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(StoreError::invalid_argument(format!(
            "{what} name '{name}' is not a valid file name"
        )));
    }
    Ok(())
}
