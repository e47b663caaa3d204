//! Configuration for docfs stores.
//!
//! Defaults are compile-time constants. Runtime configuration is a
//! [`StoreOptions`] value fixed at store construction; the `docfs` binary
//! fills it from CLI arguments and environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory holding one subdirectory per database.
pub const DEFAULT_ROOT_PATH: &str = "db";

/// Default extension of collection files.
pub const DEFAULT_FILE_EXTENSION: &str = "json";

/// Blocking I/O is the default write policy.
pub const DEFAULT_SYNC: bool = true;

/// Capacity of the deferred persist queue before senders wait.
pub const PERSIST_QUEUE_CAPACITY: usize = 1024;

/// Maximum persist requests drained into one writer batch.
pub const PERSIST_MAX_BATCH: usize = 64;

/// Name of the field holding a document's unique id.
pub const ID_FIELD: &str = "_id";

/// Options captured once when a store is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Directory containing the per-database subdirectories.
    pub root_path: PathBuf,
    /// Extension appended to collection file names (without the dot).
    pub file_extension: String,
    /// `true` blocks the caller for every file operation; `false` defers
    /// writes to a background writer and reads to the blocking pool.
    pub sync: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from(DEFAULT_ROOT_PATH),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            sync: DEFAULT_SYNC,
        }
    }
}

impl StoreOptions {
    pub fn with_root_path(mut self, root_path: impl Into<PathBuf>) -> Self {
        self.root_path = root_path.into();
        self
    }

    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// The write policy selected by [`StoreOptions::sync`].
    pub fn sync_policy(&self) -> SyncPolicy {
        if self.sync {
            SyncPolicy::Blocking
        } else {
            SyncPolicy::Deferred
        }
    }
}

/// Whether file operations block the caller or complete later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// I/O runs on the calling thread before the operation returns.
    Blocking,
    /// I/O is handed off; the caller is notified on completion.
    Deferred,
}
