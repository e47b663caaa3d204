//! Error taxonomy for collection file operations.
//!
//! Every failure is returned to the caller. Nothing in this crate retries or
//! logs-and-ignores an error.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for docfs operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors produced while resolving, writing, or reading collection files.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required identifying parameter is missing or malformed.
    /// The operation was not attempted.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The collection file does not exist.
    #[error("collection file not found: {}", path.display())]
    CollectionNotFound { path: PathBuf },

    /// A line of the collection file is not a valid document.
    #[error("corrupt collection file {} at line {line}: {reason}", path.display())]
    CorruptCollectionFile {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Underlying filesystem failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The operation is part of the listener surface but is not implemented
    /// by this store.
    #[error("operation '{operation}' is not supported by the file-system store")]
    Unsupported { operation: &'static str },

    /// A background task stopped before reporting a result.
    #[error("background task for '{operation}' stopped before completing")]
    Interrupted { operation: &'static str },
}

impl StoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        StoreError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, line: usize, reason: impl Into<String>) -> Self {
        StoreError::CorruptCollectionFile {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }

    /// A copy of this error for fan-out to several waiters. I/O sources are
    /// rebuilt from their kind and message.
    pub fn duplicate(&self) -> Self {
        match self {
            StoreError::InvalidArgument { message } => StoreError::InvalidArgument {
                message: message.clone(),
            },
            StoreError::CollectionNotFound { path } => StoreError::CollectionNotFound {
                path: path.clone(),
            },
            StoreError::CorruptCollectionFile { path, line, reason } => {
                StoreError::CorruptCollectionFile {
                    path: path.clone(),
                    line: *line,
                    reason: reason.clone(),
                }
            }
            StoreError::Io { path, source } => StoreError::Io {
                path: path.clone(),
                source: io::Error::new(source.kind(), source.to_string()),
            },
            StoreError::Unsupported { operation } => StoreError::Unsupported {
                operation: *operation,
            },
            StoreError::Interrupted { operation } => StoreError::Interrupted {
                operation: *operation,
            },
        }
    }

    /// Short, stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::InvalidArgument { .. } => "invalid_argument",
            StoreError::CollectionNotFound { .. } => "collection_not_found",
            StoreError::CorruptCollectionFile { .. } => "corrupt_collection_file",
            StoreError::Io { .. } => "io",
            StoreError::Unsupported { .. } => "unsupported",
            StoreError::Interrupted { .. } => "interrupted",
        }
    }
}
