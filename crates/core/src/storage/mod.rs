//! Storage layer: collections, path resolution, directories, and disk persistence.
//!
//! Documents live in memory in [`Collection`] handles owned by the host engine.
//! Each collection is mirrored to one line-delimited JSON file, rewritten
//! atomically (temp file + rename) on every persist.

/// Line-delimited JSON encoding and decoding.
pub mod codec;
/// In-memory collection handle and descriptor.
pub mod collection;
/// Root, database directory and collection file creation.
pub mod fs;
/// Per-path write locks.
pub mod locks;
/// Collection path resolution.
pub mod paths;
/// Persist and load with atomic writes.
pub mod persistence;
/// Blocking store combining the pieces above.
pub mod store;

pub use codec::{decode_documents, encode_documents};
pub use collection::{Collection, CollectionData, CollectionDescriptor};
pub use locks::WriteLocks;
pub use paths::{database_of, resolve_collection_path};
pub use persistence::{load_collection, persist_collection, write_atomic};
pub use store::CollectionStore;
