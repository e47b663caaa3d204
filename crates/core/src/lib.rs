//! # docfs-core
//!
//! File-backed persistence for document collections. Each collection is a
//! UTF-8 file holding one JSON document per line; loading a collection
//! rebuilds its id → position index.
//!
//! This is the synchronous library crate with zero async dependencies. The
//! deferred write policy and the lifecycle listener live in `docfs-store`.

/// Configuration constants and [`StoreOptions`](config::StoreOptions).
pub mod config;
/// Core document types: `Document`, `DocumentId`, and the id index.
pub mod document;
/// Error taxonomy shared by every operation.
pub mod error;
/// Persist/load metric recording.
pub mod metrics;
/// Storage layer: collections, paths, directories, codec, and persistence.
pub mod storage;

pub use config::{StoreOptions, SyncPolicy};
pub use document::{Document, DocumentId, DocumentIndex};
pub use error::{Result, StoreError};
