//! docfs-store: file-system store for a document-database engine.
//!
//! Listens to the engine's collection lifecycle events and mirrors each
//! collection to a line-delimited JSON file. File handling lives in
//! `docfs-core`; this crate adds the event surface and the deferred
//! (tokio-based) write policy.

/// Lifecycle event payloads.
pub mod events;
/// The `StoreListener` trait and event dispatch.
pub mod listener;
/// The `FileSystemStore` facade.
pub mod store;
/// Background persist writer used when `sync = false`.
pub mod writer;

pub use events::StoreEvent;
pub use listener::{dispatch, StoreListener};
pub use store::FileSystemStore;
