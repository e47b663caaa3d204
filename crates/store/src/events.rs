//! Lifecycle events sent by the owning engine.
//!
//! Events that read or rewrite a collection carry the engine's shared
//! [`Collection`] handle. For mutations the handle already reflects the
//! change; the store mirrors it to disk.

use docfs_core::storage::{Collection, CollectionDescriptor};
use docfs_core::Document;
use serde_json::Value;

/// A collection was created.
#[derive(Debug, Clone)]
pub struct CreateCollectionEvent {
    pub collection: CollectionDescriptor,
}

/// A document was inserted.
#[derive(Debug, Clone)]
pub struct InsertEvent {
    pub collection: Collection,
    pub document: Document,
}

/// Documents matching `selector` were updated with `modifier`.
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub collection: Collection,
    pub selector: Value,
    pub modifier: Value,
    /// The updated or upserted documents.
    pub documents: Vec<Document>,
}

/// Documents matching `selector` were removed.
#[derive(Debug, Clone)]
pub struct RemoveEvent {
    pub collection: Collection,
    pub selector: Value,
    /// The removed documents.
    pub documents: Vec<Document>,
}

/// A query is about to run. `selector` and `fields` are evaluated by the
/// engine, not by the store.
#[derive(Debug, Clone)]
pub struct FindEvent {
    pub collection: Collection,
    pub selector: Value,
    pub fields: Value,
}

/// Arguments of operations the file-system store does not implement.
#[derive(Debug, Clone, Default)]
pub struct OperationEvent {
    pub collection: Option<CollectionDescriptor>,
    pub arguments: Value,
}

/// Every event the store listens to, keyed by its contract name.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    CreateCollection(CreateCollectionEvent),
    Insert(InsertEvent),
    Save(OperationEvent),
    All(OperationEvent),
    Find(FindEvent),
    FindOne(FindEvent),
    Update(UpdateEvent),
    Remove(RemoveEvent),
    EnsureIndex(OperationEvent),
    Backup(OperationEvent),
    Backups(OperationEvent),
    RemoveBackup(OperationEvent),
    Restore(OperationEvent),
}

impl StoreEvent {
    /// The contract name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            StoreEvent::CreateCollection(_) => "createCollection",
            StoreEvent::Insert(_) => "insert",
            StoreEvent::Save(_) => "save",
            StoreEvent::All(_) => "all",
            StoreEvent::Find(_) => "find",
            StoreEvent::FindOne(_) => "findOne",
            StoreEvent::Update(_) => "update",
            StoreEvent::Remove(_) => "remove",
            StoreEvent::EnsureIndex(_) => "ensureIndex",
            StoreEvent::Backup(_) => "backup",
            StoreEvent::Backups(_) => "backups",
            StoreEvent::RemoveBackup(_) => "removeBackup",
            StoreEvent::Restore(_) => "restore",
        }
    }
}
