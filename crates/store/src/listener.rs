//! The interface the owning engine calls for each lifecycle event.

use crate::events::{
    CreateCollectionEvent, FindEvent, InsertEvent, OperationEvent, RemoveEvent, StoreEvent,
    UpdateEvent,
};
use async_trait::async_trait;
use docfs_core::Result;

/// Receives lifecycle events from a document-database engine.
///
/// Each method resolves once the store has finished with the event, or with
/// the error that stopped it.
#[async_trait]
pub trait StoreListener: Send + Sync {
    async fn on_create_collection(&self, event: &CreateCollectionEvent) -> Result<()>;

    async fn on_insert(&self, event: &InsertEvent) -> Result<()>;

    async fn on_save(&self, event: &OperationEvent) -> Result<()>;

    async fn on_all(&self, event: &OperationEvent) -> Result<()>;

    /// Replaces the event collection's documents and index with the stored ones.
    async fn on_find(&self, event: &FindEvent) -> Result<()>;

    async fn on_find_one(&self, event: &FindEvent) -> Result<()>;

    async fn on_update(&self, event: &UpdateEvent) -> Result<()>;

    async fn on_remove(&self, event: &RemoveEvent) -> Result<()>;

    async fn on_ensure_index(&self, event: &OperationEvent) -> Result<()>;

    async fn on_backup(&self, event: &OperationEvent) -> Result<()>;

    async fn on_backups(&self, event: &OperationEvent) -> Result<()>;

    async fn on_remove_backup(&self, event: &OperationEvent) -> Result<()>;

    async fn on_restore(&self, event: &OperationEvent) -> Result<()>;
}

/// Route `event` to the matching listener method.
pub async fn dispatch<L>(listener: &L, event: &StoreEvent) -> Result<()>
where
    L: StoreListener + ?Sized,
{
    match event {
        StoreEvent::CreateCollection(e) => listener.on_create_collection(e).await,
        StoreEvent::Insert(e) => listener.on_insert(e).await,
        StoreEvent::Save(e) => listener.on_save(e).await,
        StoreEvent::All(e) => listener.on_all(e).await,
        StoreEvent::Find(e) => listener.on_find(e).await,
        StoreEvent::FindOne(e) => listener.on_find_one(e).await,
        StoreEvent::Update(e) => listener.on_update(e).await,
        StoreEvent::Remove(e) => listener.on_remove(e).await,
        StoreEvent::EnsureIndex(e) => listener.on_ensure_index(e).await,
        StoreEvent::Backup(e) => listener.on_backup(e).await,
        StoreEvent::Backups(e) => listener.on_backups(e).await,
        StoreEvent::RemoveBackup(e) => listener.on_remove_backup(e).await,
        StoreEvent::Restore(e) => listener.on_restore(e).await,
    }
}
