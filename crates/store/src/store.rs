//! The file-system store facade.
//!
//! [`FileSystemStore`] implements [`StoreListener`] over a blocking
//! [`CollectionStore`]. Insert, update and remove rewrite the collection file
//! from the event's in-memory documents; find and findOne reload the file
//! into the event's collection. The [`SyncPolicy`] chosen at construction
//! decides whether that I/O runs on the caller's thread or in the background.

use crate::events::{
    CreateCollectionEvent, FindEvent, InsertEvent, OperationEvent, RemoveEvent, UpdateEvent,
};
use crate::listener::StoreListener;
use crate::writer::PersistWriter;
use async_trait::async_trait;
use docfs_core::metrics;
use docfs_core::storage::{encode_documents, Collection, CollectionStore};
use docfs_core::{Result, StoreError, StoreOptions, SyncPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, Span};

/// Persistence for an engine's collections under one root directory.
#[derive(Debug)]
pub struct FileSystemStore {
    core: Arc<CollectionStore>,
    policy: SyncPolicy,
    writer: Option<PersistWriter>,
}

impl FileSystemStore {
    /// Open the store and create its root directory.
    ///
    /// With `sync = false` this spawns the persist writer and must be called
    /// from within a tokio runtime.
    pub fn new(options: StoreOptions) -> Result<Self> {
        Self::from_core(CollectionStore::new(options)?)
    }

    /// Like [`FileSystemStore::new`], recording log events inside `span`.
    pub fn with_span(options: StoreOptions, span: Span) -> Result<Self> {
        Self::from_core(CollectionStore::with_span(options, span)?)
    }

    fn from_core(core: CollectionStore) -> Result<Self> {
        let policy = core.options().sync_policy();
        let core = Arc::new(core);
        let writer = match policy {
            SyncPolicy::Blocking => None,
            SyncPolicy::Deferred => {
                if tokio::runtime::Handle::try_current().is_err() {
                    return Err(StoreError::invalid_argument(
                        "sync = false requires a running tokio runtime",
                    ));
                }
                Some(PersistWriter::spawn(Arc::clone(&core)))
            }
        };
        Ok(Self {
            core,
            policy,
            writer,
        })
    }

    pub fn core(&self) -> &CollectionStore {
        &self.core
    }

    pub fn options(&self) -> &StoreOptions {
        self.core.options()
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    /// The file backing `database`/`collection`.
    pub fn collection_path(&self, database: &str, collection: &str) -> Result<PathBuf> {
        self.core.collection_path(database, collection)
    }

    fn span(&self) -> Span {
        self.core.span().clone()
    }

    async fn create(&self, event: &CreateCollectionEvent) -> Result<()> {
        let database = event.collection.database()?.to_string();
        let name = event.collection.name.clone();
        tracing::debug!(collection = %event.collection.full_name, "createCollection");
        match self.policy {
            SyncPolicy::Blocking => self.core.create_collection(&database, &name).map(|_| ()),
            SyncPolicy::Deferred => {
                let core = Arc::clone(&self.core);
                tokio::task::spawn_blocking(move || core.create_collection(&database, &name))
                    .await
                    .map_err(|_| StoreError::Interrupted {
                        operation: "createCollection",
                    })?
                    .map(|_| ())
            }
        }
    }

    /// Mirror the collection's current documents to its file.
    async fn persist(&self, operation: &'static str, collection: &Collection) -> Result<()> {
        let path = self.core.path_of(collection)?;
        tracing::debug!(path = %path.display(), "{}", operation);
        let documents = collection.documents();
        match (&self.writer, self.policy) {
            (Some(writer), SyncPolicy::Deferred) => {
                let content = encode_documents(&documents).map_err(|e| {
                    metrics::record_error("persist", e.kind());
                    e
                })?;
                writer.persist(path, content).await
            }
            _ => self.core.persist(&path, &documents).map(|_| ()),
        }
    }

    /// Replace the collection's documents and index with the file content.
    async fn load(&self, operation: &'static str, collection: &Collection) -> Result<()> {
        let path = self.core.path_of(collection)?;
        tracing::debug!(path = %path.display(), "{}", operation);
        match self.policy {
            SyncPolicy::Blocking => self.core.load_into(&path, collection).map(|_| ()),
            SyncPolicy::Deferred => {
                let core = Arc::clone(&self.core);
                let (documents, index) = tokio::task::spawn_blocking(move || core.load(&path))
                    .await
                    .map_err(|_| StoreError::Interrupted { operation })??;
                collection.data.write().replace(documents, index);
                Ok(())
            }
        }
    }

    fn unsupported(&self, operation: &'static str) -> Result<()> {
        let _enter = self.core.span().enter();
        tracing::debug!("{} is not supported by the file-system store", operation);
        metrics::record_error(operation, "unsupported");
        Err(StoreError::Unsupported { operation })
    }
}

#[async_trait]
impl StoreListener for FileSystemStore {
    async fn on_create_collection(&self, event: &CreateCollectionEvent) -> Result<()> {
        self.create(event).instrument(self.span()).await
    }

    async fn on_insert(&self, event: &InsertEvent) -> Result<()> {
        self.persist("insert", &event.collection)
            .instrument(self.span())
            .await
    }

    async fn on_save(&self, _event: &OperationEvent) -> Result<()> {
        self.unsupported("save")
    }

    async fn on_all(&self, _event: &OperationEvent) -> Result<()> {
        self.unsupported("all")
    }

    async fn on_find(&self, event: &FindEvent) -> Result<()> {
        self.load("find", &event.collection)
            .instrument(self.span())
            .await
    }

    /// Loads the whole collection, exactly like `find`.
    async fn on_find_one(&self, event: &FindEvent) -> Result<()> {
        self.load("findOne", &event.collection)
            .instrument(self.span())
            .await
    }

    async fn on_update(&self, event: &UpdateEvent) -> Result<()> {
        self.persist("update", &event.collection)
            .instrument(self.span())
            .await
    }

    async fn on_remove(&self, event: &RemoveEvent) -> Result<()> {
        self.persist("remove", &event.collection)
            .instrument(self.span())
            .await
    }

    async fn on_ensure_index(&self, _event: &OperationEvent) -> Result<()> {
        self.unsupported("ensureIndex")
    }

    async fn on_backup(&self, _event: &OperationEvent) -> Result<()> {
        self.unsupported("backup")
    }

    async fn on_backups(&self, _event: &OperationEvent) -> Result<()> {
        self.unsupported("backups")
    }

    async fn on_remove_backup(&self, _event: &OperationEvent) -> Result<()> {
        self.unsupported("removeBackup")
    }

    async fn on_restore(&self, _event: &OperationEvent) -> Result<()> {
        self.unsupported("restore")
    }
}
