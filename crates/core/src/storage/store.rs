//! Blocking collection store.
//!
//! [`CollectionStore`] ties path resolution, directory management, the per-path
//! write locks, and persist/load together for one [`StoreOptions`]. Every call
//! runs on the caller's thread.

use crate::config::StoreOptions;
use crate::document::{Document, DocumentIndex};
use crate::error::{Result, StoreError};
use crate::metrics;
use crate::storage::collection::{Collection, CollectionDescriptor};
use crate::storage::fs::{create_collection_file, ensure_parent_directory, ensure_root_directory};
use crate::storage::locks::WriteLocks;
use crate::storage::paths::resolve_collection_path;
use crate::storage::persistence::{load_collection, persist_collection, write_atomic};
use std::path::{Path, PathBuf};
use tracing::Span;

/// File-backed store for the collections under one root directory.
#[derive(Debug)]
pub struct CollectionStore {
    options: StoreOptions,
    locks: WriteLocks,
    span: Span,
}

impl CollectionStore {
    /// Open a store, creating the root directory if needed.
    pub fn new(options: StoreOptions) -> Result<Self> {
        let span = tracing::info_span!("docfs", root = %options.root_path.display());
        Self::with_span(options, span)
    }

    /// Open a store whose log events are recorded inside `span`.
    pub fn with_span(options: StoreOptions, span: Span) -> Result<Self> {
        span.in_scope(|| {
            ensure_root_directory(&options.root_path)?;
            tracing::info!("Database will be in {}", options.root_path.display());
            Ok::<_, StoreError>(())
        })?;
        Ok(Self {
            options,
            locks: WriteLocks::new(),
            span,
        })
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// The file backing `database`/`collection`.
    pub fn collection_path(&self, database: &str, collection: &str) -> Result<PathBuf> {
        resolve_collection_path(
            &self.options.root_path,
            database,
            collection,
            &self.options.file_extension,
        )
    }

    /// The file backing a collection descriptor.
    pub fn descriptor_path(&self, descriptor: &CollectionDescriptor) -> Result<PathBuf> {
        self.collection_path(descriptor.database()?, &descriptor.name)
    }

    /// Create an empty collection file if there is none. Idempotent; returns
    /// the collection path.
    pub fn create_collection(&self, database: &str, collection: &str) -> Result<PathBuf> {
        let _enter = self.span.enter();
        let path = self.collection_path(database, collection)?;
        observe("create_collection", self.create_file(&path))?;
        Ok(path)
    }

    fn create_file(&self, path: &Path) -> Result<()> {
        ensure_parent_directory(path)?;
        let created = self.locks.with_lock(path, || create_collection_file(path))?;
        if created {
            tracing::info!("Created collection file {}", path.display());
        } else {
            tracing::debug!("Collection file {} already exists", path.display());
        }
        Ok(())
    }

    /// Rewrite the file at `path` with `documents`. Returns bytes written.
    pub fn persist(&self, path: &Path, documents: &[Document]) -> Result<usize> {
        let _enter = self.span.enter();
        let result = ensure_parent_directory(path)
            .and_then(|()| self.locks.with_lock(path, || persist_collection(path, documents)));
        observe("persist", result)
    }

    /// Rewrite the file at `path` with content that is already encoded.
    pub fn write_encoded(&self, path: &Path, content: &str) -> Result<()> {
        let _enter = self.span.enter();
        let result = ensure_parent_directory(path)
            .and_then(|()| self.locks.with_lock(path, || write_atomic(path, content.as_bytes())));
        if result.is_ok() {
            let documents = content.matches('\n').count();
            tracing::info!(
                "Persisted {} documents to {} ({} bytes)",
                documents,
                path.display(),
                content.len()
            );
            metrics::record_persist(path, documents, content.len());
        }
        observe("persist", result)
    }

    /// Persist the current document sequence of `collection`.
    pub fn persist_collection(&self, collection: &Collection) -> Result<usize> {
        let path = self.path_of(collection)?;
        let documents = collection.documents();
        self.persist(&path, &documents)
    }

    /// Read the file at `path` into documents and index.
    pub fn load(&self, path: &Path) -> Result<(Vec<Document>, DocumentIndex)> {
        let _enter = self.span.enter();
        observe("load", load_collection(path))
    }

    /// Load the file at `path` and replace `collection`'s documents and index
    /// with it. Returns the number of documents loaded.
    pub fn load_into(&self, path: &Path, collection: &Collection) -> Result<usize> {
        let (documents, index) = self.load(path)?;
        let count = documents.len();
        collection.data.write().replace(documents, index);
        Ok(count)
    }

    /// Resolve the file of a collection handle from its descriptor.
    pub fn path_of(&self, collection: &Collection) -> Result<PathBuf> {
        let descriptor = collection.descriptor().ok_or_else(|| {
            StoreError::invalid_argument("collection has no descriptor")
        })?;
        self.descriptor_path(&descriptor)
    }
}

fn observe<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        metrics::record_error(operation, e.kind());
    }
    result
}
