//! In-memory collection types handed to the store by the owning engine.
//!
//! A [`Collection`] is a shared handle to [`CollectionData`]: the ordered
//! document sequence plus its id → position index. The store only reads or
//! replaces these two fields while a call is in progress; the engine owns the
//! handle.

use crate::document::{index_documents, Document, DocumentId, DocumentIndex};
use crate::error::{Result, StoreError};
use crate::storage::paths::database_of;
use parking_lot::RwLock;
use std::sync::Arc;

/// Identifies a collection: its short name and its qualified
/// `"<database>.<collection>"` name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionDescriptor {
    pub name: String,
    pub full_name: String,
}

impl CollectionDescriptor {
    pub fn new(database: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: format!("{database}.{name}"),
        }
    }

    /// The database part of the qualified name.
    pub fn database(&self) -> Result<&str> {
        database_of(&self.full_name)
    }
}

/// Document sequence and index, protected by the `RwLock` in [`Collection`].
#[derive(Debug, Default, Clone)]
pub struct CollectionData {
    pub descriptor: Option<CollectionDescriptor>,
    pub documents: Vec<Document>,
    pub index: DocumentIndex,
}

impl CollectionData {
    /// Replaces documents and index wholesale.
    pub fn replace(&mut self, documents: Vec<Document>, index: DocumentIndex) {
        self.documents = documents;
        self.index = index;
    }

    /// Check that the index maps every document id to its position and has
    /// no extra keys.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let rebuilt = index_documents(&self.documents).map_err(|e| e.to_string())?;
        if rebuilt.len() != self.index.len() {
            return Err(format!(
                "index has {} keys but collection has {} documents",
                self.index.len(),
                rebuilt.len()
            ));
        }
        for (id, position) in &rebuilt {
            match self.index.get(id) {
                Some(p) if p == position => {}
                Some(p) => {
                    return Err(format!(
                        "index maps {id} to {p} but the document is at {position}"
                    ))
                }
                None => return Err(format!("index is missing {id}")),
            }
        }
        Ok(())
    }
}

/// A shared handle to an in-memory collection.
///
/// Cloning a `Collection` produces a new handle to the same data.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    pub data: Arc<RwLock<CollectionData>>,
}

impl Collection {
    pub fn new(descriptor: CollectionDescriptor) -> Self {
        Self {
            data: Arc::new(RwLock::new(CollectionData {
                descriptor: Some(descriptor),
                ..CollectionData::default()
            })),
        }
    }

    pub fn descriptor(&self) -> Option<CollectionDescriptor> {
        self.data.read().descriptor.clone()
    }

    /// Copy of the current document sequence.
    pub fn documents(&self) -> Vec<Document> {
        self.data.read().documents.clone()
    }

    /// Copy of the current index.
    pub fn index(&self) -> DocumentIndex {
        self.data.read().index.clone()
    }

    pub fn document_count(&self) -> usize {
        self.data.read().documents.len()
    }

    pub fn get_document(&self, id: &DocumentId) -> Option<Document> {
        let data = self.data.read();
        data.index.get(id).map(|&i| data.documents[i].clone())
    }

    /// Appends a document. Fails if it has no valid `_id` or the id exists.
    pub fn insert_document(&self, doc: Document) -> Result<()> {
        let id = doc
            .id()
            .ok_or_else(|| StoreError::invalid_argument("document has no valid `_id`"))?;
        let mut data = self.data.write();
        if data.index.contains_key(&id) {
            return Err(StoreError::invalid_argument(format!(
                "duplicate `_id` {id}"
            )));
        }
        let position = data.documents.len();
        data.documents.push(doc);
        data.index.insert(id, position);
        Ok(())
    }

    /// Replaces the document with the same id in place. Returns `false` if the
    /// id is unknown.
    pub fn update_document(&self, doc: Document) -> Result<bool> {
        let id = doc
            .id()
            .ok_or_else(|| StoreError::invalid_argument("document has no valid `_id`"))?;
        let mut data = self.data.write();
        match data.index.get(&id).copied() {
            Some(position) => {
                data.documents[position] = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Removes a document by id and shifts the positions that follow it.
    pub fn remove_document(&self, id: &DocumentId) -> Option<Document> {
        let mut data = self.data.write();
        let position = data.index.remove(id)?;
        let removed = data.documents.remove(position);
        for p in data.index.values_mut() {
            if *p > position {
                *p -= 1;
            }
        }
        Some(removed)
    }
}
