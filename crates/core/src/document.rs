//! Core document types for docfs.
//!
//! A [`Document`] is an ordered JSON object carrying a unique `_id`. Field order
//! is kept as inserted so a document is written back exactly as it was built.
//! [`DocumentId`] is the hashable key extracted from `_id`.

use crate::config::ID_FIELD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Mapping from document id to the document's position in its collection.
pub type DocumentIndex = HashMap<DocumentId, usize>;

/// The value of a document's `_id` field, usable as a map key.
///
/// Strings and numbers are distinct keys: `"1"` and `1` never collide.
/// Numbers keep their JSON text so `1` and `1.0` are also distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentId {
    String(String),
    Number(String),
    Bool(bool),
}

impl DocumentId {
    /// Extracts an id from a JSON value. Objects, arrays and `null` are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(DocumentId::String(s.clone())),
            Value::Number(n) => Some(DocumentId::Number(n.to_string())),
            Value::Bool(b) => Some(DocumentId::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Converts the id back into the JSON value stored under `_id`.
    pub fn to_value(&self) -> Value {
        match self {
            DocumentId::String(s) => Value::String(s.clone()),
            DocumentId::Number(n) => serde_json::from_str(n).unwrap_or(Value::String(n.clone())),
            DocumentId::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::String(s) => write!(f, "\"{s}\""),
            DocumentId::Number(n) => f.write_str(n),
            DocumentId::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId::String(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId::String(s)
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        DocumentId::Number(n.to_string())
    }
}

impl From<u64> for DocumentId {
    fn from(n: u64) -> Self {
        DocumentId::Number(n.to_string())
    }
}

/// A JSON record stored in a collection.
///
/// Serializes transparently as the underlying JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Creates a document holding only the given `_id`.
    pub fn new(id: impl Into<DocumentId>) -> Self {
        let mut fields = Map::new();
        fields.insert(ID_FIELD.to_string(), id.into().to_value());
        Self(fields)
    }

    /// Wraps an existing JSON object. Returns `None` for non-object values.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Adds or replaces a field, returning the document for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The document id, or `None` if `_id` is absent or not a valid id.
    pub fn id(&self) -> Option<DocumentId> {
        self.0.get(ID_FIELD).and_then(DocumentId::from_value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Why a document sequence cannot be indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The document at `position` has no usable `_id`.
    MissingId { position: usize },
    /// The document at `position` repeats an id seen earlier.
    DuplicateId { position: usize, id: DocumentId },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::MissingId { position } => {
                write!(f, "document at position {position} has no valid `{ID_FIELD}`")
            }
            IndexError::DuplicateId { position, id } => {
                write!(f, "duplicate `{ID_FIELD}` {id} at position {position}")
            }
        }
    }
}

/// Builds the id → position index for a document sequence.
pub fn index_documents(documents: &[Document]) -> Result<DocumentIndex, IndexError> {
    let mut index = DocumentIndex::with_capacity(documents.len());
    for (position, doc) in documents.iter().enumerate() {
        let id = doc.id().ok_or(IndexError::MissingId { position })?;
        if index.contains_key(&id) {
            return Err(IndexError::DuplicateId { position, id });
        }
        index.insert(id, position);
    }
    Ok(index)
}
