//! Line-delimited JSON codec for collection files.
//!
//! One compact JSON object per line, each line terminated by `\n`. No array
//! wrapper. Lines that are blank after trimming are ignored when decoding.

use crate::document::{index_documents, Document, DocumentId, DocumentIndex};
use crate::error::{Result, StoreError};
use serde_json::Value;
use std::path::Path;

/// Encode a document sequence as collection file content.
///
/// Rejects documents without a valid `_id` and repeated ids.
pub fn encode_documents(documents: &[Document]) -> Result<String> {
    index_documents(documents).map_err(|e| StoreError::invalid_argument(e.to_string()))?;

    let mut out = String::new();
    for doc in documents {
        let line = serde_json::to_string(doc)
            .map_err(|e| StoreError::invalid_argument(format!("unserializable document: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Decode collection file content into documents and their index.
///
/// Positions in the index are positions in the returned sequence, not line
/// numbers. Any bad line fails the whole decode; `path` is only used for the
/// error.
pub fn decode_documents(path: &Path, content: &str) -> Result<(Vec<Document>, DocumentIndex)> {
    let mut documents = Vec::new();
    let mut index = DocumentIndex::new();

    for (i, line) in content.split('\n').enumerate() {
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let (doc, id) = decode_line(line).map_err(|reason| StoreError::corrupt(path, line_no, reason))?;
        if index.contains_key(&id) {
            return Err(StoreError::corrupt(path, line_no, format!("duplicate `_id` {id}")));
        }
        index.insert(id, documents.len());
        documents.push(doc);
    }

    Ok((documents, index))
}

/// Parse one line once, yielding the document and its id.
fn decode_line(line: &str) -> std::result::Result<(Document, DocumentId), String> {
    let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let doc = Document::from_value(value).ok_or_else(|| "line is not a JSON object".to_string())?;
    let id = doc
        .id()
        .ok_or_else(|| "document has no valid `_id`".to_string())?;
    Ok((doc, id))
}
