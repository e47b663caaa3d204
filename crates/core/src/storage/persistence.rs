//! Disk persistence for collections as line-delimited JSON.
//!
//! Persist rewrites the whole file: the encoded content goes to a uniquely
//! named temp file in the same directory, which is then renamed over the
//! collection file. A concurrent reader sees either the old or the new file,
//! never a mix. Load reads the whole file and rebuilds the index.

use crate::document::{Document, DocumentIndex};
use crate::error::{Result, StoreError};
use crate::metrics;
use crate::storage::codec::{decode_documents, encode_documents};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Encode `documents` and replace the file at `path` with them.
///
/// Returns the number of bytes written. On failure the previous file content
/// is left untouched.
pub fn persist_collection(path: &Path, documents: &[Document]) -> Result<usize> {
    let content = encode_documents(documents)?;
    write_atomic(path, content.as_bytes())?;
    tracing::info!(
        "Persisted {} documents to {} ({} bytes)",
        documents.len(),
        path.display(),
        content.len()
    );
    metrics::record_persist(path, documents.len(), content.len());
    Ok(content.len())
}

/// Replace the file at `path` with `bytes` via temp file + rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path_for(path);
    let written = write_temp(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(&tmp_path) {
            if cleanup.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Could not remove temp file {:?}: {}", tmp_path, cleanup);
            }
        }
        return Err(StoreError::io(path, e));
    }
    Ok(())
}

fn write_temp(tmp_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut opts = fs::OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut file: File = opts.open(tmp_path)?;
    file.write_all(bytes)?;
    file.flush()
}

/// `<dir>/.<file name>.<uuid>.tmp`, unique per write.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_name = format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4().simple());
    path.with_file_name(tmp_name)
}

/// Read the collection file at `path` into documents and index.
pub fn load_collection(path: &Path) -> Result<(Vec<Document>, DocumentIndex)> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::CollectionNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(StoreError::corrupt(path, 0, "file is not valid UTF-8"))
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let (documents, index) = decode_documents(path, &content)?;
    tracing::info!(
        "Loaded {} documents from {}",
        documents.len(),
        path.display()
    );
    metrics::record_load(path, documents.len());
    Ok((documents, index))
}
