//! Metric recording for persist and load.
//!
//! No recorder is installed here; these are no-ops unless the host installs
//! one.

use metrics::{counter, histogram};
use std::path::Path;

fn collection_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Records a completed persist.
pub fn record_persist(path: &Path, documents: usize, bytes: usize) {
    let labels = [("collection", collection_label(path))];
    counter!("docfs_persist_total", &labels).increment(1);
    histogram!("docfs_persist_bytes", &labels).record(bytes as f64);
    histogram!("docfs_persist_documents", &labels).record(documents as f64);
}

/// Records a completed load.
pub fn record_load(path: &Path, documents: usize) {
    let labels = [("collection", collection_label(path))];
    counter!("docfs_load_total", &labels).increment(1);
    histogram!("docfs_load_documents", &labels).record(documents as f64);
}

/// Records a failed operation by error kind.
pub fn record_error(operation: &'static str, kind: &'static str) {
    counter!(
        "docfs_errors_total",
        "operation" => operation,
        "kind" => kind
    )
    .increment(1);
}
