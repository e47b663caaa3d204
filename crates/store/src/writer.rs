//! Deferred persist writer.
//!
//! Callers hand an encoded collection snapshot to a background task over a
//! tokio channel and await a oneshot with the result. The task drains
//! whatever is queued into a batch; when one batch holds several snapshots of
//! the same file only the newest is written, and every caller of that file
//! receives that write's result. Requests are taken in FIFO order, so a later
//! snapshot is never overwritten by an earlier one.

use docfs_core::config;
use docfs_core::storage::CollectionStore;
use docfs_core::{Result, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// A request to replace one collection file.
struct PersistRequest {
    path: PathBuf,
    content: String,
    result_tx: oneshot::Sender<Result<()>>,
}

/// Handle to the background writer task.
#[derive(Debug, Clone)]
pub struct PersistWriter {
    submit_tx: mpsc::Sender<PersistRequest>,
}

impl std::fmt::Debug for PersistRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistRequest")
            .field("path", &self.path)
            .field("bytes", &self.content.len())
            .finish()
    }
}

impl PersistWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub fn spawn(store: Arc<CollectionStore>) -> Self {
        let (submit_tx, submit_rx) = mpsc::channel::<PersistRequest>(config::PERSIST_QUEUE_CAPACITY);
        tokio::spawn(async move {
            writer_loop(submit_rx, store).await;
        });
        Self { submit_tx }
    }

    /// Queue `content` as the new content of `path` and wait for the write.
    pub async fn persist(&self, path: PathBuf, content: String) -> Result<()> {
        let (result_tx, result_rx) = oneshot::channel();
        self.submit_tx
            .send(PersistRequest {
                path,
                content,
                result_tx,
            })
            .await
            .map_err(|_| StoreError::Interrupted {
                operation: "persist",
            })?;

        result_rx.await.map_err(|_| StoreError::Interrupted {
            operation: "persist",
        })?
    }
}

/// Background task that batches persist requests and writes them.
async fn writer_loop(mut rx: mpsc::Receiver<PersistRequest>, store: Arc<CollectionStore>) {
    let max_batch = config::PERSIST_MAX_BATCH;

    while let Some(first) = rx.recv().await {
        let mut batch = Vec::with_capacity(max_batch);
        batch.push(first);
        while batch.len() < max_batch {
            match rx.try_recv() {
                Ok(req) => batch.push(req),
                Err(_) => break,
            }
        }

        let task_store = Arc::clone(&store);
        // Waiters see `Interrupted` through their dropped senders if this panics.
        if let Err(e) = tokio::task::spawn_blocking(move || flush_batch(batch, &task_store)).await {
            tracing::error!("Persist batch task failed: {}", e);
        }
    }
    tracing::debug!("Persist writer stopped");
}

/// Write the newest snapshot of each path in the batch and notify callers.
fn flush_batch(batch: Vec<PersistRequest>, store: &CollectionStore) {
    let mut groups: Vec<(PathBuf, String, Vec<oneshot::Sender<Result<()>>>)> = Vec::new();
    for req in batch {
        match groups.iter_mut().find(|(path, _, _)| *path == req.path) {
            Some(group) => {
                group.1 = req.content;
                group.2.push(req.result_tx);
            }
            None => groups.push((req.path, req.content, vec![req.result_tx])),
        }
    }

    for (path, content, waiters) in groups {
        if waiters.len() > 1 {
            tracing::debug!(
                "Coalesced {} queued writes to {}",
                waiters.len(),
                path.display()
            );
        }
        match store.write_encoded(&path, &content) {
            Ok(()) => {
                for tx in waiters {
                    let _ = tx.send(Ok(()));
                }
            }
            Err(e) => {
                for tx in waiters {
                    let _ = tx.send(Err(e.duplicate()));
                }
            }
        }
    }
}
