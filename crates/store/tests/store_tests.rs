use docfs_core::storage::{Collection, CollectionDescriptor};
use docfs_core::{Document, DocumentId, StoreError, StoreOptions, SyncPolicy};
use docfs_store::events::{
    CreateCollectionEvent, FindEvent, InsertEvent, OperationEvent, RemoveEvent, UpdateEvent,
};
use docfs_store::{dispatch, FileSystemStore, StoreEvent, StoreListener};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn options(tmp: &TempDir, sync: bool) -> StoreOptions {
    StoreOptions::default()
        .with_root_path(tmp.path().join("db"))
        .with_sync(sync)
}

fn orders() -> Collection {
    Collection::new(CollectionDescriptor::new("shop", "orders"))
}

fn find_event(collection: &Collection) -> FindEvent {
    FindEvent {
        collection: collection.clone(),
        selector: json!({}),
        fields: Value::Null,
    }
}

async fn create(store: &FileSystemStore, collection: &Collection) {
    store
        .on_create_collection(&CreateCollectionEvent {
            collection: collection.descriptor().unwrap(),
        })
        .await
        .expect("create collection");
}

async fn insert(store: &FileSystemStore, collection: &Collection, doc: Document) {
    collection.insert_document(doc.clone()).unwrap();
    store
        .on_insert(&InsertEvent {
            collection: collection.clone(),
            document: doc,
        })
        .await
        .expect("insert");
}

// ========== Blocking mode ==========

#[tokio::test]
async fn test_orders_scenario() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    assert_eq!(store.policy(), SyncPolicy::Blocking);

    let col = orders();
    create(&store, &col).await;
    insert(&store, &col, Document::new("1").with("total", 10)).await;
    insert(&store, &col, Document::new("2").with("total", 20)).await;

    let path = tmp.path().join("db").join("shop").join("orders.json");
    assert_eq!(store.collection_path("shop", "orders").unwrap(), path);
    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![r#"{"_id":"1","total":10}"#, r#"{"_id":"2","total":20}"#]
    );

    let fresh = orders();
    store.on_find(&find_event(&fresh)).await.unwrap();
    assert_eq!(
        fresh.documents(),
        vec![
            Document::new("1").with("total", 10),
            Document::new("2").with("total", 20)
        ]
    );
    let index = fresh.index();
    assert_eq!(index.len(), 2);
    assert_eq!(index[&DocumentId::from("1")], 0);
    assert_eq!(index[&DocumentId::from("2")], 1);
}

#[tokio::test]
async fn test_create_collection_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();

    create(&store, &col).await;
    insert(&store, &col, Document::new("keep")).await;
    create(&store, &col).await;

    let fresh = orders();
    store.on_find(&find_event(&fresh)).await.unwrap();
    assert_eq!(fresh.document_count(), 1);
}

#[tokio::test]
async fn test_create_collection_requires_database() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let err = store
        .on_create_collection(&CreateCollectionEvent {
            collection: CollectionDescriptor {
                name: "orders".into(),
                full_name: ".orders".into(),
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_insert_without_create_makes_database_directory() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    insert(&store, &col, Document::new("1")).await;
    assert!(tmp.path().join("db").join("shop").join("orders.json").is_file());
}

#[tokio::test]
async fn test_find_discards_unpersisted_documents() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    create(&store, &col).await;
    insert(&store, &col, Document::new("a")).await;

    col.insert_document(Document::new("memory-only")).unwrap();
    store.on_find(&find_event(&col)).await.unwrap();
    assert_eq!(col.document_count(), 1);
    assert!(col.get_document(&DocumentId::from("memory-only")).is_none());
    assert!(col.data.read().validate().is_ok());
}

#[tokio::test]
async fn test_find_one_loads_whole_collection() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    for id in ["a", "b", "c"] {
        insert(&store, &col, Document::new(id)).await;
    }

    let fresh = orders();
    store
        .on_find_one(&FindEvent {
            collection: fresh.clone(),
            selector: json!({"_id": "b"}),
            fields: Value::Null,
        })
        .await
        .unwrap();
    assert_eq!(fresh.document_count(), 3);
}

#[tokio::test]
async fn test_update_and_remove_rewrite_file() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    for id in ["a", "b", "c"] {
        insert(&store, &col, Document::new(id).with("n", 0)).await;
    }

    let updated = Document::new("b").with("n", 1);
    col.update_document(updated.clone()).unwrap();
    store
        .on_update(&UpdateEvent {
            collection: col.clone(),
            selector: json!({"_id": "b"}),
            modifier: json!({"$set": {"n": 1}}),
            documents: vec![updated],
        })
        .await
        .unwrap();

    let removed = col.remove_document(&DocumentId::from("a")).unwrap();
    store
        .on_remove(&RemoveEvent {
            collection: col.clone(),
            selector: json!({"_id": "a"}),
            documents: vec![removed],
        })
        .await
        .unwrap();

    let fresh = orders();
    store.on_find(&find_event(&fresh)).await.unwrap();
    assert_eq!(
        fresh.documents(),
        vec![Document::new("b").with("n", 1), Document::new("c").with("n", 0)]
    );
    assert_eq!(fresh.index()[&DocumentId::from("c")], 1);
}

#[tokio::test]
async fn test_find_missing_collection() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    col.insert_document(Document::new("x")).unwrap();

    let err = store.on_find(&find_event(&col)).await.unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound { .. }));
    // Failed loads leave the in-memory state alone.
    assert_eq!(col.document_count(), 1);
}

#[tokio::test]
async fn test_find_corrupt_line_fails_whole_load() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    create(&store, &col).await;
    let path = store.collection_path("shop", "orders").unwrap();
    fs::write(&path, "{\"_id\":\"1\"}\n{not json}\n{\"_id\":\"3\"}\n").unwrap();

    let err = store.on_find(&find_event(&col)).await.unwrap_err();
    match err {
        StoreError::CorruptCollectionFile { line, .. } => assert_eq!(line, 2),
        other => panic!("expected CorruptCollectionFile, got {:?}", other),
    }
    assert_eq!(col.document_count(), 0);
}

#[tokio::test]
async fn test_insert_rejects_duplicate_ids_on_disk_unchanged() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    insert(&store, &col, Document::new("1")).await;
    let path = store.collection_path("shop", "orders").unwrap();
    let before = fs::read_to_string(&path).unwrap();

    // An engine handing over a sequence with a repeated id.
    col.data.write().documents.push(Document::new("1"));
    let err = store
        .on_insert(&InsertEvent {
            collection: col.clone(),
            document: Document::new("1"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_unsupported_operations() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let event = OperationEvent::default();

    let cases = [
        (StoreEvent::Save(event.clone()), "save"),
        (StoreEvent::All(event.clone()), "all"),
        (StoreEvent::EnsureIndex(event.clone()), "ensureIndex"),
        (StoreEvent::Backup(event.clone()), "backup"),
        (StoreEvent::Backups(event.clone()), "backups"),
        (StoreEvent::RemoveBackup(event.clone()), "removeBackup"),
        (StoreEvent::Restore(event.clone()), "restore"),
    ];
    for (event, name) in cases {
        assert_eq!(event.name(), name);
        match dispatch(&store, &event).await {
            Err(StoreError::Unsupported { operation }) => assert_eq!(operation, name),
            other => panic!("{name}: expected Unsupported, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_dispatch_routes_by_event() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, true)).unwrap();
    let col = orders();
    col.insert_document(Document::new(1i64)).unwrap();

    dispatch(
        &store,
        &StoreEvent::CreateCollection(CreateCollectionEvent {
            collection: col.descriptor().unwrap(),
        }),
    )
    .await
    .unwrap();
    dispatch(
        &store,
        &StoreEvent::Insert(InsertEvent {
            collection: col.clone(),
            document: Document::new(1i64),
        }),
    )
    .await
    .unwrap();

    let fresh = orders();
    let event = StoreEvent::FindOne(find_event(&fresh));
    assert_eq!(event.name(), "findOne");
    dispatch(&store, &event).await.unwrap();
    assert_eq!(fresh.index()[&DocumentId::from(1i64)], 0);
}

// ========== Deferred mode ==========

#[test]
fn test_deferred_requires_runtime() {
    let tmp = TempDir::new().unwrap();
    let err = FileSystemStore::new(options(&tmp, false)).unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument { .. }));
}

#[tokio::test]
async fn test_deferred_orders_scenario() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, false)).unwrap();
    assert_eq!(store.policy(), SyncPolicy::Deferred);

    let col = orders();
    create(&store, &col).await;
    insert(&store, &col, Document::new("1").with("total", 10)).await;
    insert(&store, &col, Document::new("2").with("total", 20)).await;

    let path = store.collection_path("shop", "orders").unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\"_id\":\"1\",\"total\":10}\n{\"_id\":\"2\",\"total\":20}\n"
    );

    let fresh = orders();
    store.on_find(&find_event(&fresh)).await.unwrap();
    assert_eq!(fresh.documents(), col.documents());
    assert_eq!(fresh.index(), col.index());
}

#[tokio::test]
async fn test_deferred_errors_are_reported() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, false)).unwrap();
    let col = orders();

    let err = store.on_find(&find_event(&col)).await.unwrap_err();
    assert!(matches!(err, StoreError::CollectionNotFound { .. }));

    // A directory in place of the collection file fails the rename.
    let path = store.collection_path("shop", "orders").unwrap();
    fs::create_dir_all(path.join("inner")).unwrap();
    col.insert_document(Document::new("1")).unwrap();
    let err = store
        .on_insert(&InsertEvent {
            collection: col.clone(),
            document: Document::new("1"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deferred_concurrent_persists_leave_one_full_snapshot() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FileSystemStore::new(options(&tmp, false)).unwrap());

    let snapshot = |tag: &'static str| {
        let col = orders();
        for i in 0..300 {
            col.insert_document(Document::new(format!("{tag}-{i}")).with("tag", tag))
                .unwrap();
        }
        col
    };
    let a = snapshot("a");
    let b = snapshot("b");

    let tasks: Vec<_> = [a.clone(), b.clone()]
        .into_iter()
        .map(|col| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .on_insert(&InsertEvent {
                        collection: col,
                        document: Document::new("unused"),
                    })
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let fresh = orders();
    store.on_find(&find_event(&fresh)).await.unwrap();
    let docs = fresh.documents();
    assert!(docs == a.documents() || docs == b.documents());
    assert!(fresh.data.read().validate().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deferred_sequential_persists_keep_last() {
    let tmp = TempDir::new().unwrap();
    let store = FileSystemStore::new(options(&tmp, false)).unwrap();
    let col = orders();
    for i in 0..50i64 {
        insert(&store, &col, Document::new(i)).await;
    }

    let fresh = orders();
    store.on_find(&find_event(&fresh)).await.unwrap();
    assert_eq!(fresh.document_count(), 50);
    assert_eq!(fresh.index()[&DocumentId::from(49i64)], 49);
}

#[tokio::test]
async fn test_modes_produce_identical_files() {
    let tmp_sync = TempDir::new().unwrap();
    let tmp_deferred = TempDir::new().unwrap();
    let blocking = FileSystemStore::new(options(&tmp_sync, true)).unwrap();
    let deferred = FileSystemStore::new(options(&tmp_deferred, false)).unwrap();

    for store in [&blocking, &deferred] {
        let col = orders();
        create(store, &col).await;
        insert(store, &col, Document::new("x").with("nested", json!({"k": [1, 2]}))).await;
        insert(store, &col, Document::new(7i64).with("flag", true)).await;
    }

    let read = |store: &FileSystemStore| {
        fs::read_to_string(store.collection_path("shop", "orders").unwrap()).unwrap()
    };
    assert_eq!(read(&blocking), read(&deferred));
}
