use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use docfs_core::config;
use docfs_core::storage::{Collection, CollectionDescriptor};
use docfs_core::{Document, DocumentId, StoreOptions};
use docfs_store::events::{CreateCollectionEvent, FindEvent, InsertEvent};
use docfs_store::{dispatch, FileSystemStore, StoreEvent};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docfs", about = "Inspect and edit docfs collection files")]
struct Args {
    /// Directory holding one subdirectory per database
    #[arg(long, env = "DOCFS_ROOT", default_value = config::DEFAULT_ROOT_PATH)]
    root: PathBuf,

    /// Extension of collection files
    #[arg(long, env = "DOCFS_EXTENSION", default_value = config::DEFAULT_FILE_EXTENSION)]
    extension: String,

    /// Block on every file operation (false hands writes to a background task)
    #[arg(long, env = "DOCFS_SYNC", default_value_t = config::DEFAULT_SYNC, action = ArgAction::Set)]
    sync: bool,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty collection file if it does not exist
    Create { database: String, collection: String },
    /// Append a JSON document to a collection
    Insert {
        database: String,
        collection: String,
        /// The document, e.g. '{"_id":"1","total":10}'
        document: String,
    },
    /// Print the documents of a collection, one per line
    Find {
        database: String,
        collection: String,
        /// Only print the document with this `_id` (JSON literal; bare text is a string)
        #[arg(long)]
        id: Option<String>,
    },
    /// Load a collection and report its document count
    Check { database: String, collection: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let options = StoreOptions::default()
        .with_root_path(args.root)
        .with_file_extension(args.extension)
        .with_sync(args.sync);
    let store = FileSystemStore::new(options).context("failed to open store")?;

    match args.command {
        Command::Create {
            database,
            collection,
        } => {
            let descriptor = CollectionDescriptor::new(&database, &collection);
            dispatch(
                &store,
                &StoreEvent::CreateCollection(CreateCollectionEvent {
                    collection: descriptor,
                }),
            )
            .await?;
            println!("{}", store.collection_path(&database, &collection)?.display());
        }
        Command::Insert {
            database,
            collection,
            document,
        } => {
            let value: Value = serde_json::from_str(&document).context("document is not JSON")?;
            let Some(document) = Document::from_value(value) else {
                bail!("document must be a JSON object");
            };
            let collection = load(&store, &database, &collection).await?;
            collection.insert_document(document.clone())?;
            dispatch(
                &store,
                &StoreEvent::Insert(InsertEvent {
                    collection: collection.clone(),
                    document,
                }),
            )
            .await?;
            println!("{} documents", collection.document_count());
        }
        Command::Find {
            database,
            collection,
            id,
        } => {
            let collection = load(&store, &database, &collection).await?;
            let documents: Vec<Document> = match id {
                Some(raw) => collection
                    .get_document(&parse_id(&raw))
                    .into_iter()
                    .collect(),
                None => collection.documents(),
            };
            for doc in documents {
                println!("{}", serde_json::to_string(&doc)?);
            }
        }
        Command::Check {
            database,
            collection,
        } => {
            let collection = load(&store, &database, &collection).await?;
            if let Err(e) = collection.data.read().validate() {
                bail!("index check failed: {e}");
            }
            println!("ok: {} documents", collection.document_count());
        }
    }

    Ok(())
}

/// Load a collection through the store's `find` path.
async fn load(
    store: &FileSystemStore,
    database: &str,
    collection: &str,
) -> anyhow::Result<Collection> {
    let handle = Collection::new(CollectionDescriptor::new(database, collection));
    dispatch(
        store,
        &StoreEvent::Find(FindEvent {
            collection: handle.clone(),
            selector: Value::Null,
            fields: Value::Null,
        }),
    )
    .await
    .with_context(|| format!("failed to load {database}.{collection}"))?;
    Ok(handle)
}

fn parse_id(raw: &str) -> DocumentId {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| DocumentId::from_value(&v))
        .unwrap_or_else(|| DocumentId::from(raw))
}
