//! # In-Memory Document Store
//!
//! This crate provides an in-memory implementation of the `DocumentClient` capability from the
//! `document-store` crate.
//!
//! ## InMemoryDocumentClient
//!
//! Simple in-memory store for testing and development. It behaves like a partitioned store as
//! far as the repository layer can observe:
//!
//! - containers must be created first; every operation on a missing container fails with `NotFound`
//! - upserts stamp a fresh `_etag` and honour `if_match`
//! - deleting an absent document fails with `NotFound`
//! - queries are paged (`with_page_size`) and live cursors are counted (`open_cursors`)
//! - `fail_next` injects a fault into the next store operation
//!
//! **Limitations**:
//! - Data is lost on restart
//! - Only `SELECT * FROM c [WHERE c.<field> = @<param> [AND ...]]` queries
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use document_store::{ContainerId, DatabaseId, StoreConfiguration};
//! use document_store_inmemory::InMemoryDocumentClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InMemoryDocumentClient::new();
//!     let database_id = DatabaseId::new("shop")?;
//!     let container_id = ContainerId::new("orders")?;
//!     client.create_container(&database_id, &container_id).await;
//!
//!     let configuration = StoreConfiguration::new(Arc::new(client), database_id, container_id);
//!     assert_eq!(configuration.container_id().value(), "orders");
//!     Ok(())
//! }
//! ```
//!
//! ## Thread Safety
//!
//! The store uses `Arc<RwLock<>>` to ensure thread-safe concurrent access.

mod cursor;
mod query;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use document_store::{
    Container, ContainerId, DatabaseId, DocumentClient, FeedCursor, PartitionKey,
    QueryDefinition, StoreError,
};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub use cursor::InMemoryCursor;

/// Page size used by [`InMemoryDocumentClient::new`].
pub const DEFAULT_PAGE_SIZE: usize = 100;

const ETAG_FIELD: &str = "_etag";

pub(crate) type ContainerKey = (String, String);

struct StoredDocument {
    partition_key: PartitionKey,
    id: String,
    body: Value,
}

impl StoredDocument {
    fn etag(&self) -> Option<&str> {
        self.body.get(ETAG_FIELD).and_then(Value::as_str)
    }
}

#[derive(Default)]
pub(crate) struct ContainerData {
    documents: Vec<StoredDocument>,
}

impl ContainerData {
    fn position(&self, id: &str, partition_key: &PartitionKey) -> Option<usize> {
        self.documents
            .iter()
            .position(|d| d.id == id && d.partition_key == *partition_key)
    }
}

pub(crate) struct Shared {
    containers: RwLock<HashMap<ContainerKey, ContainerData>>,
    faults: Mutex<VecDeque<StoreError>>,
    open_cursors: AtomicUsize,
    page_size: usize,
}

impl Shared {
    fn missing_container(key: &ContainerKey) -> StoreError {
        StoreError::NotFound(format!("container '{}/{}' does not exist", key.0, key.1))
    }

    /// Pops the next injected fault, if any.
    async fn take_fault(&self) -> Result<(), StoreError> {
        match self.faults.lock().await.pop_front() {
            Some(fault) => {
                debug!(fault = %fault, "Returning injected store fault");
                Err(fault)
            }
            None => Ok(()),
        }
    }
}

/// In-memory document store client for testing and development.
///
/// Cloning is cheap; clones share the same data.
#[derive(Clone)]
pub struct InMemoryDocumentClient {
    shared: Arc<Shared>,
}

impl InMemoryDocumentClient {
    /// Creates an empty store that pages query results [`DEFAULT_PAGE_SIZE`] at a time.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Creates an empty store with the given page size (at least 1).
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                containers: RwLock::new(HashMap::new()),
                faults: Mutex::new(VecDeque::new()),
                open_cursors: AtomicUsize::new(0),
                page_size: page_size.max(1),
            }),
        }
    }

    /// Creates the container if it does not exist. Returns `true` if it was created.
    pub async fn create_container(&self, database_id: &DatabaseId, container_id: &ContainerId) -> bool {
        let key = (database_id.value().to_string(), container_id.value().to_string());
        let mut containers = self.shared.containers.write().await;
        if containers.contains_key(&key) {
            return false;
        }
        info!(database_id = %key.0, container_id = %key.1, "Creating in-memory container");
        containers.insert(key, ContainerData::default());
        true
    }

    /// Number of documents in a container, or `None` if it does not exist.
    pub async fn document_count(&self, database_id: &DatabaseId, container_id: &ContainerId) -> Option<usize> {
        let key = (database_id.value().to_string(), container_id.value().to_string());
        let containers = self.shared.containers.read().await;
        containers.get(&key).map(|data| data.documents.len())
    }

    /// Makes the next store operation (upsert, delete or page read) fail with `error`.
    /// Several faults queue up in order.
    pub async fn fail_next(&self, error: StoreError) {
        self.shared.faults.lock().await.push_back(error);
    }

    /// Number of cursors opened and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.shared.open_cursors.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryDocumentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentClient for InMemoryDocumentClient {
    fn container(&self, database_id: &DatabaseId, container_id: &ContainerId) -> Arc<dyn Container> {
        Arc::new(InMemoryContainer {
            shared: Arc::clone(&self.shared),
            key: (database_id.value().to_string(), container_id.value().to_string()),
        })
    }
}

/// Container handle resolved from an [`InMemoryDocumentClient`].
pub struct InMemoryContainer {
    shared: Arc<Shared>,
    key: ContainerKey,
}

#[async_trait]
impl Container for InMemoryContainer {
    fn database_id(&self) -> &str {
        &self.key.0
    }

    fn container_id(&self) -> &str {
        &self.key.1
    }

    async fn upsert_item(
        &self,
        document: Value,
        partition_key: &PartitionKey,
        if_match: Option<&str>,
    ) -> Result<Value, StoreError> {
        self.shared.take_fault().await?;

        let mut document = document;
        let id = document
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::BadRequest("document has no string 'id' field".to_string()))?;

        let mut containers = self.shared.containers.write().await;
        let data = containers
            .get_mut(&self.key)
            .ok_or_else(|| Shared::missing_container(&self.key))?;
        let existing = data.position(&id, partition_key);

        if let Some(expected) = if_match {
            let current = existing
                .and_then(|index| data.documents.get(index))
                .and_then(StoredDocument::etag);
            if current != Some(expected) {
                return Err(StoreError::PreconditionFailed(format!(
                    "etag '{}' does not match document '{}'",
                    expected, id
                )));
            }
        }

        let etag = Uuid::new_v4().to_string();
        match document.as_object_mut() {
            Some(fields) => {
                fields.insert(ETAG_FIELD.to_string(), Value::String(etag));
            }
            None => return Err(StoreError::BadRequest("document is not a JSON object".to_string())),
        }

        let stored = StoredDocument {
            partition_key: partition_key.clone(),
            id: id.clone(),
            body: document.clone(),
        };
        match existing.and_then(|index| data.documents.get_mut(index)) {
            Some(slot) => *slot = stored,
            None => data.documents.push(stored),
        }
        debug!(id = %id, partition_key = %partition_key, replaced = existing.is_some(), "In-memory upsert");
        Ok(document)
    }

    async fn delete_item(&self, id: &str, partition_key: &PartitionKey) -> Result<(), StoreError> {
        self.shared.take_fault().await?;

        let mut containers = self.shared.containers.write().await;
        let data = containers
            .get_mut(&self.key)
            .ok_or_else(|| Shared::missing_container(&self.key))?;

        match data.position(id, partition_key) {
            Some(index) => {
                data.documents.remove(index);
                debug!(id = %id, partition_key = %partition_key, "In-memory delete");
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "document '{}' in partition '{}'",
                id, partition_key
            ))),
        }
    }

    fn query_items(&self, query: QueryDefinition) -> Box<dyn FeedCursor> {
        Box::new(InMemoryCursor::new(
            Arc::clone(&self.shared),
            self.key.clone(),
            Some(query),
        ))
    }

    fn read_all_items(&self) -> Box<dyn FeedCursor> {
        Box::new(InMemoryCursor::new(Arc::clone(&self.shared), self.key.clone(), None))
    }
}
