//! Store capability: the interface a document store client must offer.
//!
//! Implementations own networking, retries, routing and consistency. Documents cross this
//! boundary as `serde_json::Value`; the repository layer converts them to and from entities.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{ContainerId, DatabaseId};
use crate::entity::PartitionKey;
use crate::error::StoreError;

/// Shared, externally owned connection to a document store.
///
/// Must be safe for concurrent use; many repositories may hold the same client.
pub trait DocumentClient: Send + Sync {
    /// Binds to one container. Pure and idempotent for the same identifiers; does no I/O.
    fn container(&self, database_id: &DatabaseId, container_id: &ContainerId) -> Arc<dyn Container>;
}

/// Handle to one container (collection) within a database.
#[async_trait]
pub trait Container: Send + Sync {
    fn database_id(&self) -> &str;

    fn container_id(&self) -> &str;

    /// Inserts or replaces the document keyed by its `id` field and `partition_key`.
    ///
    /// With `if_match`, the write only succeeds while the stored `_etag` still equals it;
    /// otherwise it fails with [`StoreError::PreconditionFailed`]. Returns the stored document.
    async fn upsert_item(
        &self,
        document: Value,
        partition_key: &PartitionKey,
        if_match: Option<&str>,
    ) -> Result<Value, StoreError>;

    /// Deletes one document. An absent document is reported as [`StoreError::NotFound`].
    async fn delete_item(&self, id: &str, partition_key: &PartitionKey) -> Result<(), StoreError>;

    /// Opens a cursor over the results of a filter query.
    fn query_items(&self, query: QueryDefinition) -> Box<dyn FeedCursor>;

    /// Opens a cursor over every document in the container.
    fn read_all_items(&self) -> Box<dyn FeedCursor>;
}

/// Store-native paged result cursor.
///
/// Single consumer, forward only. Dropping the cursor releases the server-side query.
#[async_trait]
pub trait FeedCursor: Send {
    fn has_more_results(&self) -> bool;

    async fn read_next(&mut self) -> Result<Vec<Value>, StoreError>;
}

/// Named query parameter, e.g. `@id`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    pub name: String,
    pub value: Value,
}

/// Parameterized query text.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDefinition {
    query_text: String,
    parameters: Vec<QueryParameter>,
}

impl QueryDefinition {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
            parameters: Vec::new(),
        }
    }

    /// Adds (or replaces) a parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => self.parameters.push(QueryParameter { name, value }),
        }
        self
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}
