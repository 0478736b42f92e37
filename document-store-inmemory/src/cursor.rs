//! Paged cursor over an in-memory container.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use document_store::{FeedCursor, QueryDefinition, StoreError};
use serde_json::Value;
use tracing::debug;

use crate::query::Filter;
use crate::{ContainerKey, Shared};

/// Cursor returned by [`crate::InMemoryDocumentClient`] containers.
///
/// The query runs on the first `read_next`; its results are then handed out `page_size` at a
/// time. Live cursors are counted by the client until dropped.
pub struct InMemoryCursor {
    shared: Arc<Shared>,
    key: ContainerKey,
    query: Option<QueryDefinition>,
    pending: Option<VecDeque<Value>>,
}

impl InMemoryCursor {
    pub(crate) fn new(shared: Arc<Shared>, key: ContainerKey, query: Option<QueryDefinition>) -> Self {
        shared.open_cursors.fetch_add(1, Ordering::SeqCst);
        Self {
            shared,
            key,
            query,
            pending: None,
        }
    }

    async fn evaluate(&self) -> Result<VecDeque<Value>, StoreError> {
        let filter = match &self.query {
            Some(query) => Filter::parse(query)?,
            None => Filter::match_all(),
        };

        let containers = self.shared.containers.read().await;
        let data = containers
            .get(&self.key)
            .ok_or_else(|| Shared::missing_container(&self.key))?;

        let results: VecDeque<Value> = data
            .documents
            .iter()
            .filter(|stored| filter.matches(&stored.body))
            .map(|stored| stored.body.clone())
            .collect();
        debug!(
            database_id = %self.key.0,
            container_id = %self.key.1,
            count = results.len(),
            "In-memory query evaluated"
        );
        Ok(results)
    }
}

#[async_trait]
impl FeedCursor for InMemoryCursor {
    fn has_more_results(&self) -> bool {
        self.pending.as_ref().map_or(true, |rest| !rest.is_empty())
    }

    async fn read_next(&mut self) -> Result<Vec<Value>, StoreError> {
        self.shared.take_fault().await?;

        if self.pending.is_none() {
            self.pending = Some(self.evaluate().await?);
        }
        let rest = self.pending.get_or_insert_with(VecDeque::new);
        let take = rest.len().min(self.shared.page_size);
        Ok(rest.drain(..take).collect())
    }
}

impl Drop for InMemoryCursor {
    fn drop(&mut self) {
        self.shared.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}
