//! Generic [`CrudRepository`] over a [`Container`].
//!
//! Point operations (save, delete) go straight to the container. Lookups and bulk operations
//! open cursors and consume them through [`crate::feed`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::{Container, FeedCursor, QueryDefinition};
use crate::config::StoreConfiguration;
use crate::entity::Entity;
use crate::error::{absorb_not_found, RepositoryError, Result};
use crate::feed::{self, PagedStream};
use crate::repository::CrudRepository;

const FILTER_BY_ID_QUERY: &str = "SELECT * FROM c WHERE c.id = @id";

/// Identity filter for `id`.
pub fn filter_by_id(id: &impl fmt::Display) -> QueryDefinition {
    QueryDefinition::new(FILTER_BY_ID_QUERY).with_parameter("@id", id.to_string())
}

/// Repository for entities of type `T` stored in one container.
///
/// Holds only the resolved container handle, never the client: dropping the repository
/// releases the handle and leaves the shared client untouched.
pub struct DocumentRepository<T> {
    container: Arc<dyn Container>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> DocumentRepository<T> {
    pub fn new(configuration: &StoreConfiguration) -> Self {
        let container = configuration
            .client()
            .container(configuration.database_id(), configuration.container_id());
        info!(
            database_id = %configuration.database_id(),
            container_id = %configuration.container_id(),
            "Resolved document container"
        );
        Self::from_container(container)
    }

    /// Wraps an already resolved container handle.
    pub fn from_container(container: Arc<dyn Container>) -> Self {
        Self {
            container,
            _entity: PhantomData,
        }
    }

    pub fn container(&self) -> &Arc<dyn Container> {
        &self.container
    }

    fn query_by_id(&self, id: &T::Id) -> Box<dyn FeedCursor> {
        self.container.query_items(filter_by_id(id))
    }
}

impl<T> fmt::Debug for DocumentRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentRepository")
            .field("database_id", &self.container.database_id())
            .field("container_id", &self.container.container_id())
            .finish()
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(RepositoryError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl<T: Entity> CrudRepository<T> for DocumentRepository<T> {
    async fn save(&self, entity: &T, cancel: &CancellationToken) -> Result<T> {
        let id = entity.id().to_string();
        let partition_key = entity.partition_key();
        let document = serde_json::to_value(entity)?;

        let stored = feed::cancellable(
            cancel,
            self.container
                .upsert_item(document, &partition_key, entity.etag()),
        )
        .await?
        .map_err(|err| RepositoryError::from_save(&id, err))?;

        debug!(id = %id, partition_key = %partition_key, conditional = entity.etag().is_some(), "Saved entity");
        Ok(serde_json::from_value(stored)?)
    }

    fn save_all(&self, entities: Vec<T>, cancel: &CancellationToken) -> BoxStream<'_, Result<T>> {
        let cancel = cancel.clone();
        let before_each = cancel.clone();
        stream::iter(entities)
            .take_while(move |_| future::ready(!before_each.is_cancelled()))
            .then(move |entity| {
                let cancel = cancel.clone();
                async move { self.save(&entity, &cancel).await }
            })
            .boxed()
    }

    async fn find_by_id(&self, id: &T::Id, cancel: &CancellationToken) -> Result<T> {
        let key = id.to_string();
        match feed::first(self.query_by_id(id), cancel).await {
            Ok(Some(entity)) => Ok(entity),
            Ok(None) => Err(RepositoryError::not_found(key)),
            Err(err) => Err(RepositoryError::from_lookup(&key, err)),
        }
    }

    async fn exists_by_id(&self, id: &T::Id, cancel: &CancellationToken) -> Result<bool> {
        match feed::any(self.query_by_id(id), cancel).await {
            Ok(found) => Ok(found),
            Err(RepositoryError::Store(err)) if err.is_not_found() => {
                info!(id = %id, "Entity with id does not exist");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn find_all(&self, cancel: &CancellationToken) -> BoxStream<'_, Result<T>> {
        PagedStream::new(self.container.read_all_items(), cancel.clone()).boxed()
    }

    fn find_all_by_id(&self, ids: Vec<T::Id>, cancel: &CancellationToken) -> BoxStream<'_, Result<T>> {
        let cancel = cancel.clone();
        let before_each = cancel.clone();
        let mut failed = false;
        stream::iter(ids)
            .take_while(move |_| future::ready(!before_each.is_cancelled()))
            .map(move |id| PagedStream::<T>::new(self.query_by_id(&id), cancel.clone()))
            .flatten()
            .take_while(move |item| {
                let keep = !failed;
                failed = item.is_err();
                future::ready(keep)
            })
            .boxed()
    }

    async fn count(&self, cancel: &CancellationToken) -> Result<u64> {
        let all: Vec<T> = feed::drain_all(self.container.read_all_items(), cancel).await?;
        Ok(all.len() as u64)
    }

    async fn delete_by_id(&self, id: &T::Id, cancel: &CancellationToken) -> Result<()> {
        let entity = self.find_by_id(id, cancel).await?;
        self.delete(&entity, cancel).await
    }

    async fn delete(&self, entity: &T, cancel: &CancellationToken) -> Result<()> {
        let id = entity.id().to_string();
        let partition_key = entity.partition_key();

        let result = feed::cancellable(cancel, self.container.delete_item(&id, &partition_key)).await?;
        if absorb_not_found(result)? {
            debug!(id = %id, partition_key = %partition_key, "Deleted entity");
        } else {
            info!(id = %id, "Entity with id does not exist or has already been removed");
        }
        Ok(())
    }

    async fn delete_all_by_id(&self, ids: Vec<T::Id>, cancel: &CancellationToken) -> Result<()> {
        let mut matches = self.find_all_by_id(ids, cancel);
        while let Some(entity) = matches.next().await {
            self.delete(&entity?, cancel).await?;
        }
        ensure_not_cancelled(cancel)
    }

    async fn delete_all(&self, entities: Vec<T>, cancel: &CancellationToken) -> Result<()> {
        for entity in &entities {
            ensure_not_cancelled(cancel)?;
            self.delete(entity, cancel).await?;
        }
        Ok(())
    }

    async fn delete_everything(&self, cancel: &CancellationToken) -> Result<()> {
        let mut all = self.find_all(cancel);
        let mut deleted = 0u64;
        while let Some(entity) = all.next().await {
            self.delete(&entity?, cancel).await?;
            deleted += 1;
        }
        ensure_not_cancelled(cancel)?;
        info!(
            database_id = %self.container.database_id(),
            container_id = %self.container.container_id(),
            deleted,
            "Deleted every entity in container"
        );
        Ok(())
    }
}
