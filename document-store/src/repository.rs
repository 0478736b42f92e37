use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use crate::entity::Entity;
use crate::error::Result;

/// CRUD contract over one entity type in one container.
///
/// Every operation takes a cancellation token. Point operations fail with
/// [`RepositoryError::Cancelled`](crate::RepositoryError::Cancelled) when it fires; streams stop
/// cleanly, keeping whatever they already yielded. Multi-entity operations are not atomic.
#[async_trait]
pub trait CrudRepository<T: Entity>: Send + Sync {
    /// Upserts `entity`; conditional on its concurrency token when it has one.
    /// Returns the stored representation, which carries the new token.
    async fn save(&self, entity: &T, cancel: &CancellationToken) -> Result<T>;

    /// Saves each entity in order, yielding one result per input. A failed save is yielded in
    /// place; saves before it stay committed.
    fn save_all(&self, entities: Vec<T>, cancel: &CancellationToken) -> BoxStream<'_, Result<T>>;

    /// Fails with `NotFound` when no document has this id.
    async fn find_by_id(&self, id: &T::Id, cancel: &CancellationToken) -> Result<T>;

    /// Never fails for absence: a missing document or container yields `false`.
    async fn exists_by_id(&self, id: &T::Id, cancel: &CancellationToken) -> Result<bool>;

    fn find_all(&self, cancel: &CancellationToken) -> BoxStream<'_, Result<T>>;

    /// Matches for each id, ids processed in order. Ids without a match are skipped.
    fn find_all_by_id(&self, ids: Vec<T::Id>, cancel: &CancellationToken) -> BoxStream<'_, Result<T>>;

    /// Client-side count: reads the whole container.
    async fn count(&self, cancel: &CancellationToken) -> Result<u64>;

    /// `find_by_id` followed by `delete`; surfaces `NotFound`.
    async fn delete_by_id(&self, id: &T::Id, cancel: &CancellationToken) -> Result<()>;

    /// Deleting a document that is already gone is a no-op.
    async fn delete(&self, entity: &T, cancel: &CancellationToken) -> Result<()>;

    async fn delete_all_by_id(&self, ids: Vec<T::Id>, cancel: &CancellationToken) -> Result<()>;

    async fn delete_all(&self, entities: Vec<T>, cancel: &CancellationToken) -> Result<()>;

    /// Deletes every document in the container, one at a time, while scanning it.
    async fn delete_everything(&self, cancel: &CancellationToken) -> Result<()>;
}
