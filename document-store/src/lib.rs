//! Document store crate: a typed CRUD repository over a partitioned document store.
//!
//! ## Modules
//!
//! - [`entity`] – Entity contract and PartitionKey
//! - [`client`] – Store capability traits (DocumentClient, Container, FeedCursor) and QueryDefinition
//! - [`config`] – DatabaseId, ContainerId, Endpoint, StoreConfiguration, StoreSettings
//! - [`error`] – StoreError, RepositoryError and the not-found mapping policy
//! - [`feed`] – Paged cursor adapter: PagedStream, drain_all, first, any
//! - [`repository`] – CrudRepository trait
//! - [`document_repository`] – DocumentRepository, the generic implementation
//!
//! The store client itself (networking, retries, serialization to bytes) is supplied by the
//! caller; `document-store-inmemory` provides one for tests and local development.

pub mod client;
pub mod config;
pub mod document_repository;
pub mod entity;
pub mod error;
pub mod feed;
pub mod repository;


pub use client::{Container, DocumentClient, FeedCursor, QueryDefinition, QueryParameter};
pub use config::{ContainerId, DatabaseId, Endpoint, StoreConfiguration, StoreSettings};
pub use document_repository::{filter_by_id, DocumentRepository};
pub use entity::{Entity, PartitionKey};
pub use error::{RepositoryError, Result, StoreError};
pub use feed::PagedStream;
pub use repository::CrudRepository;
pub use tokio_util::sync::CancellationToken;
