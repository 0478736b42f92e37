//! Shared test utilities for document-store integration tests.
//!
//! Provides the `Order` entity and a fixture wiring a `DocumentRepository<Order>` to an
//! `InMemoryDocumentClient` with one created container.

use std::sync::Arc;

use document_store::{
    ContainerId, DatabaseId, DocumentClient, DocumentRepository, Entity, PartitionKey,
    StoreConfiguration,
};
use document_store_inmemory::InMemoryDocumentClient;
use serde::{Deserialize, Serialize};

/// Order entity partitioned by customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: String,
    pub total_cents: i64,
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl Order {
    pub fn new(id: &str, customer: &str, total_cents: i64) -> Self {
        Self {
            id: id.to_string(),
            customer: customer.to_string(),
            total_cents,
            etag: None,
        }
    }
}

impl Entity for Order {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn partition_key(&self) -> PartitionKey {
        PartitionKey::from(self.customer.as_str())
    }

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }
}

#[allow(dead_code)]
pub struct Fixture {
    pub client: InMemoryDocumentClient,
    pub configuration: StoreConfiguration,
    pub repository: DocumentRepository<Order>,
}

#[allow(dead_code)]
impl Fixture {
    pub async fn stored_count(&self) -> usize {
        self.client
            .document_count(
                self.configuration.database_id(),
                self.configuration.container_id(),
            )
            .await
            .unwrap_or(0)
    }
}

pub fn configuration(client: &InMemoryDocumentClient, container: &str) -> StoreConfiguration {
    let shared: Arc<dyn DocumentClient> = Arc::new(client.clone());
    StoreConfiguration::new(
        shared,
        DatabaseId::new("shop").unwrap(),
        ContainerId::new(container).unwrap(),
    )
}

/// Repository over a freshly created `shop/orders` container, paging `page_size` documents at a time.
pub async fn fixture(page_size: usize) -> Fixture {
    let client = InMemoryDocumentClient::with_page_size(page_size);
    let configuration = configuration(&client, "orders");
    client
        .create_container(configuration.database_id(), configuration.container_id())
        .await;
    let repository = DocumentRepository::new(&configuration);
    Fixture {
        client,
        configuration,
        repository,
    }
}
