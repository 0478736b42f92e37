//! Shared test utilities for message-bus integration tests.

use std::sync::Arc;

use message_bus::{BusClient, BusConfiguration, BusMessage, InMemoryBusClient, QueueOrTopicName};

/// Event published when an order is placed.
pub struct OrderPlaced {
    pub id: String,
    pub body: Vec<u8>,
}

impl OrderPlaced {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            body: format!(r#"{{"orderId":"{}"}}"#, id).into_bytes(),
        }
    }
}

impl BusMessage for OrderPlaced {
    type Id = String;

    fn id(&self) -> &String {
        &self.id
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}

pub const QUEUE: &str = "order-events";

pub fn configuration(client: &InMemoryBusClient) -> BusConfiguration {
    let shared: Arc<dyn BusClient> = Arc::new(client.clone());
    BusConfiguration::new(shared, QueueOrTopicName::new(QUEUE).unwrap())
}
