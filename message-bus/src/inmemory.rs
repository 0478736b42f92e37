//! In-memory bus for tests and local development.
//!
//! Every message sent or scheduled through an [`InMemoryBusClient`] sender is recorded under its
//! queue or topic name with a sequence number, increasing across the whole client.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::{BusClient, MessageSender};
use crate::config::QueueOrTopicName;
use crate::error::{BusError, Result};
use crate::message::OutgoingMessage;

/// A message as the bus accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    pub message: OutgoingMessage,
    pub sequence_number: i64,
    /// `None` for messages sent for immediate delivery.
    pub scheduled_enqueue_time: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Shared {
    entities: Mutex<HashMap<String, Vec<RecordedMessage>>>,
    faults: Mutex<VecDeque<BusError>>,
    last_sequence_number: AtomicI64,
    open_senders: AtomicUsize,
}

/// In-memory bus client. Cloning is cheap; clones share the same recorded messages.
#[derive(Clone, Default)]
pub struct InMemoryBusClient {
    shared: Arc<Shared>,
}

impl InMemoryBusClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded for `queue_or_topic_name`, in acceptance order.
    pub async fn messages(&self, queue_or_topic_name: &str) -> Vec<RecordedMessage> {
        let entities = self.shared.entities.lock().await;
        entities.get(queue_or_topic_name).cloned().unwrap_or_default()
    }

    /// Makes the next send or schedule fail with `error`.
    pub async fn fail_next(&self, error: BusError) {
        self.shared.faults.lock().await.push_back(error);
    }

    /// Number of senders created and not yet closed.
    pub fn open_senders(&self) -> usize {
        self.shared.open_senders.load(Ordering::SeqCst)
    }
}

impl BusClient for InMemoryBusClient {
    fn create_sender(&self, queue_or_topic_name: &QueueOrTopicName) -> Box<dyn MessageSender> {
        self.shared.open_senders.fetch_add(1, Ordering::SeqCst);
        Box::new(InMemorySender {
            shared: Arc::clone(&self.shared),
            entity_path: queue_or_topic_name.value().to_string(),
            closed: AtomicBool::new(false),
        })
    }
}

struct InMemorySender {
    shared: Arc<Shared>,
    entity_path: String,
    closed: AtomicBool,
}

impl InMemorySender {
    async fn record(&self, message: OutgoingMessage, scheduled_enqueue_time: Option<DateTime<Utc>>) -> Result<i64> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed(self.entity_path.clone()));
        }
        if let Some(fault) = self.shared.faults.lock().await.pop_front() {
            return Err(fault);
        }

        let mut entities = self.shared.entities.lock().await;
        let sequence_number = self.shared.last_sequence_number.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            entity_path = %self.entity_path,
            message_id = %message.message_id,
            sequence_number,
            "In-memory bus accepted message"
        );
        entities
            .entry(self.entity_path.clone())
            .or_default()
            .push(RecordedMessage {
                message,
                sequence_number,
                scheduled_enqueue_time,
            });
        Ok(sequence_number)
    }
}

#[async_trait]
impl MessageSender for InMemorySender {
    fn entity_path(&self) -> &str {
        &self.entity_path
    }

    async fn send_message(&self, message: OutgoingMessage) -> Result<()> {
        self.record(message, None).await.map(|_| ())
    }

    async fn schedule_message(&self, message: OutgoingMessage, enqueue_at: DateTime<Utc>) -> Result<i64> {
        self.record(message, Some(enqueue_at)).await
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.shared.open_senders.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
