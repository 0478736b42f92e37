//! Bus capability traits.
//!
//! A [`BusClient`] is shared across the process and hands out one [`MessageSender`] per queue
//! or topic. Implementations own connection handling and retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::QueueOrTopicName;
use crate::error::Result;
use crate::message::OutgoingMessage;

pub trait BusClient: Send + Sync {
    fn create_sender(&self, queue_or_topic_name: &QueueOrTopicName) -> Box<dyn MessageSender>;
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Name of the queue or topic this sender publishes to.
    fn entity_path(&self) -> &str;

    async fn send_message(&self, message: OutgoingMessage) -> Result<()>;

    /// Schedules `message` for enqueueing at `enqueue_at` and returns its sequence number.
    async fn schedule_message(&self, message: OutgoingMessage, enqueue_at: DateTime<Utc>) -> Result<i64>;

    /// Releases the sender. Later sends fail with [`crate::BusError::Closed`].
    async fn close(&self) -> Result<()>;
}
