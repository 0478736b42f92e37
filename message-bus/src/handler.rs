//! Typed message handler over one queue or topic.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::MessageSender;
use crate::config::BusConfiguration;
use crate::error::{BusError, Result};
use crate::message::{BusMessage, OutgoingMessage};

#[async_trait]
pub trait MessageHandler<M: BusMessage>: Send + Sync {
    async fn send_message(&self, message: &M, cancel: &CancellationToken) -> Result<()>;

    /// Schedules `message` for `enqueue_at` and returns the bus-assigned sequence number.
    async fn schedule_message(
        &self,
        message: &M,
        enqueue_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<i64>;
}

/// Sends messages of type `M` to the queue or topic named in its [`BusConfiguration`].
///
/// Owns one sender created at construction. Call [`QueueMessageHandler::close`] when done;
/// dropping the handler without closing leaves the sender to the client's cleanup.
pub struct QueueMessageHandler<M> {
    sender: Box<dyn MessageSender>,
    _message: PhantomData<fn(&M)>,
}

impl<M: BusMessage> QueueMessageHandler<M> {
    pub fn new(configuration: &BusConfiguration) -> Self {
        let sender = configuration
            .client()
            .create_sender(configuration.queue_or_topic_name());
        info!(queue_or_topic_name = %configuration.queue_or_topic_name(), "Created message sender");
        Self {
            sender,
            _message: PhantomData,
        }
    }

    pub fn entity_path(&self) -> &str {
        self.sender.entity_path()
    }

    /// Closes the underlying sender.
    pub async fn close(self) -> Result<()> {
        self.sender.close().await?;
        debug!(entity_path = %self.sender.entity_path(), "Closed message sender");
        Ok(())
    }
}

async fn cancellable<F>(cancel: &CancellationToken, operation: F) -> Result<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(BusError::Cancelled),
        output = operation => Ok(output),
    }
}

#[async_trait]
impl<M: BusMessage + 'static> MessageHandler<M> for QueueMessageHandler<M> {
    async fn send_message(&self, message: &M, cancel: &CancellationToken) -> Result<()> {
        let outgoing = OutgoingMessage::from_message(message);
        let message_id = outgoing.message_id.clone();

        cancellable(cancel, self.sender.send_message(outgoing)).await??;

        info!(message_id = %message_id, "Message with id was sent");
        Ok(())
    }

    async fn schedule_message(
        &self,
        message: &M,
        enqueue_at: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<i64> {
        let outgoing = OutgoingMessage::from_message(message);
        let message_id = outgoing.message_id.clone();

        let sequence_number =
            cancellable(cancel, self.sender.schedule_message(outgoing, enqueue_at)).await??;

        info!(
            message_id = %message_id,
            scheduled_enqueue_time = %enqueue_at,
            sequence_number,
            "Message with id was scheduled"
        );
        Ok(sequence_number)
    }
}
