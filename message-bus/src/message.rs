//! Messages handed to the bus.

use std::fmt::Display;

/// Content type stamped on every outgoing message.
pub const CONTENT_TYPE_APPLICATION_JSON: &str = "application/json";

/// A message that can be sent to a queue or topic.
///
/// The body is already serialized; handlers never inspect it.
pub trait BusMessage: Send + Sync {
    type Id: Display;

    fn id(&self) -> &Self::Id;

    fn body(&self) -> &[u8];
}

/// Wire-level message as passed to a [`crate::MessageSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub message_id: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl OutgoingMessage {
    /// Copies the body and stringified id of `message`, with JSON content type.
    pub fn from_message<M: BusMessage>(message: &M) -> Self {
        Self {
            message_id: message.id().to_string(),
            content_type: CONTENT_TYPE_APPLICATION_JSON.to_string(),
            body: message.body().to_vec(),
        }
    }
}
