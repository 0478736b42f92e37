//! Message-bus crate: a typed handler that sends or schedules messages on one queue or topic.
//!
//! ## Modules
//!
//! - [`message`] – BusMessage contract and the OutgoingMessage wire form
//! - [`client`] – Bus capability traits (BusClient, MessageSender)
//! - [`config`] – FullyQualifiedNamespace, QueueOrTopicName, BusConfiguration, BusSettings
//! - [`error`] – BusError
//! - [`handler`] – MessageHandler trait and QueueMessageHandler
//! - [`inmemory`] – InMemoryBusClient for tests and local development

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod inmemory;
pub mod message;

pub use client::{BusClient, MessageSender};
pub use config::{BusConfiguration, BusSettings, FullyQualifiedNamespace, QueueOrTopicName};
pub use error::{BusError, Result};
pub use handler::{MessageHandler, QueueMessageHandler};
pub use inmemory::{InMemoryBusClient, RecordedMessage};
pub use message::{BusMessage, OutgoingMessage, CONTENT_TYPE_APPLICATION_JSON};
pub use tokio_util::sync::CancellationToken;
