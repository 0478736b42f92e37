//! Message-bus error types.

use thiserror::Error;

/// Errors returned by bus senders and message handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("Operation was cancelled")]
    Cancelled,

    #[error("Sender for '{0}' is closed")]
    Closed(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
}

pub type Result<T> = std::result::Result<T, BusError>;
