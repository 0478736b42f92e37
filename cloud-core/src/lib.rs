//! # cloud-core
//!
//! Shared building blocks for the cloud infrastructure crates: validated configuration
//! value objects ([`config_value!`]), [`ConfigurationError`], and tracing initialization.
//! Used by `document-store` and `message-bus`.

pub mod config;
pub mod error;
pub mod logger;

pub use error::{ConfigurationError, Result};
pub use logger::init_tracing;
