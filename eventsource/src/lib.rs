//! # eventsource
//!
//! A Server-Sent Events client with automatic reconnection.
//!
//! ## Core Concepts
//!
//! - **[`EventSource`]**: Background task that connects, parses and reconnects
//! - **[`EventSourceConfig`]**: URL or request, HTTP client, limits, delays
//! - **[`Message`]**: A received message, borrowed for the callback's duration
//! - **[`HttpClient`]**: Seam for plugging in a custom HTTP client
//!
//! ## Reconnection
//!
//! Every failure (transport error, unexpected status or content type, body
//! read error) is reported to the callback and followed by a reconnect after
//! the current delay. A stream closed by the server is reconnected silently.
//! The server may change the delay with a `retry` field. Reconnects carry a
//! `Last-Event-Id` header with the most recently received id.
//!
//! ## Example
//!
//! ```ignore
//! use eventsource::prelude::*;
//! use std::time::Duration;
//!
//! let config = EventSourceConfig::new("http://localhost:8080/events")
//!     .reconnect_delay(Duration::from_millis(500));
//!
//! let source = EventSource::new(config, |result| match result {
//!     Ok(message) => println!("{:?}: {:?}", message.event_str(), message.data_str()),
//!     Err(e) => eprintln!("error: {e}"),
//! })?;
//!
//! // ...
//! source.close().await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
mod controller;
pub mod error;
pub mod field;
pub mod message;
pub mod session;
pub mod source;

// Re-exports
pub use client::{HttpClient, EVENT_STREAM, LAST_EVENT_ID};
pub use config::{
    BufferLimits, EventSourceConfig, ResolvedLimits, DEFAULT_MAX_DATA, DEFAULT_MAX_EVENT,
    DEFAULT_MAX_ID, DEFAULT_RECONNECT_DELAY,
};
pub use error::{EventSourceError, Result};
pub use eventsource_buffer::{LineReader, ReadError};
pub use field::FieldName;
pub use message::{Message, OwnedMessage};
pub use session::Session;
pub use source::EventSource;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        BufferLimits, EventSource, EventSourceConfig, EventSourceError, Message, OwnedMessage,
        Result,
    };
}
