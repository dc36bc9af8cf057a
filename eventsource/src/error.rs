//! Event source errors.

use crate::field::FieldName;
use eventsource_buffer::ReadError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by an [`EventSource`](crate::EventSource).
///
/// Everything except the construction errors is delivered through the
/// callback and followed by a reconnect.
#[derive(Debug, Error)]
pub enum EventSourceError {
    /// Sending the request failed.
    #[error("http request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response status is not `200 OK`.
    #[error("http response status is not 200: {0}")]
    InvalidStatus(StatusCode),

    /// The response is not an event stream.
    #[error(
        "http response content type is not text/event-stream: {}",
        .0.as_deref().unwrap_or("<missing>")
    )]
    InvalidContentType(Option<String>),

    /// A field of the current message exceeded its buffer limit.
    #[error("{field} field is too long (limit {limit} bytes)")]
    FieldTooLong {
        /// The offending field.
        field: FieldName,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Reading the response body failed.
    #[error("http response body read error: {0}")]
    Read(#[from] ReadError),

    /// The configured URL does not parse.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Neither a URL nor a request was configured.
    #[error("no url or request configured")]
    MissingTarget,

    /// The request prototype has a streaming body and cannot be replayed.
    #[error("request cannot be cloned for reconnects")]
    UnclonableRequest,

    /// No tokio runtime to run the event source on.
    #[error("event source must be created inside a tokio runtime")]
    NoRuntime,
}

impl EventSourceError {
    /// Check if this is a per-message buffer overflow.
    #[must_use]
    pub fn is_field_too_long(&self) -> bool {
        matches!(self, Self::FieldTooLong { .. })
    }

    /// Check if the event source keeps running after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidUrl(_) | Self::MissingTarget | Self::UnclonableRequest | Self::NoRuntime
        )
    }

    /// Get the HTTP status if the server answered with an unexpected one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::InvalidStatus(status) => Some(*status),
            _ => None,
        }
    }
}

/// Result type for event source operations.
pub type Result<T> = std::result::Result<T, EventSourceError>;
