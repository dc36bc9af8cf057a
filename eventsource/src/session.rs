//! Message assembly and per-session state.
//!
//! A [`Session`] lives as long as the event source. It accumulates field
//! values line by line, hands out a [`Message`] at every blank line and
//! carries the resumption state (last message id, reconnect delay) from one
//! connection to the next.

use crate::config::ResolvedLimits;
use crate::error::EventSourceError;
use crate::field::{parse_line, FieldName, Line};
use crate::message::Message;
use std::time::Duration;
use tracing::trace;

/// Growable byte buffer with a hard size limit.
#[derive(Debug)]
pub(crate) struct FieldBuffer {
    buf: Vec<u8>,
    limit: usize,
    present: bool,
}

impl FieldBuffer {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            present: false,
        }
    }

    pub(crate) fn get(&self) -> Option<&[u8]> {
        self.present.then_some(self.buf.as_slice())
    }

    /// Overwrite the value.
    pub(crate) fn replace(&mut self, value: &[u8]) -> bool {
        if value.len() > self.limit {
            return false;
        }
        self.buf.clear();
        self.reserve(value.len());
        self.buf.extend_from_slice(value);
        self.present = true;
        true
    }

    /// Append the value, separated by `\n` from existing content.
    pub(crate) fn append(&mut self, value: &[u8]) -> bool {
        let separator = usize::from(!self.buf.is_empty());
        let needed = self.buf.len() + separator + value.len();
        if needed > self.limit {
            return false;
        }
        self.reserve(needed);
        if separator == 1 {
            self.buf.push(b'\n');
        }
        self.buf.extend_from_slice(value);
        self.present = true;
        true
    }

    /// Forget the value, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        self.buf.clear();
        self.present = false;
    }

    /// Forget the value and the allocation.
    pub(crate) fn release(&mut self) {
        self.buf = Vec::new();
        self.present = false;
    }

    fn reserve(&mut self, needed: usize) {
        let capacity = self.buf.capacity();
        if capacity < needed {
            let target = self.limit.min(needed.max(capacity * 2));
            self.buf.reserve_exact(target - self.buf.len());
        }
    }
}

/// Assembly state for the messages of one event source.
#[derive(Debug)]
pub struct Session {
    id: FieldBuffer,
    event: FieldBuffer,
    data: FieldBuffer,
    /// Set when a field overflowed; the rest of the message is skipped.
    error: Option<(FieldName, usize)>,
    last_event_id: Vec<u8>,
    retry: Duration,
}

impl Session {
    /// Create a session with the given limits and initial reconnect delay.
    pub fn new(limits: ResolvedLimits, retry: Duration) -> Self {
        Self {
            id: FieldBuffer::new(limits.max_id),
            event: FieldBuffer::new(limits.max_event),
            data: FieldBuffer::new(limits.max_data),
            error: None,
            last_event_id: Vec::new(),
            retry,
        }
    }

    /// The most recently read non-empty `id`, sent as `Last-Event-Id`.
    pub fn last_event_id(&self) -> Option<&[u8]> {
        (!self.last_event_id.is_empty()).then_some(self.last_event_id.as_slice())
    }

    /// Delay before the next reconnect.
    pub fn retry(&self) -> Duration {
        self.retry
    }

    /// Reset message state for a freshly opened stream.
    ///
    /// The resumption id and the reconnect delay are kept.
    pub fn begin_connection(&mut self) {
        self.id.release();
        self.event.release();
        self.data.release();
        self.error = None;
    }

    /// Feed one line.
    ///
    /// At a blank line, `deliver` is called with the completed message or
    /// with the error that spoiled it. The message borrows the session and
    /// is only valid during that call.
    pub fn process_line<F>(&mut self, line: &[u8], deliver: F)
    where
        F: FnOnce(Result<Message<'_>, EventSourceError>),
    {
        let (name, value) = match parse_line(line) {
            Line::Blank => {
                self.end_message(deliver);
                return;
            }
            _ if self.error.is_some() => return,
            Line::Comment(_) => return,
            Line::Unknown { name } => {
                trace!(field = %String::from_utf8_lossy(name), "Ignoring unknown field");
                return;
            }
            Line::Field { name, value } => (name, value),
        };

        let fits = match name {
            FieldName::Id => {
                let fits = self.id.replace(value);
                if fits && !value.is_empty() {
                    self.last_event_id.clear();
                    self.last_event_id.extend_from_slice(value);
                }
                fits
            }
            FieldName::Event => self.event.replace(value),
            FieldName::Data => self.data.append(value),
            FieldName::Retry => {
                if let Some(ms) = std::str::from_utf8(value)
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                {
                    trace!(retry_ms = ms, "Server set reconnect delay");
                    self.retry = Duration::from_millis(ms);
                }
                true
            }
        };
        if !fits {
            let limit = match name {
                FieldName::Id => self.id.limit,
                FieldName::Event => self.event.limit,
                _ => self.data.limit,
            };
            trace!(field = %name, limit, "Field too long, skipping rest of message");
            self.error = Some((name, limit));
        }
    }

    fn end_message<F>(&mut self, deliver: F)
    where
        F: FnOnce(Result<Message<'_>, EventSourceError>),
    {
        match self.error.take() {
            Some((field, limit)) => deliver(Err(EventSourceError::FieldTooLong { field, limit })),
            None => deliver(Ok(Message {
                id: self.id.get(),
                event: self.event.get(),
                data: self.data.get(),
            })),
        }
        self.id.clear();
        self.event.clear();
        self.data.clear();
    }
}
