//! Messages delivered to the callback.

use bytes::Bytes;

/// A received message.
///
/// The fields borrow the event source's internal buffers, which are reused
/// for the next message as soon as the callback returns. Copy whatever must
/// outlive the callback, e.g. with [`Message::to_owned_message`].
///
/// A field is `None` when the message did not carry it, which is distinct
/// from a field with an empty value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Message<'a> {
    /// The `id` field.
    pub id: Option<&'a [u8]>,
    /// The `event` field.
    pub event: Option<&'a [u8]>,
    /// The `data` field, multiple lines joined with `\n`.
    pub data: Option<&'a [u8]>,
}

impl<'a> Message<'a> {
    /// The `id` field as UTF-8, if present and valid.
    pub fn id_str(&self) -> Option<&'a str> {
        self.id.and_then(|b| std::str::from_utf8(b).ok())
    }

    /// The `event` field as UTF-8, if present and valid.
    pub fn event_str(&self) -> Option<&'a str> {
        self.event.and_then(|b| std::str::from_utf8(b).ok())
    }

    /// The `data` field as UTF-8, if present and valid.
    pub fn data_str(&self) -> Option<&'a str> {
        self.data.and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Copy the message out of the internal buffers.
    pub fn to_owned_message(&self) -> OwnedMessage {
        OwnedMessage {
            id: self.id.map(Bytes::copy_from_slice),
            event: self.event.map(Bytes::copy_from_slice),
            data: self.data.map(Bytes::copy_from_slice),
        }
    }
}

/// A message that owns its fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OwnedMessage {
    /// The `id` field.
    pub id: Option<Bytes>,
    /// The `event` field.
    pub event: Option<Bytes>,
    /// The `data` field.
    pub data: Option<Bytes>,
}

impl OwnedMessage {
    /// Borrow as a [`Message`].
    pub fn as_message(&self) -> Message<'_> {
        Message {
            id: self.id.as_deref(),
            event: self.event.as_deref(),
            data: self.data.as_deref(),
        }
    }
}

impl From<Message<'_>> for OwnedMessage {
    fn from(message: Message<'_>) -> Self {
        message.to_owned_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_accessors() {
        let msg = Message {
            id: Some(&b"7"[..]),
            event: None,
            data: Some(&b"\xff"[..]),
        };
        assert_eq!(msg.id_str(), Some("7"));
        assert_eq!(msg.event_str(), None);
        assert_eq!(msg.data_str(), None);
    }

    #[test]
    fn test_owned_copy() {
        let buf = b"hello".to_vec();
        let owned = Message {
            id: None,
            event: Some(&b""[..]),
            data: Some(buf.as_slice()),
        }
        .to_owned_message();
        drop(buf);

        assert_eq!(owned.id, None);
        assert_eq!(owned.event.as_deref(), Some(&b""[..]));
        assert_eq!(owned.as_message().data_str(), Some("hello"));
    }
}
