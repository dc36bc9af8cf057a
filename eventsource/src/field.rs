//! Event stream line classification.

use std::fmt;

/// Fields understood by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// `id`: the message identifier, replayed as `Last-Event-Id`.
    Id,
    /// `event`: the message type.
    Event,
    /// `data`: the payload; repeated fields are joined with `\n`.
    Data,
    /// `retry`: reconnect delay in milliseconds.
    Retry,
}

impl FieldName {
    /// Look up a field by its wire name.
    pub fn from_bytes(name: &[u8]) -> Option<Self> {
        match name {
            b"id" => Some(Self::Id),
            b"event" => Some(Self::Event),
            b"data" => Some(Self::Data),
            b"retry" => Some(Self::Retry),
            _ => None,
        }
    }

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Event => "event",
            Self::Data => "data",
            Self::Retry => "retry",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified stream line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty line, ends the current message.
    Blank,
    /// Line starting with `:`.
    Comment(&'a [u8]),
    /// A known field. A field without a colon has an empty value.
    Field {
        /// Which field.
        name: FieldName,
        /// Field value, one leading space removed.
        value: &'a [u8],
    },
    /// Any other field, ignored.
    Unknown {
        /// The unrecognized field name.
        name: &'a [u8],
    },
}

/// Split a line into key and value on the first colon.
///
/// At most one space after the colon is dropped. Without a colon the whole
/// line is the key and there is no value.
pub fn split_line(line: &[u8]) -> (&[u8], Option<&[u8]>) {
    match line.iter().position(|&b| b == b':') {
        None => (line, None),
        Some(i) => {
            let value = &line[i + 1..];
            (&line[..i], Some(value.strip_prefix(b" ").unwrap_or(value)))
        }
    }
}

/// Classify a line.
pub fn parse_line(line: &[u8]) -> Line<'_> {
    if line.is_empty() {
        return Line::Blank;
    }
    let (key, value) = split_line(line);
    if key.is_empty() {
        return Line::Comment(value.unwrap_or_default());
    }
    match FieldName::from_bytes(key) {
        Some(name) => Line::Field {
            name,
            value: value.unwrap_or_default(),
        },
        None => Line::Unknown { name: key },
    }
}
