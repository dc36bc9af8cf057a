//! Line reader errors.

use std::io;
use thiserror::Error;

/// Conditions reported alongside a line by [`LineReader::read_line`].
///
/// [`LineReader::read_line`]: crate::LineReader::read_line
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source is exhausted.
    #[error("end of stream")]
    Eof,

    /// The line does not fit into the buffer at its maximum size.
    #[error("buffer full")]
    BufferFull,

    /// The source kept yielding empty chunks.
    #[error("multiple reads returned no data")]
    NoProgress,

    /// The source failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ReadError {
    /// Check if this is the end of the stream.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Check if the buffer ran out of room.
    #[must_use]
    pub fn is_buffer_full(&self) -> bool {
        matches!(self, Self::BufferFull)
    }
}
