//! Buffered line reading over chunked byte streams.
//!
//! An event stream line ends with `\r\n`, `\r` or `\n`, which rules out the
//! usual line splitters: a `\r` alone is a complete terminator, yet the `\n`
//! that may follow it can arrive in a later chunk. [`LineReader`] keeps one
//! contiguous buffer, grows it up to a hard cap and hands out lines that
//! borrow that buffer.

use crate::error::ReadError;
use bytes::{Buf, Bytes};
use futures::stream::{Fuse, Stream, StreamExt};
use std::io;
use tracing::trace;

/// Initial buffer size, unless the cap is smaller.
pub const DEFAULT_BUF_SIZE: usize = 4096;

/// Empty chunks tolerated in a row before giving up on the source.
pub const MAX_CONSECUTIVE_EMPTY_READS: usize = 100;

/// Reads event stream lines from a chunked byte source.
///
/// The source is any stream of `io::Result<Bytes>`, typically an HTTP
/// response body. An empty chunk counts as a read that made no progress;
/// the end of the stream is end-of-file.
///
/// Memory is bounded by `max_size`: a line that does not fit is returned
/// truncated to the buffer contents together with [`ReadError::BufferFull`].
#[derive(Debug)]
pub struct LineReader<S> {
    source: Fuse<S>,
    /// Received bytes that did not fit into `buf` yet.
    chunk: Bytes,
    buf: Vec<u8>,
    r: usize,
    w: usize,
    err: Option<ReadError>,
    max_size: usize,
    /// The previous line ended with a bare `\r`.
    cr_line: bool,
}

impl<S> LineReader<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    /// Create a reader whose buffer never exceeds `max_size` bytes.
    pub fn new(source: S, max_size: usize) -> Self {
        Self {
            source: source.fuse(),
            chunk: Bytes::new(),
            buf: vec![0; max_size.min(DEFAULT_BUF_SIZE)],
            r: 0,
            w: 0,
            err: None,
            max_size,
            cr_line: false,
        }
    }

    /// Current size of the backing buffer.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Maximum size of the backing buffer.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of buffered bytes not yet returned as part of a line.
    pub fn buffered(&self) -> usize {
        self.w - self.r
    }

    /// Read the next line, without its terminator.
    ///
    /// A terminated line comes back with `None`. Once the source fails or
    /// ends, whatever is left in the buffer is returned with the error,
    /// after which end-of-file keeps being reported with an empty line.
    ///
    /// The line borrows the internal buffer and is invalidated by the next
    /// call.
    pub async fn read_line(&mut self) -> (&[u8], Option<ReadError>) {
        // Bytes already searched, relative to `r`.
        let mut scanned = 0;
        loop {
            if self.cr_line && self.r < self.w {
                // Only reachable with nothing scanned yet: either we entered
                // with buffered data, or the last fill brought the first byte.
                self.cr_line = false;
                if self.buf[self.r] == b'\n' {
                    self.r += 1;
                }
            }

            if let Some(i) = find_line_end(&self.buf[self.r + scanned..self.w]) {
                let start = self.r;
                let end = start + scanned + i;
                self.cr_line = self.buf[end] == b'\r';
                self.r = end + 1;
                return (&self.buf[start..end], None);
            }

            if let Some(err) = self.err.take() {
                let start = self.r;
                self.r = self.w;
                return (&self.buf[start..self.w], Some(err));
            }

            scanned = self.w - self.r;
            self.fill().await;
        }
    }

    /// Double the buffer, up to `max_size`.
    fn grow(&mut self) -> bool {
        if self.buf.len() >= self.max_size {
            return false;
        }
        let new_size = self.max_size.min((self.buf.len() * 2).max(1));
        trace!(from = self.buf.len(), to = new_size, "Growing line buffer");
        self.buf.resize(new_size, 0);
        true
    }

    /// Compact, grow if needed, then read at least one byte or record an error.
    async fn fill(&mut self) {
        if self.r > 0 {
            self.buf.copy_within(self.r..self.w, 0);
            self.w -= self.r;
            self.r = 0;
        }

        if self.w >= self.buf.len() && !self.grow() {
            self.err = Some(ReadError::BufferFull);
            return;
        }

        for _ in 0..MAX_CONSECUTIVE_EMPTY_READS {
            if self.chunk.is_empty() {
                match self.source.next().await {
                    Some(Ok(chunk)) => self.chunk = chunk,
                    Some(Err(e)) => {
                        self.err = Some(ReadError::Io(e));
                        return;
                    }
                    None => {
                        self.err = Some(ReadError::Eof);
                        return;
                    }
                }
            }

            let n = self.chunk.len().min(self.buf.len() - self.w);
            self.buf[self.w..self.w + n].copy_from_slice(&self.chunk[..n]);
            self.chunk.advance(n);
            self.w += n;
            if n > 0 {
                return;
            }
        }
        self.err = Some(ReadError::NoProgress);
    }
}

fn find_line_end(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\r' || b == b'\n')
}
