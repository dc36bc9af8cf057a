//! # eventsource-buffer
//!
//! Bounded line reading for Server-Sent Events streams.
//!
//! The event stream format terminates lines with `\r\n`, `\r` or `\n`, so
//! generic line splitters do not apply. [`LineReader`] reads from any
//! stream of byte chunks, recognizes all three terminators (including a
//! `\r\n` split across two chunks) and never lets its buffer grow past a
//! configured maximum.
//!
//! ## Example
//!
//! ```ignore
//! use eventsource_buffer::LineReader;
//!
//! let mut reader = LineReader::new(body_stream, 64 * 1024);
//! loop {
//!     let (line, err) = reader.read_line().await;
//!     println!("{}", String::from_utf8_lossy(line));
//!     if err.is_some() {
//!         break;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod reader;

// Re-exports
pub use error::ReadError;
pub use reader::{LineReader, DEFAULT_BUF_SIZE, MAX_CONSECUTIVE_EMPTY_READS};
