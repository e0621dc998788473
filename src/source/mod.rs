//! Transport seam: sources of decoded text chunks.
//!
//! The pipeline only ever sees decoded text arriving in arbitrarily-sized
//! chunks. Where those chunks come from - a serial device node, a TCP
//! endpoint, stdin, an in-process channel, or a recorded capture - is behind
//! the [`ChunkSource`] trait.

mod channel;
mod file;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use stream::StreamSource;

use std::fmt::Debug;

/// A source of decoded text chunks with cooperative cancellation.
///
/// Implementations hand chunks to the single consumer without blocking it;
/// byte-level I/O happens on a background task owned by the source.
pub trait ChunkSource: Send + Debug {
    /// Poll for the next decoded chunk. Non-blocking; `None` means nothing
    /// is available right now.
    fn poll(&mut self) -> Option<String>;

    /// Human-readable description of the source, for the status line.
    fn description(&self) -> &str;

    /// The error that ended or is disrupting the stream, if any.
    ///
    /// Buffered chunks remain pollable after an error; callers drain first,
    /// then decide whether to stop.
    fn error(&self) -> Option<String>;

    /// Cancel the pending read and release the transport.
    ///
    /// Idempotent: stopping twice, or a source that never started, is a
    /// no-op.
    fn stop(&mut self);
}
