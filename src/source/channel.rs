//! Channel-based chunk source.
//!
//! Receives decoded text chunks via a tokio mpsc channel. Useful for
//! embedding the pipeline behind another transport, and for tests that
//! push chunks by hand.

use tokio::sync::mpsc;

use super::ChunkSource;

/// A chunk source fed by an in-process channel.
///
/// # Example
///
/// ```
/// use serwatch::source::{ChannelSource, ChunkSource};
///
/// let (tx, mut source) = ChannelSource::create("bridge");
/// tx.try_send("temp:21.5\n".to_string()).unwrap();
/// assert_eq!(source.poll().as_deref(), Some("temp:21.5\n"));
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Wrap the receiving end of a chunk channel.
    pub fn new(receiver: mpsc::Receiver<String>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair: a sender for the producer and the source for
    /// the pipeline.
    pub fn create(source_description: &str) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self::new(rx, source_description))
    }
}

impl ChunkSource for ChannelSource {
    fn poll(&mut self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(chunk) => Some(chunk),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.closed.then(|| "channel closed".to_string())
    }

    fn stop(&mut self) {
        // Refuses further sends; already-buffered chunks stay pollable
        self.receiver.close();
    }
}
