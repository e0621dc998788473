//! Stream-based chunk source.
//!
//! Reads raw bytes from an async reader (serial device node, TCP stream,
//! stdin) on a background task, decodes them incrementally as UTF-8, and
//! hands the decoded chunks to the consumer over a channel.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ChunkSource;

/// Size of the read buffer handed to the transport.
const READ_BUF_SIZE: usize = 1024;

/// A chunk source backed by any `AsyncRead`.
///
/// A background task owns the reader and blocks on it until data, EOF, or
/// cancellation; [`ChunkSource::stop`] aborts the task, which cancels the
/// pending read and releases the transport's read half.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use serwatch::source::StreamSource;
///
/// # tokio_test::block_on(async {
/// let stream = Cursor::new(b"temp:21.5\n".to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
    task: Option<JoinHandle<()>>,
}

impl StreamSource {
    /// Spawn a background task that reads byte chunks from `reader`.
    ///
    /// A chunk boundary may fall inside a multi-byte UTF-8 scalar; the
    /// undecoded tail is carried into the next read. Invalid bytes are
    /// replaced rather than dropped, so a noisy line still reaches the
    /// cleaning pass.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let desc = description.to_string();

        let task = tokio::spawn(async move {
            let mut reader = reader;
            let mut raw = [0u8; READ_BUF_SIZE];
            let mut pending: Vec<u8> = Vec::new();

            loop {
                match reader.read(&mut raw).await {
                    Ok(0) => {
                        debug!(source = %desc, "stream ended");
                        *error_handle.lock().unwrap() = Some("stream ended".to_string());
                        break;
                    }
                    Ok(n) => {
                        pending.extend_from_slice(&raw[..n]);
                        let chunk = take_decoded(&mut pending);
                        if chunk.is_empty() {
                            continue;
                        }
                        if tx.send(chunk).await.is_err() {
                            // Consumer dropped
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(source = %desc, error = %e, "read failed");
                        *error_handle.lock().unwrap() = Some(format!("read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: description.to_string(),
            last_error,
            task: Some(task),
        }
    }
}

impl ChunkSource for StreamSource {
    fn poll(&mut self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(chunk) => Some(chunk),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                let mut last_error = self.last_error.lock().unwrap();
                if last_error.is_none() {
                    *last_error = Some("stream disconnected".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for StreamSource {
    fn drop(&mut self) {
        ChunkSource::stop(self);
    }
}

/// Take the decodable prefix of `pending` as a string, keeping back a
/// trailing byte run that could still become a complete UTF-8 scalar.
fn take_decoded(pending: &mut Vec<u8>) -> String {
    let keep = incomplete_suffix_len(pending);
    let tail = pending.split_off(pending.len() - keep);
    let chunk = String::from_utf8_lossy(pending).into_owned();
    *pending = tail;
    chunk
}

/// Length of the trailing bytes forming an incomplete (but so far valid)
/// UTF-8 scalar, or 0 if the buffer ends on a complete boundary.
fn incomplete_suffix_len(bytes: &[u8]) -> usize {
    let n = bytes.len();
    for back in 1..=n.min(3) {
        let b = bytes[n - back];
        if b & 0b1100_0000 == 0b1000_0000 {
            // Continuation byte; keep looking for the lead
            continue;
        }
        let expected = match b {
            b if b & 0b1110_0000 == 0b1100_0000 => 2,
            b if b & 0b1111_0000 == 0b1110_0000 => 3,
            b if b & 0b1111_1000 == 0b1111_0000 => 4,
            // ASCII or an invalid lead: nothing worth holding back
            _ => return 0,
        };
        return if expected > back { back } else { 0 };
    }
    0
}
