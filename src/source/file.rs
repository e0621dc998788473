//! File replay chunk source.
//!
//! Replays a recorded serial capture line by line at a fixed pace, so the
//! chart scrolls as it would against a live device. Useful for demos and
//! for inspecting a capture offline.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ChunkSource;

/// A chunk source that replays a capture file at a fixed pace.
///
/// Each line of the file is delivered as one chunk (newline included), with
/// `pace` of delay between lines. The original device emitted readings
/// roughly twice a second, so 500ms reproduces a 30 second window.
#[derive(Debug)]
pub struct FileSource {
    receiver: mpsc::Receiver<String>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
    task: Option<JoinHandle<()>>,
}

impl FileSource {
    /// Spawn a background task replaying `path`.
    pub fn spawn<P: AsRef<Path>>(path: P, pace: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("replay: {}", path.display());
        let (tx, rx) = mpsc::channel(16);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        let task = tokio::spawn(async move {
            let file = match File::open(&path).await {
                Ok(file) => file,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "replay open failed");
                    *error_handle.lock().unwrap() = Some(format!("open error: {}", e));
                    return;
                }
            };

            let mut reader = BufReader::new(file);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        debug!(path = %path.display(), "replay finished");
                        *error_handle.lock().unwrap() = Some("replay finished".to_string());
                        break;
                    }
                    Ok(_) => {
                        if tx.send(line.clone()).await.is_err() {
                            break;
                        }
                        tokio::time::sleep(pace).await;
                    }
                    Err(e) => {
                        *error_handle.lock().unwrap() = Some(format!("read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description,
            last_error,
            task: Some(task),
        }
    }
}

impl ChunkSource for FileSource {
    fn poll(&mut self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(chunk) => Some(chunk),
            Err(mpsc::error::TryRecvError::Empty) | Err(mpsc::error::TryRecvError::Disconnected) => {
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

impl Drop for FileSource {
    fn drop(&mut self) {
        ChunkSource::stop(self);
    }
}
