//! Application state and session control.
//!
//! [`App`] owns the whole pipeline: the chunk source, the line reassembler,
//! the series store, and the scrollback of cleaned lines. There is exactly
//! one logical writer - the UI thread calling [`App::pump`] - so none of the
//! pipeline state needs locking.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::data::{extract, LineReassembler, SampleOutcome, SeriesStore};
use crate::source::{ChunkSource, FileSource, StreamSource};
use crate::ui::Theme;

/// Maximum number of scrollback entries retained.
const SCROLLBACK_CAPACITY: usize = 500;

/// How long a transient status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Where the text chunks come from.
///
/// Keeping the endpoint (rather than just the opened source) lets a stopped
/// session be reopened from the TUI.
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// A serial device node (or any readable file that streams), opened as a
    /// file. Baud rate and termios setup happen outside, before launch.
    Device(PathBuf),
    /// A TCP endpoint relaying serial output (host:port).
    Tcp(String),
    /// Standard input.
    Stdin,
    /// Replay of a recorded capture at a fixed pace per line.
    Replay { path: PathBuf, pace: Duration },
}

impl Endpoint {
    /// Open the endpoint, spawning its reader task on `runtime`.
    pub fn open(&self, runtime: &Handle) -> Result<Box<dyn ChunkSource>> {
        match self {
            Endpoint::Device(path) => {
                let desc = format!("device: {}", path.display());
                runtime.block_on(async {
                    let file = tokio::fs::File::open(path)
                        .await
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    Ok(Box::new(StreamSource::spawn(file, &desc)) as Box<dyn ChunkSource>)
                })
            }
            Endpoint::Tcp(addr) => runtime.block_on(async {
                let stream = tokio::net::TcpStream::connect(addr)
                    .await
                    .with_context(|| format!("failed to connect to {}", addr))?;
                let desc = format!("tcp: {}", addr);
                Ok(Box::new(StreamSource::spawn(stream, &desc)) as Box<dyn ChunkSource>)
            }),
            Endpoint::Stdin => {
                let _guard = runtime.enter();
                Ok(Box::new(StreamSource::spawn(tokio::io::stdin(), "stdin")))
            }
            Endpoint::Replay { path, pace } => {
                let _guard = runtime.enter();
                Ok(Box::new(FileSource::spawn(path, *pace)))
            }
        }
    }

    /// Short display label for the header.
    pub fn label(&self) -> String {
        match self {
            Endpoint::Device(path) => format!("device: {}", path.display()),
            Endpoint::Tcp(addr) => format!("tcp: {}", addr),
            Endpoint::Stdin => "stdin".to_string(),
            Endpoint::Replay { path, .. } => format!("replay: {}", path.display()),
        }
    }
}

/// Capped scrollback of cleaned lines and application messages.
///
/// Follows the tail until the user scrolls up; `offset` is the distance from
/// the tail so the view stays put while new lines arrive.
#[derive(Debug, Default)]
pub struct Scrollback {
    lines: VecDeque<String>,
    offset: usize,
    scrolled: bool,
}

impl Scrollback {
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        if self.lines.len() > SCROLLBACK_CAPACITY {
            self.lines.pop_front();
        }
        if self.scrolled {
            // Keep the viewed region stable as the tail grows
            self.offset = (self.offset + 1).min(self.lines.len().saturating_sub(1));
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.offset = 0;
        self.scrolled = false;
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.scrolled = true;
        self.offset = (self.offset + n).min(self.lines.len().saturating_sub(1));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
        if self.offset == 0 {
            self.scrolled = false;
        }
    }

    pub fn to_top(&mut self) {
        self.scrolled = true;
        self.offset = self.lines.len().saturating_sub(1);
    }

    /// Jump back to the tail and resume following.
    pub fn follow(&mut self) {
        self.offset = 0;
        self.scrolled = false;
    }

    pub fn is_following(&self) -> bool {
        !self.scrolled
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The most recent `height` lines ending `offset` before the tail.
    pub fn view(&self, height: usize) -> impl Iterator<Item = &str> {
        let end = self.lines.len().saturating_sub(self.offset);
        let start = end.saturating_sub(height);
        self.lines.range(start..end).map(String::as_str)
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    monitoring: bool,
    endpoint: Option<Endpoint>,
    runtime: Option<Handle>,
    source: Option<Box<dyn ChunkSource>>,

    reassembler: LineReassembler,
    pub store: SeriesStore,
    pub scrollback: Scrollback,

    // UI
    pub show_help: bool,
    pub theme: Theme,
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an App for the given endpoint. Call [`App::start`] to open it.
    pub fn new(endpoint: Endpoint, runtime: Handle, theme: Theme) -> Self {
        Self {
            running: true,
            monitoring: false,
            endpoint: Some(endpoint),
            runtime: Some(runtime),
            source: None,
            reassembler: LineReassembler::new(),
            store: SeriesStore::new(),
            scrollback: Scrollback::default(),
            show_help: false,
            theme,
            status_message: None,
        }
    }

    /// Create an App around an already-open source (embedding and tests).
    ///
    /// Such an app cannot reopen after a stop; it has no endpoint.
    pub fn with_source(source: Box<dyn ChunkSource>, theme: Theme) -> Self {
        let banner = format!("monitoring {}", source.description());
        let mut app = Self {
            running: true,
            monitoring: true,
            endpoint: None,
            runtime: None,
            source: Some(source),
            reassembler: LineReassembler::new(),
            store: SeriesStore::new(),
            scrollback: Scrollback::default(),
            show_help: false,
            theme,
            status_message: None,
        };
        app.scrollback.push(banner);
        app
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// Description of the configured endpoint or attached source.
    pub fn source_description(&self) -> String {
        if let Some(source) = &self.source {
            return source.description().to_string();
        }
        self.endpoint.as_ref().map(|e| e.label()).unwrap_or_else(|| "-".to_string())
    }

    /// Open the endpoint and begin a fresh monitoring session.
    ///
    /// Buffer, series window and scrollback are reset together at session
    /// start. Starting while already monitoring is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.monitoring {
            return Ok(());
        }
        let (Some(endpoint), Some(runtime)) = (&self.endpoint, &self.runtime) else {
            bail!("no endpoint configured to reopen");
        };
        let source = endpoint.open(runtime)?;
        info!(source = %source.description(), "monitoring started");

        self.reassembler.reset();
        self.store.reset();
        self.scrollback.clear();
        self.scrollback.push(format!("monitoring {}", source.description()));
        self.source = Some(source);
        self.monitoring = true;
        Ok(())
    }

    /// Stop monitoring: cancel the pending read and release the transport.
    ///
    /// Idempotent; already-buffered chunks are dropped with the source on
    /// the next start, not processed further.
    pub fn stop(&mut self) {
        if let Some(source) = &mut self.source {
            source.stop();
        }
        if self.monitoring {
            self.monitoring = false;
            info!("monitoring stopped");
            self.scrollback.push("stopped monitoring");
        }
    }

    /// Toggle between monitoring and stopped.
    pub fn toggle_monitoring(&mut self) {
        if self.monitoring {
            self.stop();
        } else if let Err(e) = self.start() {
            warn!(error = %e, "failed to start monitoring");
            self.scrollback.push(format!("error: {:#}", e));
            self.set_status_message(format!("start failed: {}", e));
        }
    }

    /// Drain available chunks through the pipeline.
    ///
    /// Each cleaned line lands in the scrollback; lines with at least one
    /// parsed reading advance the series window by one instant. Returns true
    /// if any line was processed.
    pub fn pump(&mut self) -> bool {
        let mut lines: Vec<String> = Vec::new();
        if let Some(source) = self.source.as_mut() {
            while let Some(chunk) = source.poll() {
                lines.extend(self.reassembler.feed(&chunk));
            }
        }

        // A transport error ends the session visibly; buffered lines above
        // were drained first
        if self.monitoring {
            if let Some(err) = self.source.as_ref().and_then(|s| s.error()) {
                self.scrollback.push(err);
                self.stop();
            }
        }

        let advanced = !lines.is_empty();
        for line in lines {
            self.process_line(line);
        }
        advanced
    }

    fn process_line(&mut self, line: String) {
        let extraction = extract(&line);
        for segment in &extraction.dropped {
            debug!(segment = %segment, "unparsable segment dropped");
        }
        self.scrollback.push(line);

        if extraction.readings.is_empty() {
            return;
        }
        for (tag, outcome) in self.store.update(&extraction.readings) {
            if outcome == SampleOutcome::DroppedCeilingReached {
                warn!(tag = %tag, "series ceiling reached, reading dropped");
            }
        }
    }

    /// Clear the chart window and the line buffer.
    pub fn reset_data(&mut self) {
        self.store.reset();
        self.reassembler.reset();
        self.scrollback.push("chart data reset");
        debug!("chart data reset");
    }

    /// Export the current window to a pretty-printed JSON file.
    ///
    /// Gaps serialize as `null`, matching their meaning in the chart.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        use std::io::Write;

        if self.store.is_empty() {
            bail!("no data to export");
        }

        let export = serde_json::json!({
            "captured_at": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            "labels": self.store.labels().collect::<Vec<_>>(),
            "series": self.store.series().iter().map(|s| {
                serde_json::json!({
                    "tag": s.tag(),
                    "samples": s.samples().collect::<Vec<_>>(),
                })
            }).collect::<Vec<_>>(),
        });

        let json = serde_json::to_string_pretty(&export)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Set a transient status message.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// The current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, at)) if at.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.stop();
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;

    fn test_app() -> (tokio::sync::mpsc::Sender<String>, App) {
        let (tx, source) = ChannelSource::create("test");
        (tx, App::with_source(Box::new(source), Theme::dark()))
    }

    #[test]
    fn test_pump_feeds_lines_through_pipeline() {
        let (tx, mut app) = test_app();
        tx.try_send("\u{1b}[31mtemp:21.5,hum:60\u{1b}[0m\ntem".to_string()).unwrap();
        tx.try_send("p:22.0\n".to_string()).unwrap();

        assert!(app.pump());

        assert_eq!(app.store.len(), 2);
        assert_eq!(app.store.series().len(), 2);
        let temp = app.store.series().iter().find(|s| s.tag() == "temp").unwrap();
        assert_eq!(temp.samples().collect::<Vec<_>>(), vec![Some(21.5), Some(22.0)]);
        let hum = app.store.series().iter().find(|s| s.tag() == "hum").unwrap();
        assert_eq!(hum.samples().collect::<Vec<_>>(), vec![Some(60.0), None]);
    }

    #[test]
    fn test_pump_logs_lines_without_readings() {
        let (tx, mut app) = test_app();
        tx.try_send("booting firmware\n".to_string()).unwrap();

        assert!(app.pump());

        // The line is visible but the window did not advance
        assert_eq!(app.store.len(), 0);
        assert!(app.scrollback.view(10).any(|l| l == "booting firmware"));
    }

    #[test]
    fn test_pump_without_data_reports_no_advance() {
        let (_tx, mut app) = test_app();
        assert!(!app.pump());
    }

    #[test]
    fn test_transport_error_stops_monitoring() {
        let (tx, mut app) = test_app();
        tx.try_send("temp:1\n".to_string()).unwrap();
        drop(tx);

        app.pump();

        assert!(!app.is_monitoring());
        // The line that was in flight was still processed
        assert_eq!(app.store.len(), 1);
        assert!(app.scrollback.view(10).any(|l| l == "channel closed"));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (_tx, mut app) = test_app();
        app.stop();
        app.stop();
        assert!(!app.is_monitoring());
        assert!(!app.pump());
    }

    #[test]
    fn test_reset_data_clears_window_and_buffer() {
        let (tx, mut app) = test_app();
        tx.try_send("temp:1\npartial".to_string()).unwrap();
        app.pump();
        assert_eq!(app.store.len(), 1);

        app.reset_data();

        assert_eq!(app.store.len(), 0);
        // The partial line was discarded with the buffer
        tx.try_send("tail:2\n".to_string()).unwrap();
        app.pump();
        assert_eq!(app.store.series().len(), 1);
        assert_eq!(app.store.series()[0].tag(), "tail");
    }

    #[test]
    fn test_export_state_round_trips_gaps() {
        let (tx, mut app) = test_app();
        tx.try_send("a:1,b:2\na:3\n".to_string()).unwrap();
        app.pump();

        let file = tempfile::NamedTempFile::new().unwrap();
        app.export_state(file.path()).unwrap();

        let exported: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(exported["labels"].as_array().unwrap().len(), 2);
        let series = exported["series"].as_array().unwrap();
        assert_eq!(series.len(), 2);
        let b = series.iter().find(|s| s["tag"] == "b").unwrap();
        assert_eq!(b["samples"][0], 2.0);
        assert!(b["samples"][1].is_null());
    }

    #[test]
    fn test_export_without_data_is_an_error() {
        let (_tx, app) = test_app();
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(app.export_state(file.path()).is_err());
    }

    #[test]
    fn test_start_without_endpoint_fails() {
        let (_tx, mut app) = test_app();
        app.stop();
        assert!(app.start().is_err());
    }

    #[test]
    fn test_endpoint_replay_opens() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "temp:1").unwrap();
        file.flush().unwrap();

        let rt = tokio::runtime::Runtime::new().unwrap();
        let endpoint = Endpoint::Replay {
            path: file.path().to_path_buf(),
            pace: Duration::from_millis(1),
        };
        let source = endpoint.open(rt.handle()).unwrap();
        assert!(source.description().starts_with("replay:"));
    }

    #[test]
    fn test_endpoint_device_opens_readable_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "temp:1").unwrap();
        file.flush().unwrap();

        let rt = tokio::runtime::Runtime::new().unwrap();
        let endpoint = Endpoint::Device(file.path().to_path_buf());
        let source = endpoint.open(rt.handle()).unwrap();
        assert!(source.description().starts_with("device:"));
    }

    #[test]
    fn test_endpoint_device_open_failure() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let endpoint = Endpoint::Device(PathBuf::from("/nonexistent/ttyUSB9"));
        assert!(endpoint.open(rt.handle()).is_err());
    }

    #[test]
    fn test_session_restart_resets_state() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "temp:1").unwrap();
        file.flush().unwrap();

        let rt = tokio::runtime::Runtime::new().unwrap();
        let endpoint = Endpoint::Device(file.path().to_path_buf());
        let mut app = App::new(endpoint, rt.handle().clone(), Theme::dark());

        app.start().unwrap();
        assert!(app.is_monitoring());
        // Idempotent start while monitoring
        app.start().unwrap();

        app.store.update_with_label(
            &[("stale".to_string(), 1.0)].into_iter().collect(),
            "t0".to_string(),
        );
        app.stop();

        app.start().unwrap();
        assert!(app.is_monitoring());
        assert_eq!(app.store.len(), 0, "new session starts clean");
    }

    #[test]
    fn test_scrollback_caps_and_follows() {
        let mut sb = Scrollback::default();
        for i in 0..(SCROLLBACK_CAPACITY + 10) {
            sb.push(format!("line {i}"));
        }
        assert_eq!(sb.len(), SCROLLBACK_CAPACITY);
        assert!(sb.is_following());
        let tail: Vec<_> = sb.view(2).collect();
        assert_eq!(tail.last().copied(), Some("line 509"));
    }

    #[test]
    fn test_scrollback_scroll_keeps_view_stable() {
        let mut sb = Scrollback::default();
        for i in 0..10 {
            sb.push(format!("line {i}"));
        }
        sb.scroll_up(3);
        assert!(!sb.is_following());
        let before: Vec<String> = sb.view(2).map(str::to_string).collect();

        sb.push("line 10");
        let after: Vec<String> = sb.view(2).map(str::to_string).collect();
        assert_eq!(before, after, "view should not shift while scrolled");

        sb.follow();
        assert!(sb.is_following());
        assert_eq!(sb.view(1).next(), Some("line 10"));
    }

    #[test]
    fn test_scrollback_scroll_bounds() {
        let mut sb = Scrollback::default();
        sb.push("only");
        sb.scroll_up(100);
        sb.scroll_down(100);
        assert!(sb.is_following());
        sb.to_top();
        assert!(!sb.is_following());
    }
}
