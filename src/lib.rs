// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # serwatch
//!
//! A terminal serial-plotter and library for charting tagged sensor
//! readings from a live text stream.
//!
//! Devices print free-text lines containing comma-separated `tag:value`
//! pairs, often interleaved with boot noise and terminal escape sequences.
//! serwatch reassembles and cleans those lines, extracts the readings, and
//! keeps up to six named series over a sliding 60-instant window, rendered
//! as a scrolling chart with a scrollback panel of the raw lines.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐   ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │──▶│ Terminal│ │
//! │  │ (state) │    │(pipeline)│    │(render) │   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘   └─────────┘ │
//! │       │                                                    │
//! │       ▼                                                    │
//! │  ┌─────────┐                                               │
//! │  │ source  │◀── StreamSource | ChannelSource | FileSource  │
//! │  │ (input) │                                               │
//! │  └─────────┘                                               │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: session control (start/stop/reset), the pump that drives
//!   chunks through the pipeline, scrollback and export
//! - **[`source`]**: transport seam ([`ChunkSource`] trait) with stream,
//!   channel, and replay implementations
//! - **[`data`]**: the pipeline - [`LineReassembler`] buffering and
//!   cleaning, [`extract`] for `tag:value` pairs, and the bounded
//!   [`SeriesStore`] window
//! - **[`ui`]**: terminal rendering using ratatui - chart, scrollback,
//!   chrome, and theme support
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a serial device (configure the line first, e.g. with stty)
//! stty -F /dev/ttyUSB0 115200 raw
//! serwatch --device /dev/ttyUSB0
//!
//! # Chart output relayed over TCP, or piped in
//! serwatch --connect localhost:7777
//! some-serial-bridge | serwatch
//! ```
//!
//! ### Driving the pipeline directly
//!
//! ```
//! use serwatch::data::{extract, LineReassembler, SeriesStore};
//!
//! let mut reassembler = LineReassembler::new();
//! let mut store = SeriesStore::new();
//!
//! for line in reassembler.feed("\u{1b}[32mtemp:21.5,hum:60\u{1b}[0m\n") {
//!     let extraction = extract(&line);
//!     if !extraction.readings.is_empty() {
//!         store.update(&extraction.readings);
//!     }
//! }
//! assert_eq!(store.series().len(), 2);
//! ```
//!
//! ### Embedding behind another transport
//!
//! ```
//! use serwatch::{App, ChannelSource, Theme};
//!
//! let (tx, source) = ChannelSource::create("bridge");
//! let mut app = App::with_source(Box::new(source), Theme::dark());
//!
//! tx.try_send("temp:21.5\n".to_string()).unwrap();
//! app.pump();
//! assert_eq!(app.store.len(), 1);
//! ```

pub mod app;
pub mod data;
pub mod events;
pub mod settings;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, Endpoint, Scrollback};
pub use data::{
    extract, Extraction, LineReassembler, SampleOutcome, Series, SeriesStore, SERIES_CEILING,
    WINDOW_CAPACITY,
};
pub use settings::Settings;
pub use source::{ChannelSource, ChunkSource, FileSource, StreamSource};
pub use ui::Theme;
