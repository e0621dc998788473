//! The stream-to-chart pipeline: line reassembly, reading extraction, and
//! the bounded series window.
//!
//! ## Data flow
//!
//! ```text
//! decoded text chunks
//!        │
//!        ▼
//! LineReassembler::feed()      (buffering, escape/control stripping)
//!        │  cleaned line
//!        ▼
//! parse::extract()             (tag:value pairs, named drops)
//!        │  readings
//!        ▼
//! SeriesStore::update()        (labels + series, 60-instant window)
//! ```

pub mod line;
pub mod parse;
pub mod store;

pub use line::LineReassembler;
pub use parse::{extract, Extraction};
pub use store::{SampleOutcome, Series, SeriesStore, SERIES_CEILING, WINDOW_CAPACITY};
