//! Configuration loaded from an optional TOML file and the environment.
//!
//! Command-line flags take precedence over everything here; a value in the
//! `SERWATCH_*` environment overrides the file. Example file:
//!
//! ```toml
//! device = "/dev/ttyUSB0"
//! refresh_ms = 100
//! theme = "dark"
//! log_file = "serwatch.log"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

/// Settings that can preset the CLI options.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Serial device node to read.
    pub device: Option<PathBuf>,
    /// TCP endpoint streaming serial output (host:port).
    pub connect: Option<String>,
    /// Capture file to replay.
    pub replay: Option<PathBuf>,
    /// UI tick interval in milliseconds.
    pub refresh_ms: Option<u64>,
    /// Theme override ("light" or "dark").
    pub theme: Option<String>,
    /// Append structured logs to this file.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `path` (if given) layered under `SERWATCH_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("SERWATCH"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
