//! Example: Replaying a recorded serial capture
//!
//! This example demonstrates replaying a capture file through the pipeline
//! without the TUI, printing the series window as it fills.
//!
//! The file should contain the device's raw output, one reading line per
//! line, e.g. `temp:21.5,hum:60`. Capture one with e.g.
//! `cat /dev/ttyUSB0 > capture.txt`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example replay -- path/to/capture.txt
//! ```

use std::env;
use std::thread;
use std::time::Duration;

use serwatch::{App, FileSource, Theme};

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example replay -- <path-to-capture.txt>");
        eprintln!();
        eprintln!("The file should contain raw device output such as:");
        eprintln!("  temp:21.5,hum:60");
        std::process::exit(1);
    });

    println!("Replaying capture: {}", path);
    println!();

    // The replay reader runs on the runtime; the pump stays on this thread
    let rt = tokio::runtime::Runtime::new().expect("failed to build runtime");
    let _guard = rt.enter();

    let source = FileSource::spawn(&path, Duration::from_millis(100));
    let mut app = App::with_source(Box::new(source), Theme::dark());

    while app.is_monitoring() {
        if app.pump() {
            let tags: Vec<String> = app
                .store
                .series()
                .iter()
                .map(|s| match s.latest() {
                    Some(value) => format!("{}:{:.2}", s.tag(), value),
                    None => s.tag().to_string(),
                })
                .collect();
            println!("[{:2}/60] {}", app.store.len(), tags.join("  "));
        }

        thread::sleep(Duration::from_millis(50));
    }

    println!();
    println!(
        "replay ended with {} series over {} instants",
        app.store.series().len(),
        app.store.len()
    );
}
