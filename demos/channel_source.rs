//! Example: Charting readings fed through a channel
//!
//! This example demonstrates how to integrate serwatch into your own
//! application by sending decoded text chunks through a channel.
//!
//! This is useful when you want to:
//! - Bridge from a transport serwatch does not open itself
//! - Generate synthetic readings for testing
//! - Drive the pipeline from any async data source
//!
//! # Usage
//!
//! ```bash
//! cargo run --example channel_source
//! ```

use std::thread;
use std::time::Duration;

use serwatch::{App, ChannelSource, Theme};

fn main() {
    println!("Channel source example");
    println!("Generating synthetic sensor lines...\n");

    // Create a channel source - this returns both a sender and the source
    let (tx, source) = ChannelSource::create("synthetic-data");

    // Spawn a thread that prints the way a device firmware would
    thread::spawn(move || {
        let mut tick = 0u64;

        loop {
            tick += 1;

            // A triangle wave and a slow ramp, with an occasional free-text
            // line the parser has to skip past
            let temp = 20.0 + (tick % 16).min(16 - tick % 16) as f64 * 0.5;
            let hum = 55.0 + (tick % 40) as f64 * 0.25;

            let line = if tick % 10 == 0 {
                format!("heartbeat ok, uptime {}s, temp:{:.1},hum:{:.2}\n", tick / 2, temp, hum)
            } else {
                format!("temp:{:.1},hum:{:.2}\n", temp, hum)
            };

            if tx.blocking_send(line).is_err() {
                break; // Receiver dropped
            }

            thread::sleep(Duration::from_millis(500));
        }
    });

    // Pump the pipeline in the main thread
    let mut app = App::with_source(Box::new(source), Theme::dark());

    println!("Receiving readings (press Ctrl+C to stop):\n");

    loop {
        if app.pump() {
            println!("window {:2} instants:", app.store.len());
            for series in app.store.series() {
                match series.latest() {
                    Some(value) => println!("  - {}: {:.2}", series.tag(), value),
                    None => println!("  - {}: (no reading yet)", series.tag()),
                }
            }
            println!();
        }

        thread::sleep(Duration::from_millis(100));
    }
}
