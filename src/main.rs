// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};

mod app;
mod data;
mod events;
mod settings;
mod source;
mod ui;

use app::{App, Endpoint};
use settings::Settings;
use ui::Theme;

#[derive(Parser, Debug)]
#[command(name = "serwatch")]
#[command(about = "Terminal serial-plotter for tagged sensor readings")]
struct Args {
    /// Serial device node to read (e.g. /dev/ttyUSB0; set the baud rate
    /// with stty before launching)
    #[arg(short, long, conflicts_with_all = ["connect", "replay", "stdin"])]
    device: Option<PathBuf>,

    /// Connect to a TCP endpoint relaying serial output (host:port)
    #[arg(short, long, conflicts_with_all = ["device", "replay", "stdin"])]
    connect: Option<String>,

    /// Replay a recorded capture file
    #[arg(long, conflicts_with_all = ["device", "connect", "stdin"])]
    replay: Option<PathBuf>,

    /// Read from standard input (the default when nothing else is given)
    #[arg(long, conflicts_with_all = ["device", "connect", "replay"])]
    stdin: bool,

    /// Pace between replayed lines in milliseconds (used with --replay)
    #[arg(long, default_value = "500")]
    pace: u64,

    /// UI tick interval in milliseconds
    #[arg(short, long)]
    refresh_ms: Option<u64>,

    /// Config file (TOML); SERWATCH_* environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append structured logs to this file (stderr belongs to the TUI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Force the theme (light|dark) instead of auto-detection
    #[arg(long)]
    theme: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    if let Some(path) = args.log_file.as_ref().or(settings.log_file.as_ref()) {
        init_logging(path)?;
    }

    let theme = match args.theme.as_deref().or(settings.theme.as_deref()) {
        Some("light") => Theme::light(),
        Some("dark") => Theme::dark(),
        _ => Theme::auto_detect(),
    };

    let endpoint = resolve_endpoint(&args, &settings);
    let refresh = Duration::from_millis(args.refresh_ms.or(settings.refresh_ms).unwrap_or(100));

    // The runtime hosts the source reader tasks; the TUI loop stays on the
    // main thread
    let rt = tokio::runtime::Runtime::new()?;

    run_tui(endpoint, rt.handle().clone(), theme, refresh)
}

/// Pick the endpoint: CLI flags first, then the config file, then stdin.
fn resolve_endpoint(args: &Args, settings: &Settings) -> Endpoint {
    if let Some(path) = &args.device {
        return Endpoint::Device(path.clone());
    }
    if let Some(addr) = &args.connect {
        return Endpoint::Tcp(addr.clone());
    }
    if let Some(path) = &args.replay {
        return Endpoint::Replay {
            path: path.clone(),
            pace: Duration::from_millis(args.pace),
        };
    }
    if args.stdin {
        return Endpoint::Stdin;
    }
    if let Some(path) = &settings.device {
        return Endpoint::Device(path.clone());
    }
    if let Some(addr) = &settings.connect {
        return Endpoint::Tcp(addr.clone());
    }
    if let Some(path) = &settings.replay {
        return Endpoint::Replay {
            path: path.clone(),
            pace: Duration::from_millis(args.pace),
        };
    }
    Endpoint::Stdin
}

/// Route tracing output to a file; the terminal is busy drawing.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

/// Run the TUI against the given endpoint.
fn run_tui(
    endpoint: Endpoint,
    runtime: tokio::runtime::Handle,
    theme: Theme,
    refresh: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Create app and open the endpoint; a failed open leaves a visible
    // message rather than exiting
    let mut app = App::new(endpoint, runtime, theme);
    if let Err(e) = app.start() {
        app.scrollback.push(format!("error: {:#}", e));
        app.set_status_message(format!("start failed: {}", e));
    }

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, refresh);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh: Duration,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 40;
    const MIN_HEIGHT: u16 = 14;

    while app.running {
        // Drain whatever the transport produced since the last tick
        app.pump();

        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(0, area.height / 2 - 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1),  // Header bar
                Constraint::Min(8),     // Chart
                Constraint::Length(10), // Scrollback
                Constraint::Length(1),  // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::chart::render(frame, app, chunks[1]);
            ui::scrollback::render(frame, app, chunks[2]);
            ui::common::render_status_bar(frame, app, chunks[3]);

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout; this is also the UI tick
        if let Some(event) = events::poll_event(refresh)? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
