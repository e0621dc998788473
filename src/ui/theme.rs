//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection. The
//! series palette is fixed and independent of the theme, so a series keeps
//! its color identity across theme choices.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Fixed display palette for series, indexed by the palette slot a series
/// is bound to at creation.
const SERIES_PALETTE: [Color; 6] = [
    Color::Rgb(0xe7, 0x4c, 0x3c), // red
    Color::Rgb(0x34, 0x98, 0xdb), // blue
    Color::Rgb(0x2e, 0xcc, 0x71), // green
    Color::Rgb(0xf1, 0xc4, 0x0f), // yellow
    Color::Rgb(0x9b, 0x59, 0xb6), // purple
    Color::Rgb(0xe6, 0x7e, 0x22), // orange
];

/// Display color for a series palette slot.
pub fn series_color(slot: usize) -> Color {
    SERIES_PALETTE[slot % SERIES_PALETTE.len()]
}

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic selection based on terminal
/// background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for the live-monitoring indicator.
    pub active: Color,
    /// Color for the stopped indicator and error lines.
    pub inactive: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for panel titles and the help header.
    pub header: Style,
    /// Dimmed style for hints and axis labels.
    pub dim: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            active: Color::Green,
            inactive: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            dim: Style::default().add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            active: Color::Green,
            inactive: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            dim: Style::default().add_modifier(Modifier::DIM),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        // Use terminal-light crate to detect background luminance
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }
}
