//! Common UI components: header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{SERIES_CEILING, WINDOW_CAPACITY};

/// Render the header bar: state indicator, source, and series count.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (state, state_style) = if app.is_monitoring() {
        ("monitoring", Style::default().fg(app.theme.active))
    } else {
        ("stopped", Style::default().fg(app.theme.inactive).add_modifier(Modifier::BOLD))
    };

    let line = Line::from(vec![
        Span::styled(" ● ", state_style),
        Span::styled("SERWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(app.source_description()),
        Span::raw(" │ "),
        Span::styled(state, state_style),
        Span::raw(format!(
            " │ {}/{} series",
            app.store.series().len(),
            SERIES_CEILING
        )),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows available controls and the window fill; temporary status messages
/// take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let status = format!(
        " {}/{} samples | s:stop/start r:reset e:export ↑↓:scroll f:follow ?:help q:quit",
        app.store.len(),
        WINDOW_CAPACITY,
    );
    let paragraph = Paragraph::new(status).style(app.theme.dim);
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Session",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  s / Space   Stop or resume monitoring"),
        Line::from("  r           Reset chart data"),
        Line::from("  e           Export window to JSON"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Scrollback",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Scroll one line"),
        Line::from("  PgUp/PgDn   Scroll ten lines"),
        Line::from("  Home        Jump to oldest line"),
        Line::from("  End / f     Follow the tail"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?           Toggle this help"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
