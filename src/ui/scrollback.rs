//! Scrollback panel: the cleaned lines and application messages.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the scrollback panel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let height = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .scrollback
        .view(height)
        .map(|l| Line::from(l.to_string()))
        .collect();

    let title = if app.scrollback.is_following() {
        " output ".to_string()
    } else {
        format!(" output (scrolled, {} lines, f to follow) ", app.scrollback.len())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(title);

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
