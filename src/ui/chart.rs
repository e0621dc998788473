//! Chart panel rendering.
//!
//! Draws one dataset per live series over the shared timestamp window.
//! Gaps in a series are simply absent points, never interpolated.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, Paragraph},
    Frame,
};

use super::theme::series_color;
use crate::app::App;
use crate::data::WINDOW_CAPACITY;

/// Render the chart for the current series window.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let store = &app.store;

    if store.is_empty() {
        draw_placeholder(frame, app, area);
        return;
    }

    // Legend entries carry the latest value, like a live readout
    let traces: Vec<(String, usize, Vec<(f64, f64)>)> = store
        .series()
        .iter()
        .map(|s| {
            let name = match s.latest() {
                Some(v) => format!("{} {:.2}", s.tag(), v),
                None => s.tag().to_string(),
            };
            (name, s.palette_slot(), s.points())
        })
        .collect();

    let datasets: Vec<Dataset> = traces
        .iter()
        .map(|(name, slot, data)| {
            Dataset::default()
                .name(name.clone())
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(series_color(*slot)))
                .data(data)
        })
        .collect();

    let (min, max) = store.value_bounds().unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_bounds(min, max);
    let x_max = store.len().saturating_sub(1).max(10) as f64;
    let (first_label, last_label) = store.label_bounds().unwrap_or(("", ""));

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border))
                .title(format!(" readings {}/{} ", store.len(), WINDOW_CAPACITY)),
        )
        .x_axis(
            Axis::default()
                .style(app.theme.dim)
                .bounds([0.0, x_max])
                .labels(vec![
                    Line::from(first_label.to_string()),
                    Line::from(last_label.to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(app.theme.dim)
                .bounds([y_min, y_max])
                .labels(vec![
                    Line::from(format!("{:.1}", y_min)),
                    Line::from(format!("{:.1}", (y_min + y_max) / 2.0)),
                    Line::from(format!("{:.1}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn draw_placeholder(frame: &mut Frame, app: &App, area: Rect) {
    let hint = if app.is_monitoring() {
        "waiting for tag:value readings..."
    } else {
        "stopped - press s to start monitoring"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
        .title(" readings ");
    let paragraph = Paragraph::new(hint)
        .style(app.theme.dim)
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Pad value bounds so traces don't hug the frame; a flat series still gets
/// a visible band.
fn pad_bounds(min: f64, max: f64) -> (f64, f64) {
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}
