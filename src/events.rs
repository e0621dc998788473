use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseEvent, MouseEventKind};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // Stop/resume monitoring
        KeyCode::Char('s') | KeyCode::Char(' ') => app.toggle_monitoring(),

        // Reset chart data
        KeyCode::Char('r') => app.reset_data(),

        // Export current window
        KeyCode::Char('e') => {
            let export_path = std::path::PathBuf::from("serwatch_export.json");
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("export failed: {}", e));
                }
            }
        }

        // Scrollback navigation
        KeyCode::Up | KeyCode::Char('k') => app.scrollback.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scrollback.scroll_down(1),
        KeyCode::PageUp => app.scrollback.scroll_up(10),
        KeyCode::PageDown => app.scrollback.scroll_down(10),
        KeyCode::Home => app.scrollback.to_top(),
        KeyCode::End | KeyCode::Char('f') => app.scrollback.follow(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle a mouse event (wheel scrolls the scrollback)
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scrollback.scroll_up(3),
        MouseEventKind::ScrollDown => app.scrollback.scroll_down(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use crate::ui::Theme;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn test_app() -> App {
        let (_tx, source) = ChannelSource::create("test");
        App::with_source(Box::new(source), Theme::dark())
    }

    #[test]
    fn test_q_quits() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_s_toggles_monitoring() {
        let mut app = test_app();
        assert!(app.is_monitoring());
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert!(!app.is_monitoring());
    }

    #[test]
    fn test_any_key_closes_help() {
        let mut app = test_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert!(!app.show_help);
    }

    #[test]
    fn test_r_resets_chart() {
        let mut app = test_app();
        app.store.update_with_label(
            &[("a".to_string(), 1.0)].into_iter().collect(),
            "t0".to_string(),
        );
        handle_key_event(&mut app, key(KeyCode::Char('r')));
        assert!(app.store.is_empty());
    }
}
