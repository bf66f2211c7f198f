//! Test utilities for iterate-tui rendering and interaction tests.
//!
//! This module provides helpers for creating test apps, feeding them keys,
//! rendering screens, and converting buffers to strings for assertions.

use crate::app::{App, BackendReply, BackendResponse};
use crate::screens::{render_app, Screen as ScreenTrait};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with custom dimensions.
pub fn create_test_terminal_sized(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Create a test app with no settings store.
pub fn create_test_app() -> App {
    App::new_for_test()
}

/// A plain key press.
pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Type `text` into whatever has focus.
pub fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_key(key(KeyCode::Char(ch)));
    }
}

/// Answer the oldest queued request with `reply`.
pub fn respond(app: &mut App, reply: BackendReply) {
    let request = app.take_request().expect("no queued request");
    app.handle_response(BackendResponse {
        seq: request.seq,
        reply,
    });
}

/// Convert a buffer to a string, one line per row, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            let cell = buffer.cell((x, y)).unwrap();
            result.push_str(cell.symbol());
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    result
}

/// Render a screen to a buffer and return it as a string.
pub fn render_screen_to_string<S: ScreenTrait>(screen: &S, app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

/// Render the full frame through a test terminal.
pub fn render_app_to_string(app: &App) -> String {
    let mut terminal = create_test_terminal_sized(TEST_WIDTH, TEST_HEIGHT);
    terminal
        .draw(|frame| {
            let area = frame.area();
            render_app(app, area, frame.buffer_mut());
        })
        .expect("Failed to draw");
    buffer_to_string(terminal.backend().buffer())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_to_string_trims_lines() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 10, 2));
        buffer.set_string(0, 0, "hi", ratatui::style::Style::default());
        assert_eq!(buffer_to_string(&buffer), "hi\n\n");
    }

    #[test]
    fn test_type_text_fills_field() {
        let mut app = create_test_app();
        app.navigate(crate::app::Route::UnlockJournal);
        type_text(&mut app, "abc");
        assert_eq!(app.unlock.password.len(), 3);
    }
}
