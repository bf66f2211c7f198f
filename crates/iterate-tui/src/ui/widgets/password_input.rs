//! Masked single-line password input.

use crate::ui::theme::Styles;
use iterate_bridge::Password;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use zeroize::{Zeroize, Zeroizing};

/// Mask character drawn in place of each entered character.
const MASK: char = '*';

/// A masked password field.
#[derive(Debug, Clone)]
pub struct PasswordInput<'a> {
    /// Number of characters entered.
    len: usize,
    /// Cursor position (character index).
    cursor: usize,
    /// Field label, drawn as the block title.
    label: &'a str,
    /// Whether the input is focused.
    focused: bool,
    /// Placeholder text shown while empty.
    placeholder: Option<&'a str>,
    /// Greyed out while a request is in flight.
    disabled: bool,
}

impl<'a> PasswordInput<'a> {
    /// Create a field for `label`.
    pub fn new(label: &'a str) -> Self {
        Self {
            len: 0,
            cursor: 0,
            label,
            focused: false,
            placeholder: None,
            disabled: false,
        }
    }

    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Set disabled state.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl Widget for PasswordInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused && !self.disabled {
            Styles::border_active()
        } else {
            Styles::border()
        };
        let block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(if self.focused { Styles::highlight() } else { Styles::dim() })
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Styles::default());

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let text_style = if self.disabled { Styles::dim() } else { Styles::default() };
        let show_cursor = self.focused && !self.disabled;

        if self.len == 0 {
            let mut spans = Vec::new();
            if show_cursor {
                spans.push(Span::styled("_", Styles::active()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(inner, buf);
            return;
        }

        // Keep the cursor in view when the mask is wider than the field
        let visible = usize::from(inner.width).saturating_sub(1).max(1);
        let start = self.cursor.saturating_sub(visible);

        let mut line = String::new();
        for i in start..self.len {
            if show_cursor && i == self.cursor {
                line.push('|');
            }
            line.push(MASK);
        }
        if show_cursor && self.cursor == self.len {
            line.push('_');
        }

        Paragraph::new(Line::from(Span::styled(line, text_style))).render(inner, buf);
    }
}

/// State for a password field.
///
/// The entered text lives in a zeroizing buffer and is wiped on every
/// clear, on [`take_password`](Self::take_password), and on drop.
#[derive(Clone, Default)]
pub struct PasswordInputState {
    content: Zeroizing<String>,
    /// Cursor position (character index).
    cursor: usize,
}

impl std::fmt::Debug for PasswordInputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordInputState")
            .field("len", &self.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl PasswordInputState {
    /// Create a new empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// The entered text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of characters entered.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    /// Check if the field is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Cursor position (character index).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Wipe the content.
    pub fn clear(&mut self) {
        self.content.zeroize();
        self.cursor = 0;
    }

    /// Encode the content to password bytes and wipe the field.
    pub fn take_password(&mut self) -> Password {
        let password = Password::from_text(&self.content);
        self.clear();
        password
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let at = self.byte_index(self.cursor);
        // Grow by hand so the old allocation is wiped rather than freed as is.
        if self.content.len() + ch.len_utf8() > self.content.capacity() {
            let mut grown = Zeroizing::new(String::with_capacity(
                (self.content.capacity() * 2).max(self.content.len() + ch.len_utf8()).max(16),
            ));
            grown.push_str(&self.content);
            self.content = grown;
        }
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    /// Create a widget from this state.
    pub fn widget<'a>(&self, label: &'a str) -> PasswordInput<'a> {
        let mut input = PasswordInput::new(label);
        input.len = self.len();
        input.cursor = self.cursor;
        input
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_password_input_state_basic() {
        let mut state = PasswordInputState::new();
        assert!(state.is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor(), 2);

        state.backspace();
        assert_eq!(state.content(), "H");

        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_cursor_movement_multibyte() {
        let mut state = PasswordInputState::new();
        for ch in "pässwörd".chars() {
            state.insert(ch);
        }
        assert_eq!(state.len(), 8);

        state.move_home();
        state.move_right();
        state.move_right();
        state.delete();
        assert_eq!(state.content(), "pässwörd".replacen('s', "", 1));

        state.move_end();
        assert_eq!(state.cursor(), 7);
        state.move_left();
        state.insert('X');
        assert_eq!(state.content(), "päswörXd");
    }

    #[test]
    fn test_control_chars_ignored() {
        let mut state = PasswordInputState::new();
        state.insert('\n');
        state.insert('\t');
        assert!(state.is_empty());
    }

    #[test]
    fn test_take_password_clears_field() {
        let mut state = PasswordInputState::new();
        for ch in "hunter22".chars() {
            state.insert(ch);
        }
        let password = state.take_password();
        assert_eq!(password.as_bytes(), b"hunter22");
        assert!(state.is_empty());
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_render_masks_content() {
        let mut state = PasswordInputState::new();
        for ch in "secret".chars() {
            state.insert(ch);
        }
        let area = Rect::new(0, 0, 20, 3);
        let mut buf = Buffer::empty(area);
        state.widget("Password").focused(true).render(area, &mut buf);

        let rendered = buffer_to_string(&buf);
        assert!(rendered.contains("Password"));
        assert!(rendered.contains("******_"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_render_placeholder_when_empty() {
        let state = PasswordInputState::new();
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        state
            .widget("Master password")
            .placeholder("Enter a strong password")
            .render(area, &mut buf);

        assert!(buffer_to_string(&buf).contains("Enter a strong password"));
    }
}
