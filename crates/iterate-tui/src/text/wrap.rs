//! Text wrapping for messages shown inside the card.

use ratatui::style::Style;
use ratatui::text::Line;

/// Wrap a plain text string to the specified width.
/// Returns a vector of wrapped lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

/// Wrap `text` into styled lines, each prefixed by `indent`.
pub fn wrap_styled(text: &str, width: usize, indent: &str, style: Style) -> Vec<Line<'static>> {
    let available = width.saturating_sub(indent.len());
    wrap_text(text, available)
        .into_iter()
        .map(|line| Line::styled(format!("{indent}{line}"), style))
        .collect()
}
