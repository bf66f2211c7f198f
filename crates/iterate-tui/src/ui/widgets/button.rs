//! A one-line button.

use crate::text::visual_width;
use crate::ui::theme::Styles;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// A labelled button, drawn as `[ label ]`.
#[derive(Debug, Clone)]
pub struct Button<'a> {
    label: &'a str,
    focused: bool,
    disabled: bool,
}

impl<'a> Button<'a> {
    /// Create a button.
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            focused: false,
            disabled: false,
        }
    }

    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set disabled state.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Width in cells.
    pub fn width(&self) -> u16 {
        u16::try_from(visual_width(self.label) + 4).unwrap_or(u16::MAX)
    }
}

impl Widget for Button<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }
        let style = if self.disabled {
            Styles::dim()
        } else if self.focused {
            Styles::button_active()
        } else {
            Styles::button()
        };
        let text = format!("[ {} ]", self.label);
        let x = area.x + area.width.saturating_sub(self.width()) / 2;
        buf.set_stringn(x, area.y, text, usize::from(area.right().saturating_sub(x)), style);
    }
}
