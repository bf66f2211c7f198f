//! Layout helpers for the iterate TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Widest the shell card gets, in cells.
pub const CARD_MAX_WIDTH: u16 = 72;

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Create the main layout with status bar at bottom.
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// The card every screen draws into: centred, at most [`CARD_MAX_WIDTH`]
/// wide, with a one-cell margin inside `area`.
pub fn card_area(area: Rect, height: u16) -> Rect {
    let width = CARD_MAX_WIDTH.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    centered_fixed(width, height, area)
}

/// Split `area` into consecutive rows of the given heights.
///
/// Rows that do not fit are returned with zero height.
pub fn rows(area: Rect, heights: &[u16]) -> Vec<Rect> {
    let mut y = area.y;
    let bottom = area.y.saturating_add(area.height);
    heights
        .iter()
        .map(|&h| {
            let h = h.min(bottom.saturating_sub(y));
            let row = Rect::new(area.x, y, area.width, h);
            y = y.saturating_add(h);
            row
        })
        .collect()
}
