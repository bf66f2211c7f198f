//! Screen definitions for the iterate TUI.

pub mod create_journal;
pub mod journal_select;
pub mod unlock_journal;

use crate::app::{App, Route};
use crate::text::wrap_styled;
use crate::ui::theme::{spinner, Styles};
use crate::ui::{card_area, centered_fixed, main_layout, KeyHint, StatusBar};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render the whole frame: backdrop, current screen, status bar, overlays.
pub fn render_app(app: &App, area: Rect, buf: &mut Buffer) {
    Block::default().style(Styles::backdrop()).render(area, buf);

    let (main, status) = main_layout(area);
    match app.route {
        Route::JournalSelect => journal_select::JournalSelectScreen.render(app, main, buf),
        Route::CreateJournal => create_journal::CreateJournalScreen.render(app, main, buf),
        Route::UnlockJournal => unlock_journal::UnlockJournalScreen.render(app, main, buf),
    }

    let busy;
    let right = if app.is_busy() {
        busy = format!("{} working", spinner(app.tick));
        Some(busy.as_str())
    } else {
        app.notification.as_deref()
    };
    let mut bar = StatusBar::new(app.route.title()).hints(status_hints(app.route));
    if let Some(text) = right {
        bar = bar.right(text);
    }
    bar.render(status, buf);

    if app.show_help {
        render_help_overlay(area, buf);
    }
}

fn status_hints(route: Route) -> Vec<KeyHint> {
    match route {
        Route::JournalSelect => vec![
            KeyHint::new("c", "Create"),
            KeyHint::new("o", "Open"),
            KeyHint::new("?", "Help"),
            KeyHint::new("q", "Quit"),
        ],
        Route::CreateJournal => vec![
            KeyHint::new("Tab", "Next field"),
            KeyHint::new("Enter", "Confirm"),
            KeyHint::new("Esc", "Back"),
        ],
        Route::UnlockJournal => vec![
            KeyHint::new("Enter", "Unlock"),
            KeyHint::new("Esc", "Back"),
        ],
    }
}

/// Draw the shared card frame and return the padded area inside it.
pub(crate) fn render_card(title: &str, area: Rect, height: u16, buf: &mut Buffer) -> Rect {
    let card = card_area(area, height);
    Clear.render(card, buf);

    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border())
        .style(Styles::default());
    let inner = block.inner(card);
    block.render(card, buf);

    Rect::new(
        inner.x.saturating_add(1),
        inner.y,
        inner.width.saturating_sub(2),
        inner.height,
    )
}

/// Draw an error message wrapped to `area`.
pub(crate) fn render_error(message: &str, area: Rect, buf: &mut Buffer) {
    let lines = wrap_styled(message, usize::from(area.width), "", Styles::error());
    Paragraph::new(lines).render(area, buf);
}

/// Draw a single centred line.
pub(crate) fn render_centered(line: Line<'_>, area: Rect, buf: &mut Buffer) {
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let help_text = r"
  Journals
    c / n             Create a new journal
    o                 Open an existing journal
    Tab / arrows      Move between buttons
    Enter             Activate
    q                 Quit
    ?                 Toggle this help

  Password screens
    Tab / Shift+Tab   Next/prev field
    Enter             Submit
    Esc               Back to journals
    Ctrl+C            Quit

  [Press any key to close]
";

    let width = 50.min(area.width.saturating_sub(4));
    let height = 20.min(area.height.saturating_sub(4));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(help_text)
        .block(block)
        .style(Styles::default())
        .render(overlay_area, buf);
}

#[cfg(test)]
mod tests {
    use crate::event::Action;
    use crate::test_utils::{create_test_app, render_app_to_string};

    #[test]
    fn test_status_bar_follows_route() {
        let mut app = create_test_app();
        assert!(render_app_to_string(&app).contains(" Journals "));

        app.handle_action(Action::CreateJournal);
        let out = render_app_to_string(&app);
        assert!(out.contains(" Create "));
        assert!(out.contains("Next field"));
    }

    #[test]
    fn test_help_overlay_renders() {
        let mut app = create_test_app();
        app.handle_action(Action::Help);
        let out = render_app_to_string(&app);
        assert!(out.contains("Help"));
        assert!(out.contains("Open an existing journal"));
    }

    #[test]
    fn test_busy_indicator_in_status_bar() {
        let mut app = create_test_app();
        app.handle_action(Action::OpenJournal);
        assert!(render_app_to_string(&app).contains("working"));
    }
}
