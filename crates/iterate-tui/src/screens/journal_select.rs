//! Journal selection: create a new journal or open an existing one.

use super::{render_card, render_centered, render_error, Screen};
use crate::app::App;
use crate::forms::SelectButton;
use crate::text::{truncate_path_start, truncate_to_width};
use crate::ui::theme::{spinner, Styles};
use crate::ui::{rows, Button};
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

const CARD_HEIGHT: u16 = 15;

/// Landing screen.
pub struct JournalSelectScreen;

impl Screen for JournalSelectScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let inner = render_card("Iterate", area, CARD_HEIGHT, buf);
        let r = rows(inner, &[1, 1, 1, 1, 1, 1, 2, 5]);

        render_centered(Line::styled("Welcome to Iterate", Styles::title()), r[1], buf);
        render_centered(
            Line::styled("Your private space for growth and reflection.", Styles::dim()),
            r[2],
            buf,
        );

        let busy = app.select.status.is_loading();
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(r[4]);
        Button::new("Create New Journal")
            .focused(app.select.focus == SelectButton::Create)
            .disabled(busy)
            .render(halves[0], buf);
        Button::new("Open Existing Journal")
            .focused(app.select.focus == SelectButton::Open)
            .disabled(busy)
            .render(halves[1], buf);

        if busy {
            render_centered(
                Line::styled(
                    format!("{} Waiting for the file picker...", spinner(app.tick)),
                    Styles::active(),
                ),
                r[6],
                buf,
            );
        } else if let Some(message) = app.select.status.error() {
            render_error(message, r[6], buf);
        }

        render_recent(app, r[7], buf);
    }
}

fn render_recent(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title(" Recent journal ")
        .title_style(Styles::dim())
        .borders(Borders::ALL)
        .border_style(Styles::border());
    let inner = block.inner(area);
    block.render(area, buf);

    let history = &app.history;
    if history.is_empty() {
        Paragraph::new(Line::styled("No recent journals", Styles::dim())).render(inner, buf);
        return;
    }

    let width = usize::from(inner.width);
    let mut lines = Vec::new();
    if let Some(name) = &history.name {
        lines.push(Line::styled(truncate_to_width(name, width), Styles::highlight()));
    }
    if let Some(path) = &history.path {
        lines.push(Line::styled(truncate_path_start(path, width), Styles::dim()));
    }
    if let Some(opened) = history.last_opened {
        lines.push(Line::from(vec![
            Span::styled("Last opened ", Styles::dim()),
            Span::styled(
                opened.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
                Styles::default(),
            ),
        ]));
    }
    Paragraph::new(lines).render(inner, buf);
}
