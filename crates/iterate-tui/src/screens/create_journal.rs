//! Master password entry for a new journal.

use super::{render_card, render_error, Screen};
use crate::app::App;
use crate::forms::CreateField;
use crate::text::wrap_styled;
use crate::ui::theme::Styles;
use crate::ui::{rows, Button};
use iterate_bridge::MIN_PASSWORD_LENGTH;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

const CARD_HEIGHT: u16 = 17;

const WARNING: &str = "There is no way to recover a forgotten password. \
                       If you lose it, your journal is permanently inaccessible.";

/// Screen for choosing the master password.
pub struct CreateJournalScreen;

impl Screen for CreateJournalScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let form = &app.create;
        let loading = form.status.is_loading();

        let inner = render_card("Choose your master password", area, CARD_HEIGHT, buf);
        let r = rows(inner, &[1, 1, 4, 3, 3, 2, 1]);

        Paragraph::new(Line::styled(
            "This password encrypts your journal.",
            Styles::dim(),
        ))
        .render(r[0], buf);

        let attention = Block::default()
            .title(" Attention ")
            .title_style(Styles::error())
            .borders(Borders::ALL)
            .border_style(Styles::border_error());
        let warning_area = attention.inner(r[2]);
        attention.render(r[2], buf);
        Paragraph::new(wrap_styled(
            WARNING,
            usize::from(warning_area.width),
            "",
            Styles::default(),
        ))
        .render(warning_area, buf);

        let placeholder = format!("At least {MIN_PASSWORD_LENGTH} characters");
        form.password
            .widget("Master password")
            .focused(form.focus == CreateField::Password)
            .placeholder(&placeholder)
            .disabled(loading)
            .render(r[3], buf);
        form.confirm
            .widget("Confirm password")
            .focused(form.focus == CreateField::Confirm)
            .placeholder("Type it again")
            .disabled(loading)
            .render(r[4], buf);

        if let Some(message) = form.status.error() {
            render_error(message, r[5], buf);
        }

        Button::new(if loading { "Creating..." } else { "Confirm" })
            .focused(!loading)
            .disabled(loading)
            .render(r[6], buf);
    }
}
