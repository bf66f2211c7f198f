//! Password prompt for the selected journal.

use super::{render_card, render_error, Screen};
use crate::app::App;
use crate::forms::FormStatus;
use crate::text::truncate_path_start;
use crate::ui::rows;
use crate::ui::theme::{spinner, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const CARD_HEIGHT: u16 = 9;

/// Screen for unlocking an existing journal.
pub struct UnlockJournalScreen;

impl Screen for UnlockJournalScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let form = &app.unlock;
        let inner = render_card("Unlock journal", area, CARD_HEIGHT, buf);
        let r = rows(inner, &[1, 1, 3, 2]);

        let label = "Journal: ";
        let journal = match &app.selected_journal {
            Some(path) => Span::styled(
                truncate_path_start(path, usize::from(r[0].width).saturating_sub(label.len())),
                Styles::highlight(),
            ),
            None => Span::styled("none selected", Styles::dim()),
        };
        Paragraph::new(Line::from(vec![Span::styled(label, Styles::dim()), journal]))
            .render(r[0], buf);

        form.password
            .widget("Journal password")
            .focused(!form.is_unlocked())
            .disabled(form.status.is_loading() || form.is_unlocked())
            .render(r[2], buf);

        match &form.status {
            FormStatus::Idle => {}
            FormStatus::Loading => {
                Paragraph::new(Line::styled(
                    format!("{} Unlocking...", spinner(app.tick)),
                    Styles::active(),
                ))
                .render(r[3], buf);
            }
            FormStatus::Succeeded => {
                Paragraph::new(Line::styled("Journal unlocked.", Styles::success()))
                    .render(r[3], buf);
            }
            FormStatus::Failed(message) => render_error(message, r[3], buf),
        }
    }
}
