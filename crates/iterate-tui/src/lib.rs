//! iterate-tui: Terminal UI for the Iterate journal
//!
//! This crate provides the presentation layer, including:
//! - Journal selection with the last-used journal
//! - Master password creation with client-side checks
//! - Unlocking an existing journal
//! - Headless mode for testing and automation

mod app;
mod event;
mod forms;
pub mod headless;
mod screens;
mod tasks;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;

pub use app::{App, BackendCall, BackendReply, BackendRequest, BackendResponse, Route};
pub use event::{Action, Event, EventHandler};
pub use forms::{CreateJournalForm, FormStatus, SelectState, UnlockForm};
pub use iterate_bridge;

use crossterm::{
    cursor::Show as ShowCursor,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use iterate_bridge::{JournalBackend, SettingsStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tasks::BackendTasks;
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(
    backend: Arc<dyn JournalBackend>,
    settings: Option<SettingsStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(settings);
    let mut tasks = BackendTasks::new(backend);

    // 4 Hz tick rate
    let mut events = EventHandler::new(250);

    info!("tui started");
    let result = run_loop(&mut terminal, &mut app, &mut tasks, &mut events).await;
    if !tasks.is_empty() {
        info!(in_flight = tasks.len(), "aborting unfinished backend calls");
    }
    tasks.abort_all();
    info!("tui stopped");

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tasks: &mut BackendTasks,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::render_app(app, area, frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => app.handle_key(key),
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {}
            }
        }

        tasks.spawn_pending(app);
        tasks.collect_finished(app).await;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
