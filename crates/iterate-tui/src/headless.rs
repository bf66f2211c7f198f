//! Headless mode for the iterate TUI.
//!
//! This module provides a way to run the TUI without a real terminal,
//! enabling E2E testing and automation. Keys and actions are sent via
//! channels and screen state is captured after each render.

use crate::app::{App, Route};
use crate::event::Action;
use crate::screens::render_app;
use crate::tasks::BackendTasks;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use iterate_bridge::{JournalBackend, SettingsStore};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Current screen being displayed.
    pub route: Route,
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the TUI should quit.
    pub should_quit: bool,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Journal chosen through the file picker.
    pub selected_journal: Option<String>,
}

enum Input {
    Key(KeyEvent),
    Action(Action),
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    input_tx: mpsc::UnboundedSender<Input>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send an action to the TUI.
    ///
    /// Returns `true` if the action was sent successfully.
    pub fn send_action(&self, action: Action) -> bool {
        self.input_tx.send(Input::Action(action)).is_ok()
    }

    /// Send a raw key press, as typed into the terminal.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.input_tx.send(Input::Key(key)).is_ok()
    }

    /// Type `text` followed by nothing else.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars()
            .all(|ch| self.send_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(
        &mut self,
        condition: F,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            if tokio::time::timeout(remaining, self.state_rx.changed())
                .await
                .is_err()
            {
                return None;
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(
        &mut self,
        text: &str,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        let text = text.to_string();
        self.wait_for(|s| s.screen_contents.contains(&text), timeout)
            .await
    }

    /// Wait for a specific screen to be displayed.
    pub async fn wait_for_route(
        &mut self,
        route: Route,
        timeout: std::time::Duration,
    ) -> Option<HeadlessState> {
        self.wait_for(|s| s.route == route, timeout).await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50,
        }
    }
}

/// Run the TUI in headless mode.
///
/// Returns a handle to control the TUI and a join handle for the background task.
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(ScriptedBackend::demo("/j/home.db", "hunter22"));
/// let (mut handle, task) = run_tui_headless(backend, None, HeadlessConfig::default());
///
/// handle.send_action(Action::OpenJournal);
/// handle.wait_for_route(Route::UnlockJournal, Duration::from_secs(1)).await;
///
/// handle.send_action(Action::Quit);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    backend: Arc<dyn JournalBackend>,
    settings: Option<SettingsStore>,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(backend, settings, config, input_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (HeadlessHandle { input_tx, state_rx }, task)
}

async fn run_headless_loop(
    backend: Arc<dyn JournalBackend>,
    settings: Option<SettingsStore>,
    config: HeadlessConfig,
    mut input_rx: mpsc::UnboundedReceiver<Input>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut terminal = Terminal::new(TestBackend::new(config.width, config.height))?;
    let mut app = App::new(settings);
    let mut tasks = BackendTasks::new(backend);
    let tick_duration = std::time::Duration::from_millis(config.tick_rate_ms);

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            render_app(&app, area, frame.buffer_mut());
        })?;

        let _ = state_tx.send(HeadlessState {
            route: app.route,
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
            show_help: app.show_help,
            selected_journal: app.selected_journal.clone(),
        });

        if app.should_quit {
            break;
        }

        tasks.spawn_pending(&mut app);
        tasks.collect_finished(&mut app).await;

        let input = tokio::select! {
            Some(input) = input_rx.recv() => Some(input),
            () = tokio::time::sleep(tick_duration) => None,
        };

        match input {
            Some(Input::Key(key)) => app.handle_key(key),
            Some(Input::Action(action)) => app.handle_action(action),
            None => app.tick(),
        }
    }

    tasks.abort_all();
    Ok(())
}

/// Convert a terminal buffer to a string representation.
fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use iterate_bridge::{Call, JournalError, Password, ScriptedBackend};
    use std::time::Duration;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(2);

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)
    }

    #[test]
    fn test_headless_state_default() {
        let state = HeadlessState::default();
        assert_eq!(state.route, Route::JournalSelect);
        assert!(!state.should_quit);
        assert!(state.screen_contents.is_empty());
    }

    #[test]
    fn test_headless_config_default() {
        let config = HeadlessConfig::default();
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(config.tick_rate_ms, 50);
    }

    #[tokio::test]
    async fn test_open_and_unlock_end_to_end() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsStore::load(dir.path().join("last_use.json")).unwrap();
        let backend = Arc::new(ScriptedBackend::demo("/journals/home.db", "hunter22"));
        let (mut handle, task) =
            run_tui_headless(backend.clone(), Some(settings), HeadlessConfig::default());

        handle.wait_for_text("Welcome to Iterate", WAIT).await.unwrap();
        handle.send_action(Action::OpenJournal);
        let state = handle.wait_for_route(Route::UnlockJournal, WAIT).await.unwrap();
        assert_eq!(state.selected_journal.as_deref(), Some("/journals/home.db"));

        handle.type_text("wrong-one");
        handle.send_key(enter());
        handle.wait_for_text("Password is wrong", WAIT).await.unwrap();

        handle.type_text("hunter22");
        handle.send_key(enter());
        handle.wait_for_text("Journal unlocked.", WAIT).await.unwrap();

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                Call::OpenJournalFile,
                Call::UnlockJournal(Password::from_text("wrong-one")),
                Call::UnlockJournal(Password::from_text("hunter22")),
            ]
        );

        let reloaded = SettingsStore::load(dir.path().join("last_use.json")).unwrap();
        assert_eq!(reloaded.history().name.as_deref(), Some("home"));
    }

    #[tokio::test]
    async fn test_create_journal_end_to_end() {
        let backend = Arc::new(ScriptedBackend::new());
        let (mut handle, task) =
            run_tui_headless(backend.clone(), None, HeadlessConfig::default());

        handle.send_action(Action::CreateJournal);
        handle.wait_for_text("Choose your master password", WAIT).await.unwrap();

        handle.type_text("short");
        handle.send_action(Action::NextField);
        handle.type_text("short");
        handle.send_key(enter());
        handle
            .wait_for_text("Password must be at least 8 characters.", WAIT)
            .await
            .unwrap();

        handle.type_text("long enough");
        handle.send_action(Action::NextField);
        handle.type_text("long enough");
        handle.send_key(enter());
        handle.wait_for_route(Route::JournalSelect, WAIT).await.unwrap();
        assert!(!handle.has_quit());

        handle.send_action(Action::Quit);
        handle.wait_for(|s| s.should_quit, WAIT).await.unwrap();
        assert!(handle.has_quit());
        task.await.unwrap().unwrap();

        assert_eq!(
            backend.calls(),
            vec![Call::CreateJournal(Password::from_text("long enough"))]
        );
    }

    #[tokio::test]
    async fn test_open_cancel_stays_on_select() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_open(Err(JournalError::Cancelled));
        let (mut handle, task) =
            run_tui_headless(backend.clone(), None, HeadlessConfig::default());

        handle.send_action(Action::OpenJournal);
        handle
            .wait_for(|_| backend.calls().len() == 1, WAIT)
            .await
            .unwrap();
        // Let the response land
        tokio::time::sleep(Duration::from_millis(200)).await;

        let state = handle.state();
        assert_eq!(state.route, Route::JournalSelect);
        assert!(!state.screen_contents.contains("System error"));

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[test]
    fn test_buffer_to_string() {
        use ratatui::layout::Rect;
        use ratatui::style::Style;

        let area = Rect::new(0, 0, 10, 2);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", Style::default());
        buffer.set_string(0, 1, "World", Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld");
    }
}
