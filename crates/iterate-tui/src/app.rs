//! Application state and update logic for the iterate TUI.
//!
//! The app never talks to the backend directly. Screens queue a
//! [`BackendRequest`]; the event loop takes it, runs it on the runtime and
//! hands the [`BackendResponse`] back through [`App::handle_response`].

use crate::event::{field_key_to_action, key_to_action, Action};
use crate::forms::{CreateJournalForm, Navigation, SelectButton, SelectState, UnlockForm};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use iterate_bridge::{JournalBackend, JournalError, JournalReference, Password, SettingsStore};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    JournalSelect,
    CreateJournal,
    UnlockJournal,
}

impl Route {
    /// Name shown in the status bar.
    pub fn title(self) -> &'static str {
        match self {
            Self::JournalSelect => "Journals",
            Self::CreateJournal => "Create",
            Self::UnlockJournal => "Unlock",
        }
    }
}

/// A backend call a screen wants made.
#[derive(Debug)]
pub enum BackendCall {
    CreateJournal(Password),
    UnlockJournal(Password),
    OpenJournalFile,
}

impl BackendCall {
    /// Command name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateJournal(_) => "create_journal",
            Self::UnlockJournal(_) => "unlock_journal",
            Self::OpenJournalFile => "open_journal_file",
        }
    }

    /// The screen making the call.
    fn route(&self) -> Route {
        match self {
            Self::CreateJournal(_) => Route::CreateJournal,
            Self::UnlockJournal(_) => Route::UnlockJournal,
            Self::OpenJournalFile => Route::JournalSelect,
        }
    }
}

/// A queued call, numbered so its answer can be matched to it.
#[derive(Debug)]
pub struct BackendRequest {
    pub seq: u64,
    pub call: BackendCall,
}

impl BackendRequest {
    /// Command name, for logs.
    pub fn name(&self) -> &'static str {
        self.call.name()
    }

    /// Run the request against `backend`.
    pub async fn dispatch(self, backend: Arc<dyn JournalBackend>) -> BackendResponse {
        let reply = match self.call {
            BackendCall::CreateJournal(password) => {
                BackendReply::JournalCreated(backend.create_journal(password).await)
            }
            BackendCall::UnlockJournal(password) => {
                BackendReply::JournalUnlocked(backend.unlock_journal(password).await)
            }
            BackendCall::OpenJournalFile => {
                BackendReply::JournalFileOpened(backend.open_journal_file().await)
            }
        };
        BackendResponse {
            seq: self.seq,
            reply,
        }
    }
}

/// What the backend said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    JournalCreated(Result<(), JournalError>),
    JournalUnlocked(Result<(), JournalError>),
    JournalFileOpened(Result<String, JournalError>),
}

impl BackendReply {
    /// The screen that asked for this reply.
    fn route(&self) -> Route {
        match self {
            Self::JournalCreated(_) => Route::CreateJournal,
            Self::JournalUnlocked(_) => Route::UnlockJournal,
            Self::JournalFileOpened(_) => Route::JournalSelect,
        }
    }
}

/// The answer to the [`BackendRequest`] numbered `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendResponse {
    pub seq: u64,
    pub reply: BackendReply,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether to show the help overlay.
    pub show_help: bool,

    /// Current screen.
    pub route: Route,

    /// Tick counter for animations.
    pub tick: usize,

    /// Journal chosen through `open_journal_file`, if any.
    pub selected_journal: Option<String>,

    /// Last-used journal as recorded in the settings store.
    pub history: JournalReference,

    pub select: SelectState,
    pub create: CreateJournalForm,
    pub unlock: UnlockForm,

    /// Notification message to display temporarily.
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    settings: Option<SettingsStore>,
    outbox: VecDeque<BackendRequest>,
    last_seq: u64,
}

impl App {
    /// Create the app. Without a settings store nothing is remembered
    /// between runs.
    pub fn new(settings: Option<SettingsStore>) -> Self {
        let history = settings
            .as_ref()
            .map(SettingsStore::history)
            .unwrap_or_default();

        Self {
            should_quit: false,
            show_help: false,
            route: Route::default(),
            tick: 0,
            selected_journal: None,
            history,
            select: SelectState::default(),
            create: CreateJournalForm::default(),
            unlock: UnlockForm::default(),
            notification: None,
            notification_ttl: 0,
            settings,
            outbox: VecDeque::new(),
            last_seq: 0,
        }
    }

    /// Handle a key press, routing printable keys into the focused field on
    /// the password screens.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.route {
            Route::JournalSelect => self.handle_action(key_to_action(key)),
            Route::CreateJournal | Route::UnlockJournal => match field_key_to_action(key) {
                Some(action) => self.handle_action(action),
                None => self.edit_field(key),
            },
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // Any key closes the help overlay
        if self.show_help {
            self.show_help = false;
            if action != Action::Quit {
                return;
            }
        }

        if action == Action::Quit {
            self.quit();
            return;
        }

        match self.route {
            Route::JournalSelect => self.handle_select_action(action),
            Route::CreateJournal => self.handle_create_action(action),
            Route::UnlockJournal => self.handle_unlock_action(action),
        }
    }

    fn handle_select_action(&mut self, action: Action) {
        match action {
            Action::Help => self.show_help = true,
            Action::CreateJournal => self.navigate(Route::CreateJournal),
            Action::OpenJournal => self.open_journal(),
            Action::Up | Action::Down | Action::NextField | Action::PrevField => {
                self.select.focus = match self.select.focus {
                    SelectButton::Create => SelectButton::Open,
                    SelectButton::Open => SelectButton::Create,
                };
            }
            Action::Select => match self.select.focus {
                SelectButton::Create => self.navigate(Route::CreateJournal),
                SelectButton::Open => self.open_journal(),
            },
            Action::Back | Action::Quit | Action::None => {}
        }
    }

    fn handle_create_action(&mut self, action: Action) {
        match action {
            Action::Back => self.navigate(Route::JournalSelect),
            Action::NextField | Action::PrevField | Action::Up | Action::Down => {
                self.create.toggle_focus();
            }
            Action::Select => {
                if self.create.focus == crate::forms::CreateField::Password
                    && self.create.confirm.is_empty()
                {
                    self.create.toggle_focus();
                } else if let Some(password) = self.create.submit() {
                    self.enqueue(BackendCall::CreateJournal(password));
                }
            }
            _ => {}
        }
    }

    fn handle_unlock_action(&mut self, action: Action) {
        match action {
            Action::Back => self.navigate(Route::JournalSelect),
            Action::Select => {
                if let Some(password) = self.unlock.submit() {
                    self.enqueue(BackendCall::UnlockJournal(password));
                }
            }
            _ => {}
        }
    }

    fn open_journal(&mut self) {
        if self.select.begin_open() {
            self.enqueue(BackendCall::OpenJournalFile);
        }
    }

    /// Feed a non-command key into the focused password field.
    fn edit_field(&mut self, key: KeyEvent) {
        let field = match self.route {
            Route::CreateJournal if !self.create.status.is_loading() => {
                self.create.focused_field()
            }
            Route::UnlockJournal if !self.unlock.status.is_loading() => &mut self.unlock.password,
            _ => return,
        };

        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                field.insert(c);
            }
            KeyCode::Backspace => field.backspace(),
            KeyCode::Delete => field.delete(),
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Home => field.move_home(),
            KeyCode::End => field.move_end(),
            _ => {}
        }
    }

    /// Switch screens. The target screen starts from a clean state, which
    /// forgets any request it still had in flight.
    pub fn navigate(&mut self, route: Route) {
        debug!(from = ?self.route, to = ?route, "navigate");
        match self.route {
            Route::CreateJournal => self.create.clear(),
            Route::UnlockJournal => self.unlock.password.clear(),
            Route::JournalSelect => {}
        }
        match route {
            Route::JournalSelect => self.select = SelectState::default(),
            Route::CreateJournal => self.create = CreateJournalForm::default(),
            Route::UnlockJournal => self.unlock = UnlockForm::default(),
        }
        self.route = route;
    }

    fn quit(&mut self) {
        self.create.clear();
        self.unlock.password.clear();
        self.should_quit = true;
    }

    fn enqueue(&mut self, call: BackendCall) {
        self.last_seq += 1;
        let seq = self.last_seq;
        *self.in_flight_mut(call.route()) = Some(seq);
        debug!(seq, command = call.name(), "queued backend request");
        self.outbox.push_back(BackendRequest { seq, call });
    }

    /// The request a screen is waiting on.
    fn in_flight_mut(&mut self, route: Route) -> &mut Option<u64> {
        match route {
            Route::JournalSelect => &mut self.select.in_flight,
            Route::CreateJournal => &mut self.create.in_flight,
            Route::UnlockJournal => &mut self.unlock.in_flight,
        }
    }

    /// Take the next request for the event loop to run.
    pub fn take_request(&mut self) -> Option<BackendRequest> {
        self.outbox.pop_front()
    }

    /// Whether the current screen is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        match self.route {
            Route::JournalSelect => self.select.status.is_loading(),
            Route::CreateJournal => self.create.status.is_loading(),
            Route::UnlockJournal => self.unlock.status.is_loading(),
        }
    }

    /// Apply a completed backend call.
    ///
    /// Only the answer to the request the current screen is waiting on is
    /// applied. Anything else is dropped.
    pub fn handle_response(&mut self, response: BackendResponse) {
        let BackendResponse { seq, reply } = response;
        let route = reply.route();
        let current = self.route;
        let in_flight = self.in_flight_mut(route);
        if route != current || *in_flight != Some(seq) {
            debug!(seq, ?route, ?current, "dropping stale backend response");
            return;
        }
        *in_flight = None;

        let navigation = match reply {
            BackendReply::JournalCreated(result) => {
                let ok = result.is_ok();
                let nav = self.create.complete(result);
                if ok {
                    info!("journal created");
                    self.set_notification("Journal created".to_string());
                }
                nav
            }
            BackendReply::JournalUnlocked(result) => {
                if result.is_ok() {
                    info!(journal = ?self.selected_journal, "journal unlocked");
                }
                self.unlock.complete(result)
            }
            BackendReply::JournalFileOpened(result) => self.select.complete_open(result),
        };

        match navigation {
            Navigation::Stay => {}
            Navigation::Home => self.navigate(Route::JournalSelect),
            Navigation::Unlock(path) => {
                self.remember_journal(&path);
                self.selected_journal = Some(path);
                self.navigate(Route::UnlockJournal);
            }
        }
    }

    fn remember_journal(&mut self, path: &str) {
        let Some(settings) = self.settings.as_mut() else {
            return;
        };
        match settings.record_last_use(path, Utc::now()) {
            Ok(()) => self.history = settings.history(),
            Err(e) => warn!(error = %e, "failed to record last-used journal"),
        }
    }

    /// Set a temporary notification message.
    fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        // ~3 seconds at 4 Hz
        self.notification_ttl = 12;
    }

    /// Increment tick counter and update time-based state.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }

    /// App with no settings store, for tests.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{FormStatus, NO_JOURNAL_SELECTED, WRONG_PASSWORD};
    use crate::test_utils::{key, respond, type_text};
    use iterate_bridge::{Call, ScriptedBackend};
    use tempfile::TempDir;

    fn create_screen(password: &str, confirm: &str) -> App {
        let mut app = App::new_for_test();
        app.handle_action(Action::CreateJournal);
        type_text(&mut app, password);
        app.handle_action(Action::NextField);
        type_text(&mut app, confirm);
        app
    }

    #[test]
    fn test_starts_on_journal_select() {
        let app = App::new_for_test();
        assert_eq!(app.route, Route::JournalSelect);
        assert!(app.history.is_empty());
    }

    #[test]
    fn test_create_button_navigates() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Select);
        assert_eq!(app.route, Route::CreateJournal);
        assert!(app.take_request().is_none());
    }

    #[test]
    fn test_open_button_queues_request() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Down);
        app.handle_action(Action::Select);
        let request = app.take_request().unwrap();
        assert!(matches!(request.call, BackendCall::OpenJournalFile));
        assert_eq!(app.select.in_flight, Some(request.seq));

        // Still waiting, so a second press does nothing
        app.handle_action(Action::OpenJournal);
        assert!(app.take_request().is_none());
    }

    #[test]
    fn test_requests_are_numbered_in_order() {
        let mut app = App::new_for_test();
        app.handle_action(Action::OpenJournal);
        let first = app.take_request().unwrap();
        app.handle_response(BackendResponse {
            seq: first.seq,
            reply: BackendReply::JournalFileOpened(Err(JournalError::Cancelled)),
        });
        assert_eq!(app.select.in_flight, None);

        app.handle_action(Action::OpenJournal);
        let second = app.take_request().unwrap();
        assert!(second.seq > first.seq);
    }

    #[test]
    fn test_create_invalid_sends_nothing() {
        let mut app = create_screen("short", "short");
        app.handle_action(Action::Select);
        assert!(app.take_request().is_none());
        assert_eq!(
            app.create.status.error(),
            Some("Password must be at least 8 characters.")
        );
        assert!(app.create.password.is_empty());
        assert!(app.create.confirm.is_empty());
        assert_eq!(app.create.in_flight, None);
    }

    #[test]
    fn test_create_success_returns_home() {
        let mut app = create_screen("correct horse", "correct horse");
        app.handle_action(Action::Select);
        let request = app.take_request().unwrap();
        match &request.call {
            BackendCall::CreateJournal(p) => assert_eq!(p.as_bytes(), b"correct horse"),
            other => panic!("unexpected call: {other:?}"),
        }
        assert!(app.is_busy());

        app.handle_response(BackendResponse {
            seq: request.seq,
            reply: BackendReply::JournalCreated(Ok(())),
        });
        assert_eq!(app.route, Route::JournalSelect);
        assert_eq!(app.notification.as_deref(), Some("Journal created"));
    }

    #[test]
    fn test_create_cancel_stays_silent() {
        let mut app = create_screen("correct horse", "correct horse");
        app.handle_action(Action::Select);
        respond(&mut app, BackendReply::JournalCreated(Err(JournalError::Cancelled)));
        assert_eq!(app.route, Route::CreateJournal);
        assert_eq!(app.create.status, FormStatus::Idle);
    }

    #[test]
    fn test_enter_on_first_field_moves_to_confirm() {
        let mut app = App::new_for_test();
        app.handle_action(Action::CreateJournal);
        type_text(&mut app, "correct horse");
        app.handle_action(Action::Select);
        assert_eq!(app.create.focus, crate::forms::CreateField::Confirm);
        assert!(app.take_request().is_none());
    }

    #[test]
    fn test_open_then_unlock_flow() {
        let mut app = App::new_for_test();
        app.handle_action(Action::OpenJournal);
        respond(&mut app, BackendReply::JournalFileOpened(Ok("/j/home.db".into())));
        assert_eq!(app.route, Route::UnlockJournal);
        assert_eq!(app.selected_journal.as_deref(), Some("/j/home.db"));

        type_text(&mut app, "hunter22");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.unlock.password.is_empty());
        let request = app.take_request().unwrap();
        assert!(matches!(request.call, BackendCall::UnlockJournal(_)));

        app.handle_response(BackendResponse {
            seq: request.seq,
            reply: BackendReply::JournalUnlocked(Err(JournalError::InvalidPassword)),
        });
        assert_eq!(app.unlock.status.error(), Some(WRONG_PASSWORD));

        type_text(&mut app, "hunter23");
        app.handle_key(key(KeyCode::Enter));
        respond(&mut app, BackendReply::JournalUnlocked(Ok(())));
        assert!(app.unlock.is_unlocked());
        assert_eq!(app.route, Route::UnlockJournal);
    }

    #[test]
    fn test_unlock_cancel_returns_home() {
        let mut app = App::new_for_test();
        app.navigate(Route::UnlockJournal);
        type_text(&mut app, "whatever1");
        app.handle_action(Action::Select);
        respond(&mut app, BackendReply::JournalUnlocked(Err(JournalError::Cancelled)));
        assert_eq!(app.route, Route::JournalSelect);
    }

    #[test]
    fn test_unlock_invalid_state_message() {
        let mut app = App::new_for_test();
        app.navigate(Route::UnlockJournal);
        type_text(&mut app, "whatever1");
        app.handle_action(Action::Select);
        respond(&mut app, BackendReply::JournalUnlocked(Err(JournalError::InvalidState)));
        assert_eq!(app.unlock.status.error(), Some(NO_JOURNAL_SELECTED));
    }

    #[test]
    fn test_open_error_shows_system_error() {
        let mut app = App::new_for_test();
        app.handle_action(Action::OpenJournal);
        respond(
            &mut app,
            BackendReply::JournalFileOpened(Err(JournalError::InternalError(
                "Invalid path".into(),
            ))),
        );
        assert_eq!(app.route, Route::JournalSelect);
        assert_eq!(app.select.status.error(), Some("System error: Invalid path"));
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut app = create_screen("correct horse", "correct horse");
        app.handle_action(Action::Select);
        let old = app.take_request().unwrap();

        // User backs out before the backend answers
        app.handle_action(Action::Back);
        app.handle_response(BackendResponse {
            seq: old.seq,
            reply: BackendReply::JournalCreated(Ok(())),
        });
        assert_eq!(app.route, Route::JournalSelect);
        assert!(app.notification.is_none());

        // Returning to the screen does not resurrect the old request
        app.handle_action(Action::CreateJournal);
        app.handle_response(BackendResponse {
            seq: old.seq,
            reply: BackendReply::JournalCreated(Err(JournalError::InternalError("late".into()))),
        });
        assert_eq!(app.create.status, FormStatus::Idle);
    }

    #[test]
    fn test_late_create_answer_after_resubmit_is_dropped() {
        let mut app = create_screen("correct horse", "correct horse");
        app.handle_action(Action::Select);
        let old = app.take_request().unwrap();

        app.handle_action(Action::Back);
        app.handle_action(Action::CreateJournal);
        type_text(&mut app, "battery staple");
        app.handle_action(Action::NextField);
        type_text(&mut app, "battery staple");
        app.handle_action(Action::Select);
        let new = app.take_request().unwrap();
        assert_ne!(old.seq, new.seq);

        app.handle_response(BackendResponse {
            seq: old.seq,
            reply: BackendReply::JournalCreated(Err(JournalError::InternalError("stale".into()))),
        });
        assert!(app.create.status.is_loading());
        assert!(app.is_busy());

        // The second request is still the one being waited on
        app.handle_action(Action::Select);
        assert!(app.take_request().is_none());

        app.handle_response(BackendResponse {
            seq: new.seq,
            reply: BackendReply::JournalCreated(Ok(())),
        });
        assert_eq!(app.route, Route::JournalSelect);
        assert_eq!(app.notification.as_deref(), Some("Journal created"));
    }

    #[test]
    fn test_late_unlock_answer_for_other_journal_is_dropped() {
        let mut app = App::new_for_test();
        app.handle_action(Action::OpenJournal);
        respond(&mut app, BackendReply::JournalFileOpened(Ok("/a.db".into())));
        type_text(&mut app, "password-a");
        app.handle_action(Action::Select);
        let unlock_a = app.take_request().unwrap();
        app.handle_action(Action::Back);

        app.handle_action(Action::OpenJournal);
        respond(&mut app, BackendReply::JournalFileOpened(Ok("/b.db".into())));
        type_text(&mut app, "password-b");
        app.handle_action(Action::Select);
        let unlock_b = app.take_request().unwrap();

        app.handle_response(BackendResponse {
            seq: unlock_a.seq,
            reply: BackendReply::JournalUnlocked(Ok(())),
        });
        assert_eq!(app.selected_journal.as_deref(), Some("/b.db"));
        assert!(!app.unlock.is_unlocked());
        assert!(app.unlock.status.is_loading());

        app.handle_response(BackendResponse {
            seq: unlock_b.seq,
            reply: BackendReply::JournalUnlocked(Err(JournalError::InvalidPassword)),
        });
        assert_eq!(app.unlock.status.error(), Some(WRONG_PASSWORD));
    }

    #[test]
    fn test_typing_q_on_password_screen_is_text() {
        let mut app = App::new_for_test();
        app.navigate(Route::UnlockJournal);
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.unlock.password.len(), 1);

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert!(app.unlock.password.is_empty());
    }

    #[test]
    fn test_leaving_create_clears_fields() {
        let mut app = create_screen("correct horse", "correct");
        app.handle_action(Action::Back);
        assert!(app.create.password.is_empty());
        assert!(app.create.confirm.is_empty());
    }

    #[test]
    fn test_help_overlay_toggle() {
        let mut app = App::new_for_test();
        app.handle_action(Action::Help);
        assert!(app.show_help);
        app.handle_action(Action::CreateJournal);
        assert!(!app.show_help);
        assert_eq!(app.route, Route::JournalSelect);
    }

    #[test]
    fn test_notification_expires() {
        let mut app = App::new_for_test();
        app.set_notification("hello".into());
        for _ in 0..12 {
            app.tick();
        }
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_open_records_last_use() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::load(dir.path().join("last_use.json")).unwrap();
        let mut app = App::new(Some(store));

        app.handle_action(Action::OpenJournal);
        respond(
            &mut app,
            BackendReply::JournalFileOpened(Ok("/journals/work.db".into())),
        );

        assert_eq!(app.history.name.as_deref(), Some("work"));
        assert_eq!(app.history.path.as_deref(), Some("/journals/work.db"));

        let reloaded = SettingsStore::load(dir.path().join("last_use.json")).unwrap();
        assert_eq!(reloaded.history().path.as_deref(), Some("/journals/work.db"));
    }

    #[tokio::test]
    async fn test_dispatch_reaches_backend() {
        let backend = Arc::new(ScriptedBackend::new().with_journal_path("/j/a.db"));
        let dyn_backend: Arc<dyn JournalBackend> = backend.clone();

        let response = BackendRequest {
            seq: 7,
            call: BackendCall::OpenJournalFile,
        }
        .dispatch(dyn_backend.clone())
        .await;
        assert_eq!(
            response,
            BackendResponse {
                seq: 7,
                reply: BackendReply::JournalFileOpened(Ok("/j/a.db".into())),
            }
        );

        let response = BackendRequest {
            seq: 8,
            call: BackendCall::UnlockJournal(Password::from_text("pw")),
        }
        .dispatch(dyn_backend)
        .await;
        assert_eq!(response.seq, 8);
        assert!(matches!(response.reply, BackendReply::JournalUnlocked(Err(_))));

        assert_eq!(
            backend.calls(),
            vec![
                Call::OpenJournalFile,
                Call::UnlockJournal(Password::from_text("pw")),
            ]
        );
    }
}
