//! Per-screen state and the rules that turn backend answers into feedback.
//!
//! Each screen owns one of these; nothing here is shared across screens.
//! A form goes idle -> loading -> succeeded | failed, and back to idle when
//! the user edits or resubmits.

use crate::ui::widgets::PasswordInputState;
use iterate_bridge::{check_new_password, JournalError, Password};

/// Fallback for create errors that carry no message.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// Shown when the backend rejects an unlock password.
pub const WRONG_PASSWORD: &str = "Password is wrong";

/// Shown when unlock is attempted with no journal selected.
pub const NO_JOURNAL_SELECTED: &str = "No journal is selected. Open a journal first.";

/// Where a form wants the app to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Stay on the current screen.
    Stay,
    /// Back to journal selection.
    Home,
    /// On to the unlock screen for the given journal.
    Unlock(String),
}

/// Lifecycle of a screen's single backend request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Loading,
    Failed(String),
    Succeeded,
}

impl FormStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Message to show inline, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Buttons on the journal selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectButton {
    #[default]
    Create,
    Open,
}

/// State of the journal selection screen.
#[derive(Debug, Clone, Default)]
pub struct SelectState {
    pub focus: SelectButton,
    pub status: FormStatus,
    /// Sequence number of the request being waited on.
    pub in_flight: Option<u64>,
}

impl SelectState {
    /// Start an `open_journal_file` request. Returns false if one is in flight.
    pub fn begin_open(&mut self) -> bool {
        if self.status.is_loading() {
            return false;
        }
        self.status = FormStatus::Loading;
        true
    }

    /// Apply the answer to `open_journal_file`.
    pub fn complete_open(&mut self, result: Result<String, JournalError>) -> Navigation {
        match result {
            Ok(path) => {
                self.status = FormStatus::Idle;
                Navigation::Unlock(path)
            }
            Err(JournalError::Cancelled) => {
                self.status = FormStatus::Idle;
                Navigation::Stay
            }
            Err(JournalError::InternalError(message)) => {
                self.status = FormStatus::Failed(format!("System error: {message}"));
                Navigation::Stay
            }
            Err(other) => {
                self.status = FormStatus::Failed(format!("System error: {other}"));
                Navigation::Stay
            }
        }
    }
}

/// Fields on the create screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateField {
    #[default]
    Password,
    Confirm,
}

/// State of the create-journal screen.
#[derive(Debug, Clone, Default)]
pub struct CreateJournalForm {
    pub password: PasswordInputState,
    pub confirm: PasswordInputState,
    pub focus: CreateField,
    pub status: FormStatus,
    pub in_flight: Option<u64>,
}

impl CreateJournalForm {
    /// The field with focus.
    pub fn focused_field(&mut self) -> &mut PasswordInputState {
        match self.focus {
            CreateField::Password => &mut self.password,
            CreateField::Confirm => &mut self.confirm,
        }
    }

    /// Move focus to the other field.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            CreateField::Password => CreateField::Confirm,
            CreateField::Confirm => CreateField::Password,
        };
    }

    /// Validate and, if valid, produce the password to send.
    ///
    /// A rejected submission clears both fields and shows why. Nothing is
    /// produced while a request is already in flight.
    pub fn submit(&mut self) -> Option<Password> {
        if self.status.is_loading() {
            return None;
        }

        if let Err(violation) = check_new_password(self.password.content(), self.confirm.content()) {
            self.clear();
            self.status = FormStatus::Failed(violation.to_string());
            return None;
        }

        let password = Password::from_text(self.password.content());
        self.status = FormStatus::Loading;
        Some(password)
    }

    /// Apply the answer to `create_journal`.
    pub fn complete(&mut self, result: Result<(), JournalError>) -> Navigation {
        match result {
            Ok(()) => {
                self.clear();
                self.status = FormStatus::Succeeded;
                Navigation::Home
            }
            Err(JournalError::Cancelled) => {
                self.status = FormStatus::Idle;
                Navigation::Stay
            }
            Err(err) => {
                let message = match err.message() {
                    Some(m) if !m.is_empty() => m.to_string(),
                    _ => UNEXPECTED_ERROR.to_string(),
                };
                self.status = FormStatus::Failed(message);
                Navigation::Stay
            }
        }
    }

    /// Wipe both fields and return focus to the first.
    pub fn clear(&mut self) {
        self.password.clear();
        self.confirm.clear();
        self.focus = CreateField::Password;
    }
}

/// State of the unlock screen.
#[derive(Debug, Clone, Default)]
pub struct UnlockForm {
    pub password: PasswordInputState,
    pub status: FormStatus,
    pub in_flight: Option<u64>,
}

impl UnlockForm {
    /// Take the entered password for an unlock request.
    ///
    /// The field is cleared before the request goes out. An empty field or
    /// a request already in flight produces nothing.
    pub fn submit(&mut self) -> Option<Password> {
        if self.status.is_loading() || self.password.is_empty() {
            return None;
        }
        let password = self.password.take_password();
        self.status = FormStatus::Loading;
        Some(password)
    }

    /// Apply the answer to `unlock_journal`.
    pub fn complete(&mut self, result: Result<(), JournalError>) -> Navigation {
        match result {
            Ok(()) => {
                self.password.clear();
                self.status = FormStatus::Succeeded;
                Navigation::Stay
            }
            Err(JournalError::Cancelled) => {
                self.status = FormStatus::Idle;
                Navigation::Home
            }
            Err(JournalError::InvalidPassword) => {
                self.status = FormStatus::Failed(WRONG_PASSWORD.to_string());
                Navigation::Stay
            }
            Err(JournalError::InvalidState) => {
                self.status = FormStatus::Failed(NO_JOURNAL_SELECTED.to_string());
                Navigation::Stay
            }
            Err(JournalError::InternalError(message)) => {
                self.status = FormStatus::Failed(message);
                Navigation::Stay
            }
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.status == FormStatus::Succeeded
    }
}
