//! The contract the screens rely on from the journal backend.

use crate::error::JournalError;
use crate::password::Password;
use async_trait::async_trait;

/// Remote journal backend.
///
/// Each call is independent; implementations may run several at once and
/// give no ordering guarantee between them.
#[async_trait]
pub trait JournalBackend: Send + Sync {
    /// Create a new journal protected by `password`.
    ///
    /// The backend chooses the file location (usually via a save dialog) and
    /// reports `Cancelled` if the user backs out.
    async fn create_journal(&self, password: Password) -> Result<(), JournalError>;

    /// Unlock the currently selected journal.
    async fn unlock_journal(&self, password: Password) -> Result<(), JournalError>;

    /// Ask the backend to pick a journal file. Returns the chosen path.
    async fn open_journal_file(&self) -> Result<String, JournalError>;
}
