//! In-memory backend for tests and the demo mode.
//!
//! Replies can be queued per call; once a queue is empty the backend falls
//! back to a small simulation: `create_journal` remembers the password,
//! `open_journal_file` hands out the configured path, and `unlock_journal`
//! compares against the remembered password.

use crate::backend::JournalBackend;
use crate::error::JournalError;
use crate::password::Password;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A call observed by the scripted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateJournal(Password),
    UnlockJournal(Password),
    OpenJournalFile,
}

#[derive(Debug, Default)]
struct Script {
    create: VecDeque<Result<(), JournalError>>,
    unlock: VecDeque<Result<(), JournalError>>,
    open: VecDeque<Result<String, JournalError>>,
    calls: Vec<Call>,
    journal_path: Option<String>,
    selected: Option<String>,
    password: Option<Password>,
}

/// Scripted [`JournalBackend`].
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    delay: Duration,
}

impl ScriptedBackend {
    /// Create an empty scripted backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend used by `iterate demo`: one journal at `path` with `password`.
    pub fn demo(path: impl Into<String>, password: &str) -> Self {
        let backend = Self::new().with_journal_path(path);
        backend.lock().password = Some(Password::from_text(password));
        backend
    }

    /// Path returned by `open_journal_file` when no reply is queued.
    #[must_use]
    pub fn with_journal_path(self, path: impl Into<String>) -> Self {
        self.lock().journal_path = Some(path.into());
        self
    }

    /// Delay every call by `delay`, to observe loading states.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue the next `create_journal` reply.
    pub fn push_create(&self, reply: Result<(), JournalError>) {
        self.lock().create.push_back(reply);
    }

    /// Queue the next `unlock_journal` reply.
    pub fn push_unlock(&self, reply: Result<(), JournalError>) {
        self.lock().unlock.push_back(reply);
    }

    /// Queue the next `open_journal_file` reply.
    pub fn push_open(&self, reply: Result<String, JournalError>) {
        self.lock().open.push_back(reply);
    }

    /// All calls received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl JournalBackend for ScriptedBackend {
    async fn create_journal(&self, password: Password) -> Result<(), JournalError> {
        self.pause().await;
        let script = &mut *self.lock();
        script.calls.push(Call::CreateJournal(password.clone()));
        if let Some(reply) = script.create.pop_front() {
            return reply;
        }
        script.password = Some(password);
        script.selected.clone_from(&script.journal_path);
        Ok(())
    }

    async fn unlock_journal(&self, password: Password) -> Result<(), JournalError> {
        self.pause().await;
        let script = &mut *self.lock();
        script.calls.push(Call::UnlockJournal(password.clone()));
        if let Some(reply) = script.unlock.pop_front() {
            return reply;
        }
        if script.selected.is_none() {
            return Err(JournalError::InvalidState);
        }
        match &script.password {
            Some(expected) if *expected == password => Ok(()),
            _ => Err(JournalError::InvalidPassword),
        }
    }

    async fn open_journal_file(&self) -> Result<String, JournalError> {
        self.pause().await;
        let script = &mut *self.lock();
        script.calls.push(Call::OpenJournalFile);
        let reply = match script.open.pop_front() {
            Some(reply) => reply,
            None => script.journal_path.clone().ok_or(JournalError::Cancelled),
        };
        if let Ok(path) = &reply {
            script.selected = Some(path.clone());
        }
        reply
    }
}
