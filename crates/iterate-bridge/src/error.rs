//! Error types shared between the backend and the screens.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error reported by the journal backend for a single call.
///
/// The wire form is adjacently tagged, e.g.
/// `{"type":"InternalError","message":"The database didn't open."}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum JournalError {
    /// The user dismissed a backend dialog (file picker, save prompt).
    #[error("cancelled")]
    Cancelled,

    /// The password did not open the journal.
    #[error("password is incorrect")]
    InvalidPassword,

    /// Unlock was requested before a journal file was selected.
    #[error("no journal is selected")]
    InvalidState,

    /// Anything else; the message is meant to be shown to the user as is.
    #[error("{0}")]
    InternalError(String),
}

impl JournalError {
    /// Whether this error should be swallowed without user feedback.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The backend-provided message, if the variant carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::InternalError(message) => Some(message),
            _ => None,
        }
    }
}

/// Errors raised by the process bridge itself, before a backend answer exists.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No backend command is configured.
    #[error("no backend command configured")]
    NoCommand,

    /// Spawning the backend process failed.
    #[error("failed to start backend `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a request to the backend failed.
    #[error("backend I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A request could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The backend did not answer in time.
    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),

    /// The backend exited or closed its output.
    #[error("backend connection closed")]
    Closed,

    /// The backend answered with a value of the wrong shape.
    #[error("unexpected response from backend: {0}")]
    UnexpectedResponse(String),
}

impl From<BridgeError> for JournalError {
    fn from(err: BridgeError) -> Self {
        JournalError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form_unit_variants() {
        let json = serde_json::to_string(&JournalError::Cancelled).unwrap();
        assert_eq!(json, r#"{"type":"Cancelled"}"#);

        let parsed: JournalError = serde_json::from_str(r#"{"type":"InvalidPassword"}"#).unwrap();
        assert_eq!(parsed, JournalError::InvalidPassword);
    }

    #[test]
    fn test_wire_form_internal_error() {
        let parsed: JournalError =
            serde_json::from_str(r#"{"type":"InternalError","message":"DB Integrity failure"}"#)
                .unwrap();
        assert_eq!(
            parsed,
            JournalError::InternalError("DB Integrity failure".into())
        );
        assert_eq!(parsed.message(), Some("DB Integrity failure"));
    }

    #[test]
    fn test_bridge_error_becomes_internal_error() {
        let err: JournalError = BridgeError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(
            err,
            JournalError::InternalError("backend did not respond within 5s".into())
        );
        assert!(!err.is_cancelled());
        assert!(JournalError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_precision() {
        let err = BridgeError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "backend did not respond within 250ms");
    }
}
