//! iterate-bridge: the journal backend contract
//!
//! This crate holds everything the screens need from outside the UI:
//! - The [`JournalBackend`] contract and its error values
//! - A process bridge that talks to the native backend over stdio
//! - A scripted in-memory backend for tests and demos
//! - Password bytes and the master-password policy
//! - The `last_use.json` settings store and app configuration

pub mod backend;
pub mod bridge;
pub mod config;
pub mod error;
pub mod password;
pub mod scripted;
pub mod settings;

// Re-export commonly used types
pub use backend::JournalBackend;
pub use bridge::ProcessBridge;
pub use config::{Config, ConfigError};
pub use error::{BridgeError, JournalError};
pub use password::{check_new_password, Password, PolicyViolation, MIN_PASSWORD_LENGTH};
pub use scripted::{Call, ScriptedBackend};
pub use settings::{JournalReference, SettingsError, SettingsStore};

/// Returns the bridge version.
pub fn bridge_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
