//! Password bytes and the master-password policy.
//!
//! A [`Password`] owns the UTF-8 encoding of what the user typed. The buffer
//! is wiped when the value is dropped, so handing it to a backend call and
//! letting the call finish is enough to clear it from memory.

use serde::{Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// Minimum number of characters accepted for a new master password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Transient password bytes, zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    /// Encode entered text into password bytes.
    pub fn from_text(text: &str) -> Self {
        Self(Zeroizing::new(text.as_bytes().to_vec()))
    }

    /// Wrap raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password({} bytes)", self.0.len())
    }
}

/// Serialized as a plain array of byte values, which is what the backend expects.
impl Serialize for Password {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// Reasons a new master password is refused before reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("Both fields are required.")]
    Missing,

    #[error("Passwords do not match.")]
    Mismatch,

    #[error("Password must be at least 8 characters.")]
    TooShort,
}

/// Check a new password and its confirmation.
///
/// Checks run in a fixed order: presence, then equality, then length.
/// Length is counted in characters, not bytes.
pub fn check_new_password(password: &str, confirm: &str) -> Result<(), PolicyViolation> {
    if password.is_empty() || confirm.is_empty() {
        return Err(PolicyViolation::Missing);
    }
    if password != confirm {
        return Err(PolicyViolation::Mismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PolicyViolation::TooShort);
    }
    Ok(())
}
