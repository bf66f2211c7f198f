//! Reusable widgets for the iterate TUI.

mod button;
pub mod password_input;
pub mod status_bar;

pub use button::Button;
pub use password_input::PasswordInputState;
pub use status_bar::{KeyHint, StatusBar};
