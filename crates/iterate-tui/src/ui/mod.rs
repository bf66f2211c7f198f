//! UI module for the iterate TUI.

pub mod layout;
pub mod theme;
pub mod widgets;

pub use layout::*;
pub use widgets::*;
