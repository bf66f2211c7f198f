//! Theme and styling definitions for the iterate TUI.
//!
//! A dark palette, mirroring the desktop app's dark card layout.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(24, 24, 27);
    pub const CARD: Color = Color::Rgb(32, 32, 36);
    pub const FG: Color = Color::Rgb(228, 228, 231);
    pub const MUTED: Color = Color::Rgb(150, 150, 160);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(147, 197, 253);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(45, 45, 52);
    pub const STATUS_KEY_BG: Color = Color::Rgb(70, 80, 110);

    // Status colors
    pub const SUCCESS: Color = Color::Rgb(134, 239, 172);
    pub const DESTRUCTIVE: Color = Color::Rgb(248, 113, 113);

    // Border colors
    pub const BORDER: Color = Color::Rgb(63, 63, 70);
    pub const BORDER_ACTIVE: Color = Color::Rgb(147, 197, 253);
}

/// Spinner frames for loading states.
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::CARD)
    }

    /// Background outside the card.
    pub fn backdrop() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Muted text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::MUTED).bg(Palette::CARD)
    }

    /// Highlighted/selected item.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .bg(Palette::CARD)
            .add_modifier(Modifier::BOLD)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::CARD)
    }

    /// Success message.
    pub fn success() -> Style {
        Style::default().fg(Palette::SUCCESS).bg(Palette::CARD)
    }

    /// Error message and warnings.
    pub fn error() -> Style {
        Style::default().fg(Palette::DESTRUCTIVE).bg(Palette::CARD)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::CARD)
            .add_modifier(Modifier::BOLD)
    }

    /// Button, unfocused.
    pub fn button() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Button, focused.
    pub fn button_active() -> Style {
        Style::default()
            .fg(Palette::BG)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }

    /// Border for error and warning panels.
    pub fn border_error() -> Style {
        Style::default().fg(Palette::DESTRUCTIVE)
    }
}

/// Spinner frame for the given tick.
pub fn spinner(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}
