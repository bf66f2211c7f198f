//! Text width and truncation utilities.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Get the visual width of a string in terminal cells.
///
/// Accounts for wide characters (CJK, emoji) that take 2 cells.
pub fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within a maximum visual width, keeping the start.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if visual_width(s) <= max_width {
        return s.to_string();
    }

    let target_width = max_width.saturating_sub(ELLIPSIS.len());
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result.push_str(ELLIPSIS);
    result
}

/// Truncate a path to fit, keeping the end (the file name is what matters).
///
/// `/home/me/journals/2026/work.db` at width 16 becomes `.../2026/work.db`.
pub fn truncate_path_start(path: &str, max_width: usize) -> String {
    if visual_width(path) <= max_width {
        return path.to_string();
    }

    let target_width = max_width.saturating_sub(ELLIPSIS.len());
    let mut kept = Vec::new();
    let mut width = 0;
    for ch in path.chars().rev() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        kept.push(ch);
        width += ch_width;
    }

    let mut result = String::from(ELLIPSIS);
    result.extend(kept.into_iter().rev());
    result
}
