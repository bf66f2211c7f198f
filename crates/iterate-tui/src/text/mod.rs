//! Text rendering utilities.
//!
//! - [`visual_width`], [`truncate_to_width`], [`truncate_path_start`] - width-aware truncation
//! - [`wrap_styled`] - wrapping for messages inside the card

mod width;
mod wrap;

pub use width::{truncate_path_start, truncate_to_width, visual_width};
pub use wrap::wrap_styled;
