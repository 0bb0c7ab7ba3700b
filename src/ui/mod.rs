//! Terminal user interface.

pub mod format;
pub mod tui;
