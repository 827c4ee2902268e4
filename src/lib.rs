// logview-tui/src/lib.rs
mod widgets;
pub use widgets::*;

mod error;
pub use error::*;

pub mod tui_theme;

pub use ratatui;
