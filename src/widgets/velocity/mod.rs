// logview-tui/src/widgets/velocity/mod.rs
mod velocity_widget;

pub use velocity_widget::*;
