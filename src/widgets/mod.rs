// logview-tui/src/widgets/mod.rs
mod logview;
pub use logview::*;

mod velocity;
pub use velocity::*;
