// logview-tui/src/widgets/logview/mod.rs
mod arena;
mod event;
mod event_store;
mod highlighter;
mod logview_widget;
mod search;

pub use arena::LineId;
pub use event::*;
pub use event_store::*;
pub use highlighter::StyleSpan;
pub use logview_widget::*;
