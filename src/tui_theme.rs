// logview-tui/src/tui_theme.rs
use ratatui::style::Color;

pub const TEXT_FG: Color = Color::White;
pub const TEXT_BG: Color = Color::Black;

/// Default background for `LogLevel::Warning` events when level
/// highlighting is enabled.
pub const WARNING_BG: Color = Color::Rgb(139, 69, 19);
/// Default background for `LogLevel::Error` events.
pub const ERROR_BG: Color = Color::Rgb(205, 92, 92);

pub const HEADER_FG: Color = Color::Rgb(170, 170, 170);

pub const HISTOGRAM_BAR: Color = Color::Rgb(0, 128, 128);
pub const HISTOGRAM_PEAK: Color = Color::Rgb(240, 180, 0);

pub const COLOR_ORANGE: Color = Color::Rgb(255, 165, 0);
pub const COLOR_TEAL: Color = Color::Rgb(0, 128, 128);
pub const COLOR_LIME: Color = Color::Rgb(50, 205, 50);
pub const COLOR_GOLD: Color = Color::Rgb(255, 215, 0);
pub const COLOR_SILVER: Color = Color::Rgb(192, 192, 192);
