// logview-tui/src/widgets/logview/logview_widget.rs
//!
//! The `LogView` widget: a scrollable, searchable viewport over a stream
//! of log events. All public entry points lock one mutex per instance,
//! so a producer thread can append while another thread renders.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    widgets::Widget,
};
use tracing::debug;

use crate::error::LogViewError;
use crate::tui_theme;

use super::arena::LineId;
use super::event::LogEvent;
use super::event_store::EventStore;
use super::search;

/// Narrow render boundary: anything that can accept styled character
/// cells. Coordinates are relative to the viewport's own origin.
pub trait RenderSink {
    fn set_cell(&mut self, x: u16, y: u16, style: Style, ch: char);
}

/// Sink adapter writing cells into a ratatui buffer, offset and clipped
/// by the widget area.
pub struct BufferSink<'a> {
    buf: &'a mut Buffer,
    area: Rect,
}

impl<'a> BufferSink<'a> {
    pub fn new(buf: &'a mut Buffer, area: Rect) -> Self {
        Self { buf, area }
    }
}

impl RenderSink for BufferSink<'_> {
    fn set_cell(&mut self, x: u16, y: u16, style: Style, ch: char) {
        if x >= self.area.width || y >= self.area.height {
            return;
        }
        let position = Position::new(self.area.x + x, self.area.y + y);
        if let Some(cell) = self.buf.cell_mut(position) {
            cell.set_char(ch).set_style(style);
        }
    }
}

struct LogViewCore {
    store: EventStore,
    top: Option<LineId>,

    page_width: usize,
    page_height: usize,
    last_width: usize,
    last_height: usize,

    following: bool,
    event_limit: usize,

    show_timestamp: bool,
    show_source: bool,
    timestamp_format: String,
}

/// A scrollable log viewport with regex highlighting, line wrapping,
/// follow mode and predicate search.
///
/// `LogView` is `Send + Sync`; share it behind an `Arc` to append from a
/// producer task while the render loop draws it.
pub struct LogView {
    inner: Mutex<LogViewCore>,
}

impl Default for LogView {
    fn default() -> Self {
        Self::new()
    }
}

impl LogView {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LogViewCore {
                store: EventStore::new(),
                top: None,
                page_width: 0,
                page_height: 0,
                last_width: 0,
                last_height: 0,
                following: true,
                event_limit: 0,
                show_timestamp: false,
                show_source: false,
                timestamp_format: "%H:%M:%S%.3f".to_string(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LogViewCore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /* ******************************************************************
     * Ingestion
     * *****************************************************************/

    /// Append one event. Prefer [`LogView::append_batch`] when several
    /// events arrive at once.
    pub fn append(&self, event: LogEvent) {
        self.lock().append(event);
    }

    /// Append several events under a single lock acquisition, without
    /// re-rendering in between.
    pub fn append_batch(&self, events: impl IntoIterator<Item = LogEvent>) {
        let mut core = self.lock();
        let mut count = 0usize;
        for event in events {
            core.append(event);
            count += 1;
        }
        debug!(count, "appended event batch");
    }

    /* ******************************************************************
     * Configuration
     * *****************************************************************/

    /// Install a highlight pattern with named capture groups, or disable
    /// pattern highlighting with `None`. A compile error leaves the
    /// previous pattern active. Already-appended events keep their spans
    /// until [`LogView::invalidate_highlights`] is called.
    pub fn set_highlight_pattern(&self, pattern: Option<&str>) -> Result<(), LogViewError> {
        self.lock().store.set_highlight_pattern(pattern)
    }

    /// Register the style for a named capture group. A style that only
    /// sets a foreground keeps the base (or level) background.
    pub fn set_highlight_color(&self, group: impl Into<String>, style: Style) {
        self.lock().store.set_highlight_color(group, style);
    }

    pub fn set_highlighting(&self, enabled: bool) {
        self.lock().store.set_highlighting(enabled);
    }

    /// Enable background highlighting of Warning/Error events.
    pub fn set_level_highlighting(&self, enabled: bool) {
        self.lock().store.set_level_highlighting(enabled);
    }

    pub fn set_warning_color(&self, background: ratatui::style::Color) {
        self.lock().store.set_warning_color(background);
    }

    pub fn set_error_color(&self, background: ratatui::style::Color) {
        self.lock().store.set_error_color(background);
    }

    pub fn set_base_style(&self, style: Style) {
        self.lock().store.set_base_style(style);
    }

    pub fn set_show_timestamp(&self, show: bool) {
        self.lock().show_timestamp = show;
    }

    pub fn set_show_source(&self, show: bool) {
        self.lock().show_source = show;
    }

    /// Format string (chrono syntax) for the header timestamp.
    pub fn set_timestamp_format(&self, format: impl Into<String>) {
        self.lock().timestamp_format = format.into();
    }

    /// Cap the number of retained events; 0 means unbounded. The oldest
    /// event (with all of its wrap lines) is evicted first.
    pub fn set_event_limit(&self, limit: usize) {
        let mut core = self.lock();
        core.event_limit = limit;
        core.enforce_limit();
    }

    /// Toggle line wrapping. The whole store is rewrapped (or collapsed)
    /// immediately, which is O(total lines).
    pub fn set_wrap(&self, wrap: bool) {
        let mut core = self.lock();
        if core.store.wrap_enabled() == wrap {
            return;
        }
        core.store.set_wrap(wrap);
        let top_event = core.top_event_id();
        if wrap {
            core.store.rewrap_all();
        } else {
            core.store.unwrap_all();
        }
        core.reseek_top(top_event);
        if core.following {
            core.scroll_to_end();
        }
    }

    pub fn wrap_enabled(&self) -> bool {
        self.lock().store.wrap_enabled()
    }

    /// Recompute highlight spans for every event already in the view.
    /// This unwraps, recolorizes and rewraps the whole store; expensive
    /// on large buffers and runs under the instance lock.
    pub fn invalidate_highlights(&self) {
        let mut core = self.lock();
        let top_event = core.top_event_id();
        core.store.recolorize_all();
        core.store.rewrap_all();
        core.reseek_top(top_event);
        if core.following {
            core.scroll_to_end();
        }
    }

    /* ******************************************************************
     * Scrolling
     * *****************************************************************/

    /// Enable or disable follow mode. Enabling immediately scrolls to the
    /// last event; disabling only stops future auto-scroll.
    pub fn set_following(&self, following: bool) {
        let mut core = self.lock();
        core.following = following;
        if following {
            core.scroll_to_end();
        }
    }

    pub fn following(&self) -> bool {
        self.lock().following
    }

    /// Scroll so the first line is at the top. Does not alter follow mode.
    pub fn scroll_to_top(&self) {
        let mut core = self.lock();
        core.top = core.store.first();
    }

    /// Scroll so the last line is the bottom-most visible row. Does not
    /// alter follow mode.
    pub fn scroll_to_bottom(&self) {
        self.lock().scroll_to_end();
    }

    pub fn scroll_up(&self, lines: usize) {
        let mut core = self.lock();
        if let Some(top) = core.top {
            core.top = Some(core.store.at_offset(top, -(lines as isize)));
        }
    }

    pub fn scroll_down(&self, lines: usize) {
        let mut core = self.lock();
        if let Some(top) = core.top {
            core.top = Some(core.store.at_offset(top, lines as isize));
        }
    }

    /* ******************************************************************
     * Search / navigation
     * *****************************************************************/

    /// Count events matching the predicate. Wrapped events count once.
    pub fn find_total_matches<F>(&self, predicate: F) -> usize
    where
        F: Fn(&LogEvent) -> bool,
    {
        search::find_total_matches(&self.lock().store, predicate)
    }

    /// Find the next matching event after `last_hit_id` (empty to start
    /// from the beginning), wrapping around. `None` when nothing matches.
    pub fn find_matching_event<F>(&self, last_hit_id: &str, predicate: F) -> Option<Arc<LogEvent>>
    where
        F: Fn(&LogEvent) -> bool,
    {
        search::find_matching_event(&self.lock().store, last_hit_id, predicate)
    }

    /// Reposition the viewport so the event's first line is the top row.
    /// Returns false when the id is unknown.
    pub fn scroll_to_event_id(&self, event_id: &str) -> bool {
        let mut core = self.lock();
        match core.store.first_line_of_event(event_id) {
            Some(line) => {
                core.top = Some(line);
                true
            }
            None => false,
        }
    }

    /// The event under the cursor (the top visible line).
    pub fn current_event(&self) -> Option<Arc<LogEvent>> {
        let core = self.lock();
        core.top
            .and_then(|id| core.store.line(id))
            .map(|line| Arc::clone(line.event()))
    }

    pub fn line_count(&self) -> usize {
        self.lock().store.line_count()
    }

    pub fn event_count(&self) -> usize {
        self.lock().store.event_count()
    }

    /* ******************************************************************
     * Rendering
     * *****************************************************************/

    /// Apply a new viewport geometry without rendering. Rewraps the store
    /// when the width changes (or the height changes while wrapping is
    /// on); with a zero dimension everything becomes a no-op until a
    /// positive size is observed again.
    pub fn on_resize(&self, width: u16, height: u16) {
        self.lock().on_resize(width as usize, height as usize);
    }

    /// Full-frame redraw of the visible window into `sink`. Detects
    /// geometry changes, so callers only need this one entry point per
    /// frame. Rows shorter than the page width leave the remainder of the
    /// sink untouched.
    pub fn render_into(&self, sink: &mut dyn RenderSink, width: u16, height: u16) {
        let mut core = self.lock();
        core.on_resize(width as usize, height as usize);
        core.render(sink);
    }
}

impl Widget for &LogView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut sink = BufferSink::new(buf, area);
        self.render_into(&mut sink, area.width, area.height);
    }
}

impl LogViewCore {
    fn append(&mut self, event: LogEvent) {
        let produced = self.store.append(event);
        if self.top.is_none() {
            self.top = self.store.first();
        }
        // follow mode keeps the latest line visible once the page is full
        if self.following && self.store.line_count() > self.content_rows() {
            if let Some(top) = self.top {
                self.top = Some(self.store.at_offset(top, produced as isize));
            }
        }
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        if self.event_limit == 0 {
            return;
        }
        while self.store.event_count() > self.event_limit {
            let removed = self.store.remove_first_event();
            if removed.is_empty() {
                break;
            }
            if let Some(top) = self.top {
                if removed.contains(&top) {
                    self.top = self.store.first();
                }
            }
        }
    }

    /// Rows available for log lines (the header consumes one).
    fn content_rows(&self) -> usize {
        let header = (self.show_timestamp || self.show_source) as usize;
        self.page_height.saturating_sub(header)
    }

    fn scroll_to_end(&mut self) {
        let rows = self.content_rows();
        self.top = self
            .store
            .last()
            .map(|last| self.store.at_offset(last, -(rows.saturating_sub(1) as isize)));
    }

    fn top_event_id(&self) -> Option<String> {
        self.top
            .and_then(|id| self.store.line(id))
            .map(|line| line.event().id.clone())
    }

    fn reseek_top(&mut self, event_id: Option<String>) {
        self.top = event_id
            .as_deref()
            .and_then(|id| self.store.first_line_of_event(id))
            .or_else(|| self.store.first());
    }

    fn on_resize(&mut self, width: usize, height: usize) {
        let width_changed = width != self.last_width;
        let height_changed = height != self.last_height;
        self.last_width = width;
        self.last_height = height;
        self.page_width = width;
        self.page_height = height;
        self.store.set_page_width(width);
        if width == 0 || height == 0 {
            return;
        }
        if width_changed || (height_changed && self.store.wrap_enabled()) {
            let top_event = self.top_event_id();
            self.store.rewrap_all();
            self.reseek_top(top_event);
        }
        if (width_changed || height_changed) && self.following {
            // keep the last line on the bottom-most visible row
            self.scroll_to_end();
        }
    }

    fn render(&mut self, sink: &mut dyn RenderSink) {
        if self.page_width == 0 || self.page_height == 0 {
            return;
        }
        let mut y: u16 = 0;
        if self.show_timestamp || self.show_source {
            self.draw_header(sink);
            y = 1;
        }
        let rows = self.content_rows();
        let mut drawn = 0;
        let mut cursor = self.top;
        while let Some(id) = cursor {
            if drawn == rows {
                break;
            }
            self.draw_line(sink, y, id);
            y += 1;
            drawn += 1;
            cursor = self.store.next(id);
        }
    }

    fn draw_header(&self, sink: &mut dyn RenderSink) {
        let Some(event) = self
            .top
            .and_then(|id| self.store.line(id))
            .map(|line| Arc::clone(line.event()))
        else {
            return;
        };
        let mut text = String::new();
        if self.show_timestamp {
            text.push_str(&event.timestamp.format(&self.timestamp_format).to_string());
        }
        if self.show_source && !event.source.is_empty() {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&event.source);
        }
        let style = Style::default().fg(tui_theme::HEADER_FG);
        for (x, ch) in text.chars().take(self.page_width).enumerate() {
            sink.set_cell(x as u16, 0, style, ch);
        }
    }

    // TODO: grapheme-aware addressing; multi-byte UTF-8 renders one cell
    // per byte for now.
    fn draw_line(&self, sink: &mut dyn RenderSink, y: u16, id: LineId) {
        let Some(line) = self.store.line(id) else {
            return;
        };
        let (start, end) = line.slice();
        let bytes = line.event().message.as_bytes();
        let spans = line.spans();

        let mut span_idx = 0;
        while span_idx < spans.len() && spans[span_idx].end <= start {
            span_idx += 1;
        }
        let mut x: u16 = 0;
        for pos in start..end {
            if x as usize >= self.page_width {
                break;
            }
            while span_idx < spans.len() && pos >= spans[span_idx].end {
                span_idx += 1;
            }
            let style = spans
                .get(span_idx)
                .map_or_else(|| self.store.base_style(), |span| span.style);
            sink.set_cell(x, y, style, bytes[pos] as char);
            x += 1;
        }
    }
}
