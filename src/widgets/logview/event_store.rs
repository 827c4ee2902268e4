// logview-tui/src/widgets/logview/event_store.rs
//!
//! Ordered store of render lines. An appended event starts as a single
//! order-0 line; wrapping splits it into an order-1 head plus order-2..n
//! continuation lines whose slices partition the message. Style spans are
//! computed once per event on the head and shared by the continuations.

use std::sync::Arc;

use ratatui::style::{Color, Style};
use tracing::debug;

use crate::error::LogViewError;
use crate::tui_theme;

use super::arena::{Arena, LineId};
use super::event::{LogEvent, LogLevel};
use super::highlighter::{Highlighter, StyleSpan};

/// One drawable row of the viewport.
///
/// `slice` addresses a byte range of the event message. For an unwrapped
/// event there is exactly one line with `order == 0` covering the whole
/// message; a wrapped event occupies contiguous lines ordered 1..=n whose
/// slices partition the message. `line_count` is authoritative on the
/// group's first line.
#[derive(Debug, Clone)]
pub struct RenderLine {
    event: Arc<LogEvent>,
    start: usize,
    end: usize,
    order: usize,
    line_count: usize,
    spans: Arc<[StyleSpan]>,
}

impl RenderLine {
    pub fn event(&self) -> &Arc<LogEvent> {
        &self.event
    }

    /// Byte slice `[start, end)` of the message this row covers.
    pub fn slice(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn spans(&self) -> &[StyleSpan] {
        &self.spans
    }
}

/// The ordered sequence of render lines plus the highlight configuration
/// used to colorize appended events.
///
/// The store is the sole mutator of derived state: callers hand events
/// over on append and read lines back by id. Scroll position and page
/// geometry live on the viewport; the store only needs the page width to
/// compute wrapping.
pub struct EventStore {
    lines: Arena<RenderLine>,
    event_total: usize,

    highlighter: Highlighter,
    highlighting_enabled: bool,
    level_highlighting: bool,
    warning_bg: Color,
    error_bg: Color,
    base_style: Style,

    wrap: bool,
    page_width: usize,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            lines: Arena::new(),
            event_total: 0,
            highlighter: Highlighter::default(),
            highlighting_enabled: true,
            level_highlighting: false,
            warning_bg: tui_theme::WARNING_BG,
            error_bg: tui_theme::ERROR_BG,
            base_style: Style::default().fg(tui_theme::TEXT_FG).bg(tui_theme::TEXT_BG),
            wrap: true,
            page_width: 0,
        }
    }

    /* ******************************************************************
     * Accessors
     * *****************************************************************/

    /// Total render lines currently in the store (wrapped events count
    /// once per produced line).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Distinct events currently in the store.
    pub fn event_count(&self) -> usize {
        self.event_total
    }

    pub fn first(&self) -> Option<LineId> {
        self.lines.head()
    }

    pub fn last(&self) -> Option<LineId> {
        self.lines.tail()
    }

    pub fn line(&self, id: LineId) -> Option<&RenderLine> {
        self.lines.get(id)
    }

    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.lines.next(id)
    }

    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.lines.prev(id)
    }

    pub fn base_style(&self) -> Style {
        self.base_style
    }

    pub fn wrap_enabled(&self) -> bool {
        self.wrap
    }

    pub fn page_width(&self) -> usize {
        self.page_width
    }

    /// Group heads (order 0 or 1) from oldest to newest; one per event.
    pub fn head_lines(&self) -> impl Iterator<Item = LineId> + '_ {
        std::iter::successors(self.lines.head(), move |&id| self.lines.next(id))
            .filter(move |&id| self.lines.get(id).is_some_and(|line| line.order <= 1))
    }

    /// Distinct events from oldest to newest.
    pub fn events(&self) -> impl Iterator<Item = &Arc<LogEvent>> + '_ {
        self.head_lines()
            .filter_map(move |id| self.lines.get(id).map(|line| &line.event))
    }

    /// First render line of the event with the given id.
    pub fn first_line_of_event(&self, event_id: &str) -> Option<LineId> {
        self.head_lines()
            .find(|&id| self.lines.get(id).is_some_and(|line| line.event.id == event_id))
    }

    /* ******************************************************************
     * Configuration
     * *****************************************************************/

    /// Install a highlight pattern (named capture groups), or disable
    /// pattern highlighting with `None`. Events already in the store keep
    /// their spans until a full recolorize.
    pub fn set_highlight_pattern(&mut self, pattern: Option<&str>) -> Result<(), LogViewError> {
        self.highlighter.set_pattern(pattern)
    }

    /// Register the style applied to matches of a named capture group.
    pub fn set_highlight_color(&mut self, group: impl Into<String>, style: Style) {
        self.highlighter.set_color(group, style);
    }

    pub fn set_highlighting(&mut self, enabled: bool) {
        self.highlighting_enabled = enabled;
    }

    pub fn set_level_highlighting(&mut self, enabled: bool) {
        self.level_highlighting = enabled;
    }

    pub fn set_warning_color(&mut self, background: Color) {
        self.warning_bg = background;
    }

    pub fn set_error_color(&mut self, background: Color) {
        self.error_bg = background;
    }

    pub fn set_base_style(&mut self, style: Style) {
        self.base_style = style;
    }

    pub fn set_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    pub fn set_page_width(&mut self, width: usize) {
        self.page_width = width;
    }

    /* ******************************************************************
     * Append
     * *****************************************************************/

    /// Append one event: insert its order-0 line at the tail, colorize it
    /// and wrap it against the current page width. Returns the number of
    /// render lines the event produced so the viewport can advance its
    /// follow pointer.
    pub fn append(&mut self, event: LogEvent) -> usize {
        let event = Arc::new(event);
        let end = event.message.len();
        let id = self.lines.push_back(RenderLine {
            event,
            start: 0,
            end,
            order: 0,
            line_count: 1,
            spans: Arc::from([]),
        });
        self.colorize_head(id);
        self.calculate_wrap(id);
        self.event_total += 1;
        self.lines
            .get(id)
            .map_or(1, |line| if line.order == 0 { 1 } else { line.line_count })
    }

    /// Remove the oldest event together with all of its wrap lines.
    /// Returns the removed line ids so the viewport can fix a dangling
    /// top pointer. Retention policy is the caller's concern.
    pub fn remove_first_event(&mut self) -> Vec<LineId> {
        let Some(first) = self.lines.head() else {
            return Vec::new();
        };
        let count = self
            .lines
            .get(first)
            .map_or(0, |line| if line.order == 0 { 1 } else { line.line_count });
        let mut removed = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(id) = self.lines.head() else {
                break;
            };
            self.lines.remove(id);
            removed.push(id);
        }
        if !removed.is_empty() {
            self.event_total -= 1;
        }
        removed
    }

    /* ******************************************************************
     * Colorize
     * *****************************************************************/

    /// Compute style spans for a line. Precondition: the line is the
    /// unwrapped (order 0) representation of its event; colorizing a
    /// wrapped line indicates a bug in the caller and fails fast.
    pub fn colorize(&mut self, id: LineId) -> Result<(), LogViewError> {
        let order = self
            .lines
            .get(id)
            .map(|line| line.order)
            .ok_or(LogViewError::InvariantViolation("unknown render line"))?;
        if order != 0 {
            return Err(LogViewError::InvariantViolation(
                "cannot colorize wrapped line",
            ));
        }
        self.colorize_head(id);
        Ok(())
    }

    fn colorize_head(&mut self, id: LineId) {
        let Some(line) = self.lines.get(id) else {
            return;
        };
        let event = Arc::clone(&line.event);
        let base = self.resolved_base_style(event.level);
        let spans: Arc<[StyleSpan]> = if self.highlighting_enabled && self.highlighter.has_pattern()
        {
            self.highlighter.build_spans(&event.message, base).into()
        } else {
            Arc::from([StyleSpan {
                start: 0,
                end: event.message.len(),
                style: base,
            }])
        };
        if let Some(line) = self.lines.get_mut(id) {
            line.spans = spans;
        }
    }

    /// Base style with the level background overlay applied, so the level
    /// color composites under pattern highlighting.
    fn resolved_base_style(&self, level: LogLevel) -> Style {
        if !self.level_highlighting {
            return self.base_style;
        }
        match level {
            LogLevel::Info => self.base_style,
            LogLevel::Warning => self.base_style.bg(self.warning_bg),
            LogLevel::Error => self.base_style.bg(self.error_bg),
        }
    }

    /* ******************************************************************
     * Wrapping
     * *****************************************************************/

    /// Split an event over multiple lines according to the page width.
    /// No-op when wrapping is disabled, the width is zero, or the message
    /// fits. Prior wrap state is discarded and recomputed from scratch.
    /// Returns the last line of the group so list walks can continue
    /// behind it.
    pub fn calculate_wrap(&mut self, id: LineId) -> LineId {
        let Some(line) = self.lines.get(id) else {
            return id;
        };
        let message_len = line.event.message.len();
        if !self.wrap || self.page_width == 0 || message_len < self.page_width {
            return id;
        }
        let head = if line.order != 0 {
            self.delete_wrap_lines(id)
        } else {
            id
        };

        let width = self.page_width;
        let line_count = message_len.div_ceil(width);
        let (event, spans) = {
            let Some(line) = self.lines.get_mut(head) else {
                return head;
            };
            line.order = 1;
            line.start = 0;
            line.end = width;
            line.line_count = line_count;
            (Arc::clone(&line.event), Arc::clone(&line.spans))
        };

        let mut current = head;
        for i in 1..line_count {
            let start = width * i;
            let end = if i == line_count - 1 {
                message_len
            } else {
                start + width
            };
            current = self.lines.insert_after(
                current,
                RenderLine {
                    event: Arc::clone(&event),
                    start,
                    end,
                    order: i + 1,
                    line_count,
                    spans: Arc::clone(&spans),
                },
            );
        }
        current
    }

    /// Collapse a wrapped group back to its single order-0 line. No-op on
    /// an unwrapped line. Returns the group head.
    pub fn delete_wrap_lines(&mut self, id: LineId) -> LineId {
        let Some(line) = self.lines.get(id) else {
            return id;
        };
        if line.order == 0 {
            return id;
        }
        let mut head = id;
        while self.lines.get(head).is_some_and(|line| line.order > 1) {
            match self.lines.prev(head) {
                Some(prev) => head = prev,
                None => break,
            }
        }
        if let Some(line) = self.lines.get_mut(head) {
            line.order = 0;
            line.start = 0;
            line.end = line.event.message.len();
            line.line_count = 1;
        }
        while let Some(next) = self.lines.next(head) {
            if self.lines.get(next).is_some_and(|line| line.order > 1) {
                self.lines.remove(next);
            } else {
                break;
            }
        }
        head
    }

    /* ******************************************************************
     * Full-store passes (documented expensive: O(total lines), they run
     * under the viewport lock and stall rendering while they go)
     * *****************************************************************/

    /// Recompute wrapping for every event at the current page width.
    /// Idempotent: a second pass at the same width leaves the structure
    /// unchanged. Groups that no longer need wrapping are collapsed.
    pub fn rewrap_all(&mut self) {
        debug!(
            width = self.page_width,
            lines = self.lines.len(),
            "rewrapping all events"
        );
        let mut cursor = self.lines.head();
        while let Some(id) = cursor {
            let head = self.delete_wrap_lines(id);
            let tail = self.calculate_wrap(head);
            cursor = self.lines.next(tail);
        }
    }

    /// Collapse every wrapped group.
    pub fn unwrap_all(&mut self) {
        let mut cursor = self.lines.head();
        while let Some(id) = cursor {
            let head = self.delete_wrap_lines(id);
            cursor = self.lines.next(head);
        }
    }

    /// Recompute style spans for every event. Wrap lines are removed
    /// first; colorizing while wrapped is the fail-fast condition above.
    pub fn recolorize_all(&mut self) {
        debug!(events = self.event_total, "recolorizing all events");
        self.unwrap_all();
        let mut cursor = self.lines.head();
        while let Some(id) = cursor {
            self.colorize_head(id);
            cursor = self.lines.next(id);
        }
    }

    /* ******************************************************************
     * Navigation
     * *****************************************************************/

    /// Walk `|offset|` lines forward (positive) or backward (negative)
    /// from `start`, clamping at the first and last line of the store.
    pub fn at_offset(&self, start: LineId, offset: isize) -> LineId {
        let mut current = start;
        let mut steps = offset.unsigned_abs();
        while steps > 0 {
            let link = if offset < 0 {
                self.lines.prev(current)
            } else {
                self.lines.next(current)
            };
            match link {
                Some(id) => current = id,
                None => break,
            }
            steps -= 1;
        }
        current
    }
}
