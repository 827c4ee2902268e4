// logview-tui/src/widgets/velocity/velocity_widget.rs
//!
//! Event-rate histogram: counts events into fixed-width time buckets and
//! renders them as a bar chart. Shares the locking shape of `LogView` so
//! one producer can feed both widgets.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};
use tracing::debug;

use crate::tui_theme;
use crate::widgets::logview::LogEvent;

const DEFAULT_WINDOW: usize = 120;

/// Partial blocks for the fractional top cell of a bar, coarsest first.
const BAR_EIGHTHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

struct VelocityCore {
    bucket_width: Duration,
    window: usize,
    /// Timestamp at which `buckets[0]` starts; `None` until the first
    /// event (or an explicit anchor) fixes the grid.
    origin: Option<DateTime<Utc>>,
    buckets: Vec<u64>,
    /// Display anchor: when set, rendering ends at this instant instead
    /// of the newest bucket.
    anchor: Option<DateTime<Utc>>,
    total: u64,
}

impl VelocityCore {
    fn width_ms(&self) -> i64 {
        self.bucket_width.num_milliseconds().max(1)
    }

    fn record(&mut self, timestamp: DateTime<Utc>) {
        let origin = *self.origin.get_or_insert(timestamp);
        let delta = (timestamp - origin).num_milliseconds();
        let index = delta.div_euclid(self.width_ms());
        if index < 0 {
            debug!(%timestamp, "event predates the histogram origin, dropped");
            return;
        }
        let mut index = index as usize;

        // slide the window forward so `index` lands inside it
        let advance = (index + 1).saturating_sub(self.window);
        if advance > 0 {
            if advance >= self.buckets.len() {
                self.buckets.clear();
            } else {
                self.buckets.drain(..advance);
            }
            self.origin = Some(origin + self.bucket_width * advance as i32);
            index -= advance;
        }
        if index >= self.buckets.len() {
            self.buckets.resize(index + 1, 0);
        }
        self.buckets[index] += 1;
        self.total += 1;
    }

    /// Index one past the last bucket to display.
    fn display_end(&self) -> usize {
        let (Some(anchor), Some(origin)) = (self.anchor, self.origin) else {
            return self.buckets.len();
        };
        let delta = (anchor - origin).num_milliseconds();
        let index = delta.div_euclid(self.width_ms());
        if index < 0 {
            return 0;
        }
        ((index as usize) + 1).min(self.buckets.len())
    }

    fn buckets_in_window(&self) -> Vec<(DateTime<Utc>, u64)> {
        let Some(origin) = self.origin else {
            return Vec::new();
        };
        let end = self.display_end();
        let start = end.saturating_sub(self.window);
        (start..end)
            .map(|i| (origin + self.bucket_width * i as i32, self.buckets[i]))
            .collect()
    }
}

/// Bar-chart widget showing how many events arrived per time bucket.
///
/// Buckets are anchored to the first observed timestamp and evicted from
/// the front once the window is full, so memory stays bounded no matter
/// how long the stream runs.
pub struct LogVelocityView {
    inner: Mutex<VelocityCore>,
}

impl Default for LogVelocityView {
    fn default() -> Self {
        Self::new(Duration::seconds(1))
    }
}

impl LogVelocityView {
    /// A histogram with the given bucket width and the default window of
    /// 120 buckets.
    pub fn new(bucket_width: Duration) -> Self {
        Self {
            inner: Mutex::new(VelocityCore {
                bucket_width,
                window: DEFAULT_WINDOW,
                origin: None,
                buckets: Vec::new(),
                anchor: None,
                total: 0,
            }),
        }
    }

    pub fn with_window(self, window: usize) -> Self {
        self.set_window(window);
        self
    }

    fn lock(&self) -> MutexGuard<'_, VelocityCore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cap the number of retained buckets (minimum 1). Shrinking evicts
    /// the oldest buckets immediately.
    pub fn set_window(&self, window: usize) {
        let mut core = self.lock();
        core.window = window.max(1);
        let excess = core.buckets.len().saturating_sub(core.window);
        if excess > 0 {
            core.buckets.drain(..excess);
            if let Some(origin) = core.origin {
                core.origin = Some(origin + core.bucket_width * excess as i32);
            }
        }
    }

    /// Count one event into the bucket its timestamp falls in. Events
    /// older than the current origin are dropped.
    pub fn append_event(&self, event: &LogEvent) {
        self.lock().record(event.timestamp);
    }

    /// Pin the display to the bucket containing `anchor` (`None` follows
    /// the newest bucket again). Anchoring an empty histogram fixes the
    /// bucket grid origin instead.
    pub fn set_anchor(&self, anchor: Option<DateTime<Utc>>) {
        let mut core = self.lock();
        match anchor {
            Some(at) if core.origin.is_none() => {
                core.origin = Some(at);
                core.anchor = None;
            }
            other => core.anchor = other,
        }
    }

    /// The visible buckets, oldest first, as (bucket start, count) pairs.
    pub fn buckets_in_window(&self) -> Vec<(DateTime<Utc>, u64)> {
        self.lock().buckets_in_window()
    }

    /// Total events counted since creation, including evicted buckets.
    pub fn event_total(&self) -> u64 {
        self.lock().total
    }

    pub fn bucket_width(&self) -> Duration {
        self.lock().bucket_width
    }
}

impl Widget for &LogVelocityView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let buckets = self.buckets_in_window();
        if buckets.is_empty() {
            return;
        }
        let visible = &buckets[buckets.len().saturating_sub(area.width as usize)..];
        let peak = visible.iter().map(|&(_, count)| count).max().unwrap_or(0);
        if peak == 0 {
            return;
        }

        // right-align the newest bucket against the right edge
        let x0 = area.x + area.width - visible.len() as u16;
        for (offset, &(_, count)) in visible.iter().enumerate() {
            let style = if count == peak {
                Style::default().fg(tui_theme::HISTOGRAM_PEAK)
            } else {
                Style::default().fg(tui_theme::HISTOGRAM_BAR)
            };
            // bar height in eighths of a cell
            let eighths = (count * u64::from(area.height) * 8).div_ceil(peak);
            let x = x0 + offset as u16;
            for row in 0..area.height {
                let cell_eighths = eighths.saturating_sub(u64::from(row) * 8).min(8);
                if cell_eighths == 0 {
                    break;
                }
                let y = area.y + area.height - 1 - row;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(BAR_EIGHTHS[cell_eighths as usize - 1])
                        .set_style(style);
                }
            }
        }
    }
}
