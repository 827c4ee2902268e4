// logview-tui/tests/logview_scenarios.rs
//
// End-to-end scenarios through the public API: ingest, wrap, follow,
// search and render as an application would drive them.

use std::collections::HashMap;
use std::sync::Arc;

use logview_tui::{
    LogEvent, LogLevel, LogVelocityView, LogView, RenderSink,
    ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget},
    tui_theme,
};

#[derive(Default)]
struct GridSink {
    cells: HashMap<(u16, u16), (char, Style)>,
}

impl RenderSink for GridSink {
    fn set_cell(&mut self, x: u16, y: u16, style: Style, ch: char) {
        self.cells.insert((x, y), (ch, style));
    }
}

impl GridSink {
    fn row(&self, y: u16, width: u16) -> String {
        (0..width)
            .map(|x| self.cells.get(&(x, y)).map_or(' ', |(ch, _)| *ch))
            .collect::<String>()
            .trim_end()
            .to_string()
    }
}

fn render(view: &LogView, width: u16, height: u16) -> GridSink {
    let mut sink = GridSink::default();
    view.render_into(&mut sink, width, height);
    sink
}

#[test]
fn tail_a_busy_stream_and_inspect_an_error() {
    let view = LogView::new();
    view.set_level_highlighting(true);
    view.set_highlight_color("req", Style::default().fg(tui_theme::COLOR_GOLD));
    view.set_highlight_pattern(Some(r"(?P<req>req-\d+)")).unwrap();

    for i in 0..200 {
        let mut event = LogEvent::new(format!("evt-{i}"), format!("handled req-{i}"));
        if i == 150 {
            event = event.with_level(LogLevel::Error);
        }
        view.append(event);
    }

    // following: the newest event sits on the bottom row
    let sink = render(&view, 40, 10);
    assert_eq!(sink.row(9, 40), "handled req-199");

    // jump to the error and stop following
    let hit = view
        .find_matching_event("", |e| e.level == LogLevel::Error)
        .unwrap();
    view.set_following(false);
    assert!(view.scroll_to_event_id(&hit.id));
    let sink = render(&view, 40, 10);
    assert_eq!(sink.row(0, 40), "handled req-150");
    let (_, style) = sink.cells[&(0, 0)];
    assert_eq!(style.bg, Some(tui_theme::ERROR_BG));

    // appends while detached do not move the viewport
    view.append(LogEvent::new("late", "handled req-200"));
    let sink = render(&view, 40, 10);
    assert_eq!(sink.row(0, 40), "handled req-150");

    // resuming follow returns to the tail
    view.set_following(true);
    let sink = render(&view, 40, 10);
    assert_eq!(sink.row(9, 40), "handled req-200");
}

#[test]
fn search_over_a_thousand_events_without_a_match() {
    let view = LogView::new();
    for i in 0..1000 {
        view.append(LogEvent::new(format!("evt-{i}"), format!("routine tick {i}")));
    }
    assert_eq!(view.find_total_matches(|e| e.message.contains("panic")), 0);
    assert!(view.find_matching_event("", |e| e.message.contains("panic")).is_none());
    assert_eq!(view.event_count(), 1000);
}

#[test]
fn repeated_search_cycles_through_all_matches() {
    let view = LogView::new();
    for i in 0..50 {
        let message = if i % 10 == 0 { "checkpoint" } else { "tick" };
        view.append(LogEvent::new(format!("evt-{i}"), message));
    }
    let predicate = |e: &LogEvent| e.message == "checkpoint";
    assert_eq!(view.find_total_matches(predicate), 5);

    let mut last = String::new();
    let mut seen = Vec::new();
    for _ in 0..6 {
        let hit = view.find_matching_event(&last, predicate).unwrap();
        last = hit.id.clone();
        seen.push(hit.id.clone());
    }
    assert_eq!(
        seen,
        vec!["evt-0", "evt-10", "evt-20", "evt-30", "evt-40", "evt-0"]
    );
}

#[test]
fn narrowing_the_terminal_rewraps_and_keeps_the_top_event() {
    let view = LogView::new();
    view.set_following(false);
    view.on_resize(40, 10);
    for i in 0..20 {
        view.append(LogEvent::new(
            format!("evt-{i}"),
            format!("{i:02} abcdefghijklmnopqrstuvwxyz"),
        ));
    }
    view.scroll_to_event_id("evt-5");
    let sink = render(&view, 40, 10);
    assert_eq!(sink.row(0, 40), "05 abcdefghijklmnopqrstuvwxyz");

    // narrower page: every message wraps, the top event stays on top
    let sink = render(&view, 10, 10);
    assert_eq!(sink.row(0, 10), "05 abcdefg");
    assert_eq!(sink.row(1, 10), "hijklmnopq");
    assert_eq!(view.current_event().unwrap().id, "evt-5");

    // widening collapses the wrap groups again
    let sink = render(&view, 60, 10);
    assert_eq!(sink.row(0, 60), "05 abcdefghijklmnopqrstuvwxyz");
    assert_eq!(sink.row(1, 60), "06 abcdefghijklmnopqrstuvwxyz");
}

#[test]
fn wrap_toggle_round_trips_the_line_count() {
    let view = LogView::new();
    view.on_resize(8, 5);
    view.append(LogEvent::new("evt-0", "a single long message to split"));
    let wrapped = view.line_count();
    assert!(wrapped > 1);

    view.set_wrap(false);
    assert_eq!(view.line_count(), 1);
    view.set_wrap(true);
    assert_eq!(view.line_count(), wrapped);
}

#[test]
fn widget_impl_draws_into_a_ratatui_buffer() {
    let view = LogView::new();
    view.append(LogEvent::new("evt-0", "hello buffer"));

    let area = Rect::new(2, 1, 20, 3);
    let mut buf = Buffer::empty(Rect::new(0, 0, 24, 5));
    (&view).render(area, &mut buf);

    let text: String = (0..12)
        .filter_map(|x| buf.cell((2 + x, 1)).map(|c| c.symbol().to_string()))
        .collect();
    assert_eq!(text, "hello buffer");
    // nothing leaks outside the widget area
    assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
}

#[test]
fn velocity_view_tracks_the_same_stream() {
    let view = Arc::new(LogView::new());
    let velocity = LogVelocityView::new(chrono::Duration::seconds(1));
    let start = chrono::Utc::now();
    for i in 0..10 {
        let event = LogEvent::new(format!("evt-{i}"), "tick")
            .with_timestamp(start + chrono::Duration::milliseconds(i * 250));
        velocity.append_event(&event);
        view.append(event);
    }
    assert_eq!(view.event_count(), 10);
    assert_eq!(velocity.event_total(), 10);
    let total: u64 = velocity.buckets_in_window().iter().map(|&(_, c)| c).sum();
    assert_eq!(total, 10);
}
