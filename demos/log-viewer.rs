// logview-tui/demos/log-viewer.rs
//
// Streaming log viewer: a producer task feeds random events into a
// LogView and a LogVelocityView while the main loop handles keys.
//
//   q        quit
//   f        toggle follow mode
//   w        toggle line wrapping
//   t        toggle the timestamp/source header
//   n        jump to the next event mentioning a request
//   Up/Down  scroll by one line
//   PgUp/Dn  scroll by ten lines
//   Home/End jump to the first / last event

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use logview_tui::{
    LogEvent, LogLevel, LogVelocityView, LogView,
    ratatui::{
        self, Frame,
        crossterm::event::{self, Event, KeyCode, KeyEventKind},
        layout::{Constraint, Layout},
        style::Style,
    },
    tui_theme,
};
use rand::prelude::*;
use uuid::Uuid;

const WORDS: &[&str] = &[
    "connection", "established", "upstream", "replica", "handshake", "timeout", "retrying",
    "flushed", "commit", "rollback", "queue", "drained", "checkpoint", "compaction", "lease",
    "renewed", "expired", "snapshot", "applied", "rejected",
];

fn random_event(rng: &mut impl Rng) -> LogEvent {
    let level = match rng.gen_range(0..10) {
        0 => LogLevel::Error,
        1 | 2 => LogLevel::Warning,
        _ => LogLevel::Info,
    };
    let word_count = rng.gen_range(3..20);
    let mut message = (0..word_count)
        .map(|_| *WORDS.choose(rng).unwrap_or(&"tick"))
        .collect::<Vec<_>>()
        .join(" ");
    if rng.gen_bool(0.3) {
        message.push_str(&format!(" request={}", rng.gen_range(1000..9999)));
    }
    let source = ["ingest", "raft", "storage", "gateway"].choose(rng).unwrap_or(&"main");
    LogEvent::new(Uuid::new_v4().to_string(), message)
        .with_level(level)
        .with_source(*source)
}

fn configure(log: &LogView) -> Result<()> {
    log.set_level_highlighting(true);
    log.set_highlight_color("req", Style::default().fg(tui_theme::COLOR_GOLD));
    log.set_highlight_color("state", Style::default().fg(tui_theme::COLOR_TEAL));
    log.set_highlight_pattern(Some(
        r"(?P<req>request=\d+)|(?P<state>established|expired|rejected)",
    ))?;
    log.set_event_limit(5_000);
    log.set_show_timestamp(true);
    log.set_show_source(true);
    Ok(())
}

fn draw(frame: &mut Frame, log: &LogView, velocity: &LogVelocityView) {
    let [log_area, velocity_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(5)]).areas(frame.area());
    frame.render_widget(log, log_area);
    frame.render_widget(velocity, velocity_area);
}

#[tokio::main]
async fn main() -> Result<()> {
    let log = Arc::new(LogView::new());
    configure(&log)?;
    let velocity = Arc::new(LogVelocityView::new(chrono::Duration::seconds(1)));

    let producer = {
        let log = Arc::clone(&log);
        let velocity = Arc::clone(&velocity);
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            loop {
                let burst = rng.gen_range(1..6);
                for _ in 0..burst {
                    let event = random_event(&mut rng);
                    velocity.append_event(&event);
                    log.append(event);
                }
                tokio::time::sleep(Duration::from_millis(rng.gen_range(30..400))).await;
            }
        })
    };

    let mut terminal = ratatui::init();
    let mut last_hit = String::new();
    let mut header = true;
    let result = loop {
        if let Err(err) = terminal.draw(|frame| draw(frame, &log, &velocity)) {
            break Err(err.into());
        }
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
            KeyCode::Char('f') => {
                let following = log.following();
                log.set_following(!following);
            }
            KeyCode::Char('w') => {
                let wrap = log.wrap_enabled();
                log.set_wrap(!wrap);
            }
            KeyCode::Char('t') => {
                header = !header;
                log.set_show_timestamp(header);
                log.set_show_source(header);
            }
            KeyCode::Char('n') => {
                if let Some(hit) =
                    log.find_matching_event(&last_hit, |e| e.message.contains("request="))
                {
                    last_hit = hit.id.clone();
                    log.set_following(false);
                    log.scroll_to_event_id(&hit.id);
                }
            }
            KeyCode::Up => log.scroll_up(1),
            KeyCode::Down => log.scroll_down(1),
            KeyCode::PageUp => log.scroll_up(10),
            KeyCode::PageDown => log.scroll_down(10),
            KeyCode::Home => {
                log.set_following(false);
                log.scroll_to_top();
            }
            KeyCode::End => log.set_following(true),
            _ => {}
        }
    };
    producer.abort();
    ratatui::restore();
    result
}
