// logview-tui/src/widgets/logview/search.rs
//!
//! Predicate search over distinct events. A wrapped event counts once no
//! matter how many render lines it occupies.

use std::sync::Arc;

use super::event::LogEvent;
use super::event_store::EventStore;

/// Count the events matching `predicate`.
pub(crate) fn find_total_matches<F>(store: &EventStore, predicate: F) -> usize
where
    F: Fn(&LogEvent) -> bool,
{
    store.events().filter(|event| predicate(event)).count()
}

/// Find the next matching event after `last_hit_id`, wrapping around to
/// the start of the store. An empty or unknown id scans from the
/// beginning. The previous hit itself is reconsidered last, so a lone
/// match keeps being found on repeated calls. Returns `None` only when
/// nothing matches.
pub(crate) fn find_matching_event<F>(
    store: &EventStore,
    last_hit_id: &str,
    predicate: F,
) -> Option<Arc<LogEvent>>
where
    F: Fn(&LogEvent) -> bool,
{
    let events: Vec<&Arc<LogEvent>> = store.events().collect();
    if events.is_empty() {
        return None;
    }
    let resume_at = if last_hit_id.is_empty() {
        None
    } else {
        events.iter().position(|event| event.id == last_hit_id)
    };
    let start = resume_at.map_or(0, |index| index + 1);
    let total = events.len();
    for step in 0..total {
        let event = events[(start + step) % total];
        if predicate(event) {
            return Some(Arc::clone(event));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::logview::event::LogEvent;

    fn store_with(messages: &[&str]) -> EventStore {
        let mut store = EventStore::new();
        store.set_wrap(false);
        for (i, message) in messages.iter().enumerate() {
            store.append(LogEvent::new(format!("e{}", i + 1), *message));
        }
        store
    }

    #[test]
    fn total_matches_counts_distinct_events() {
        let mut store = store_with(&[]);
        store.set_wrap(true);
        store.set_page_width(4);
        store.append(LogEvent::new("e1", "needle in a haystack"));
        store.append(LogEvent::new("e2", "nothing"));
        let hits = find_total_matches(&store, |e| e.message.contains("needle"));
        assert_eq!(hits, 1);
    }

    #[test]
    fn search_resumes_after_last_hit_and_wraps_around() {
        let store = store_with(&["miss", "hit", "miss", "hit", "miss"]);
        let predicate = |event: &LogEvent| event.message == "hit";

        let first = find_matching_event(&store, "", predicate).unwrap();
        assert_eq!(first.id, "e2");
        let second = find_matching_event(&store, "e2", predicate).unwrap();
        assert_eq!(second.id, "e4");
        let wrapped = find_matching_event(&store, "e4", predicate).unwrap();
        assert_eq!(wrapped.id, "e2");
    }

    #[test]
    fn unknown_resume_id_scans_from_the_start() {
        let store = store_with(&["miss", "hit"]);
        let found = find_matching_event(&store, "gone", |e| e.message == "hit").unwrap();
        assert_eq!(found.id, "e2");
    }

    #[test]
    fn lone_match_is_found_again() {
        let store = store_with(&["hit", "miss"]);
        let found = find_matching_event(&store, "e1", |e| e.message == "hit").unwrap();
        assert_eq!(found.id, "e1");
    }

    #[test]
    fn no_match_and_empty_store_return_none() {
        let empty = store_with(&[]);
        assert!(find_matching_event(&empty, "", |_| true).is_none());

        let store = store_with(&["a", "b"]);
        assert!(find_matching_event(&store, "", |e| e.message == "z").is_none());
        assert_eq!(find_total_matches(&store, |e| e.message == "z"), 0);
    }
}
