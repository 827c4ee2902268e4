// logview-tui/src/widgets/logview/highlighter.rs
use std::collections::HashMap;

use ratatui::style::Style;
use regex::Regex;
use tracing::debug;

use crate::error::LogViewError;

/// A contiguous run of message bytes sharing one display style.
///
/// Spans use a half-open `[start, end)` byte convention; the spans
/// produced for a message always cover `[0, len)` with no gaps and no
/// overlaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleSpan {
    pub start: usize,
    pub end: usize,
    pub style: Style,
}

/// Compiles the highlight pattern and computes style spans for a single
/// message.
///
/// The pattern is a regular expression whose named capture groups can each
/// be mapped to a style. Groups without a registered style are treated as
/// not matched; their region falls back to the base style.
#[derive(Debug, Default)]
pub(crate) struct Highlighter {
    pattern: Option<Regex>,
    colors: HashMap<String, Style>,
}

impl Highlighter {
    /// Compile and install a new pattern, or disable highlighting with
    /// `None`. On a compile error the previous pattern stays active.
    pub fn set_pattern(&mut self, pattern: Option<&str>) -> Result<(), LogViewError> {
        match pattern {
            Some(pattern) => {
                let compiled = Regex::new(pattern)?;
                for group in self.unbound_groups(&compiled) {
                    debug!(group, "highlight pattern group has no registered style");
                }
                self.pattern = Some(compiled);
            }
            None => self.pattern = None,
        }
        Ok(())
    }

    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn set_color(&mut self, group: impl Into<String>, style: Style) {
        self.colors.insert(group.into(), style);
    }

    fn unbound_groups<'a>(&self, pattern: &'a Regex) -> Vec<&'a str> {
        pattern
            .capture_names()
            .flatten()
            .filter(|name| !self.colors.contains_key(*name))
            .collect()
    }

    /// Compute the ordered span list for one message.
    ///
    /// `base` is the resolved fallback style; when level highlighting is
    /// active it already carries the level background, which composites
    /// under every group style that does not define its own background
    /// (`Style::patch` precedence).
    pub fn build_spans(&self, message: &str, base: Style) -> Vec<StyleSpan> {
        let full = StyleSpan {
            start: 0,
            end: message.len(),
            style: base,
        };
        let Some(pattern) = &self.pattern else {
            return vec![full];
        };
        let Some(captures) = pattern.captures(message) else {
            return vec![full];
        };

        let mut spans = Vec::new();
        let mut pos = 0;
        for name in pattern.capture_names().flatten() {
            let Some(found) = captures.name(name) else {
                continue;
            };
            let Some(style) = self.colors.get(name) else {
                // unregistered group: region is absorbed into the base span
                continue;
            };
            // keep spans left-to-right and non-overlapping
            if found.start() < pos {
                continue;
            }
            if found.start() > pos {
                spans.push(StyleSpan {
                    start: pos,
                    end: found.start(),
                    style: base,
                });
            }
            spans.push(StyleSpan {
                start: found.start(),
                end: found.end(),
                style: base.patch(*style),
            });
            pos = found.end();
        }
        if pos < message.len() {
            spans.push(StyleSpan {
                start: pos,
                end: message.len(),
                style: base,
            });
        }
        if spans.is_empty() {
            return vec![full];
        }
        spans
    }
}
