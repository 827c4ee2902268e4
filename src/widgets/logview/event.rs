// logview-tui/src/widgets/logview/event.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log event.
///
/// Warning and Error events can get a level-specific background when level
/// highlighting is enabled on the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// One log record ingested by the view. Immutable once appended.
///
/// - `id` is an opaque unique identifier used by search resume and
///   scroll-to-event navigation.
/// - `source` names whatever produced the event.
/// - `message` is the display text; tab characters are expanded to four
///   spaces at construction so byte offsets line up with screen columns.
/// - `data` is an optional structured payload carried along for detail
///   views; the viewport never inspects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub id: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl LogEvent {
    pub fn new(id: impl Into<String>, message: impl AsRef<str>) -> Self {
        let message = message.as_ref().replace('\t', "    ");
        Self {
            id: id.into(),
            source: String::new(),
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message,
            data: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_data(mut self, data: serde_json::Map<String, serde_json::Value>) -> Self {
        self.data = Some(data);
        self
    }
}
