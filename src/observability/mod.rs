//! Observability for kallbazdb
//!
//! Stores never write to a process-wide logger. Every store is handed a
//! [`DiagnosticSink`] at construction, so callers decide where diagnostics
//! go and tests can silence or capture them.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use kallbazdb::observability::{DiagnosticSink, Event, JsonLogger, Severity};
//!
//! let sink: Arc<dyn DiagnosticSink> = Arc::new(JsonLogger::new(Severity::Info));
//! sink.event(Event::StoreOpened, &[("path", "/var/lib/kallbazdb/store.db")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{format_line, JsonLogger, Severity};

use std::sync::{Arc, Mutex, PoisonError};

/// Destination for diagnostic log entries.
pub trait DiagnosticSink: Send + Sync {
    /// Record one entry. Must not fail or panic.
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]);

    /// Record a typed event at its default severity.
    fn event(&self, event: Event, fields: &[(&str, &str)]) {
        let severity = match event {
            Event::ScanFailed => Severity::Error,
            Event::WriteRejected => Severity::Warn,
            Event::RecordAppended => Severity::Trace,
            _ => Severity::Info,
        };
        self.log(severity, event.as_str(), fields);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn log(&self, _severity: Severity, _event: &str, _fields: &[(&str, &str)]) {}
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub severity: Severity,
    pub event: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Look up a field value by key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the entries recorded for `event`.
    pub fn entries_for(&self, event: Event) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.event == event.as_str())
            .collect()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let entry = LogEntry {
            severity,
            event: event.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_sink_accepts_everything() {
        let sink = SilentSink;
        sink.log(Severity::Error, "ANYTHING", &[("k", "v")]);
        sink.event(Event::StoreClosed, &[]);
    }

    #[test]
    fn test_memory_sink_captures_entries() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());

        sink.event(Event::StoreOpened, &[("path", "/tmp/store.db")]);
        sink.event(Event::ScanFailed, &[("error", "checksum")]);

        assert_eq!(sink.len(), 2);
        let entries = sink.entries();
        assert_eq!(entries[0].event, "STORE_OPENED");
        assert_eq!(entries[0].severity, Severity::Info);
        assert_eq!(entries[0].field("path"), Some("/tmp/store.db"));
        assert_eq!(entries[1].severity, Severity::Error);
    }

    #[test]
    fn test_memory_sink_clones_share_entries() {
        let sink = MemorySink::new();
        let shared: Arc<dyn DiagnosticSink> = Arc::new(sink.clone());

        shared.event(Event::StoreClosed, &[]);

        assert_eq!(sink.entries_for(Event::StoreClosed).len(), 1);
        assert!(sink.entries_for(Event::StoreOpened).is_empty());
    }

    #[test]
    fn test_event_default_severities() {
        let sink = MemorySink::new();
        sink.event(Event::WriteRejected, &[]);
        sink.event(Event::RecordAppended, &[]);

        let entries = sink.entries();
        assert_eq!(entries[0].severity, Severity::Warn);
        assert_eq!(entries[1].severity, Severity::Trace);
    }
}
