//! Observable store events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events in a store's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// Store handle constructed
    StoreOpened,
    /// Store handle closed
    StoreClosed,
    /// Frame appended to the log
    RecordAppended,
    /// Write refused before touching the log
    WriteRejected,
    /// Scan stopped on a terminal error
    ScanFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::StoreClosed => "STORE_CLOSED",
            Event::RecordAppended => "RECORD_APPENDED",
            Event::WriteRejected => "WRITE_REJECTED",
            Event::ScanFailed => "SCAN_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
