//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields in alphabetical order
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use super::DiagnosticSink;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sink that prints JSON lines: errors to stderr, everything else to stdout.
#[derive(Debug, Clone, Copy)]
pub struct JsonLogger {
    min_severity: Severity,
    /// Send every line to stderr, leaving stdout for command output
    stderr_only: bool,
}

impl JsonLogger {
    /// Create a logger that drops entries below `min_severity`
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            stderr_only: false,
        }
    }

    /// Like [`JsonLogger::new`] but writes every line to stderr
    pub fn stderr_only(min_severity: Severity) -> Self {
        Self {
            min_severity,
            stderr_only: true,
        }
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }
}

impl Default for JsonLogger {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl DiagnosticSink for JsonLogger {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < self.min_severity {
            return;
        }
        if self.stderr_only || severity >= Severity::Error {
            write_line(severity, event, fields, &mut io::stderr());
        } else {
            write_line(severity, event, fields, &mut io::stdout());
        }
    }
}

/// Write one formatted line to `writer`, ignoring write failures.
fn write_line<W: Write>(severity: Severity, event: &str, fields: &[(&str, &str)], writer: &mut W) {
    let line = format_line(severity, event, fields);
    // Logging must never fail the operation being logged
    let _ = writer.write_all(line.as_bytes());
    let _ = writer.flush();
}

/// Render one log entry as a newline-terminated JSON object.
pub fn format_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(128);

    output.push_str("{\"event\":\"");
    escape_json_string(&mut output, event);
    output.push_str("\",\"severity\":\"");
    output.push_str(severity.as_str());
    output.push('"');

    let mut sorted_fields: Vec<_> = fields.iter().collect();
    sorted_fields.sort_by_key(|(k, _)| *k);

    for (key, value) in sorted_fields {
        output.push_str(",\"");
        escape_json_string(&mut output, key);
        output.push_str("\":\"");
        escape_json_string(&mut output, value);
        output.push('"');
    }

    output.push_str("}\n");
    output
}

fn escape_json_string(output: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
}
