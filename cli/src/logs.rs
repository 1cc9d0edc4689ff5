//! Run log.
//!
//! Pipeline stages report progress through the `log_*` functions. Each entry
//! is timestamped, printed to stderr, and broadcast to in-process
//! subscribers (tests, or anything embedding the library).

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entries kept for a lagging subscriber before it starts missing some.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => "",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        }
    }
}

/// One line of the run log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, for detail lines under a step.
    #[serde(default)]
    pub indent: u8,
    pub at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            at: Utc::now(),
        }
    }

    pub fn with_indent(self, indent: u8) -> Self {
        Self { indent, ..self }
    }

    /// Console form: three spaces per indent level, then the level marker.
    pub fn render(&self) -> String {
        let pad = "   ".repeat(usize::from(self.indent) + 1);
        format!("{}{} {}", pad, self.level.marker(), self.message)
    }
}

/// The process-wide run log.
pub static RUN_LOG: Lazy<RunLog> = Lazy::new(RunLog::new);

/// Prints entries and fans them out to subscribers.
pub struct RunLog {
    sender: broadcast::Sender<LogEntry>,
    quiet: AtomicBool,
}

impl RunLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            quiet: AtomicBool::new(false),
        }
    }

    /// Stop (or resume) printing; subscribers still receive entries.
    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Relaxed);
    }

    pub fn emit(&self, entry: LogEntry) {
        if !self.quiet.load(Ordering::Relaxed) {
            eprintln!("{}", entry.render());
        }
        // Sending fails only when nobody listens.
        let _ = self.sender.send(entry);
    }

    /// Receive every entry emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log(level: LogLevel, msg: impl Into<String>, indent: u8) {
    RUN_LOG.emit(LogEntry::new(level, msg).with_indent(indent));
}

pub fn log_info(msg: impl Into<String>) {
    log(LogLevel::Info, msg, 0);
}

pub fn log_success(msg: impl Into<String>) {
    log(LogLevel::Success, msg, 0);
}

pub fn log_warning(msg: impl Into<String>) {
    log(LogLevel::Warning, msg, 0);
}

pub fn log_error(msg: impl Into<String>) {
    log(LogLevel::Error, msg, 0);
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    log(LogLevel::Info, msg, indent);
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    log(LogLevel::Warning, msg, indent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_marker_and_indent() {
        assert_eq!(
            LogEntry::new(LogLevel::Success, "Saved").render(),
            "   ✓ Saved"
        );
        assert_eq!(
            LogEntry::new(LogLevel::Info, "Class# 100")
                .with_indent(1)
                .render(),
            "       Class# 100"
        );
    }

    #[test]
    fn test_subscriber_receives_entries() {
        let run_log = RunLog::new();
        run_log.set_quiet(true);
        let mut rx = run_log.subscribe();

        run_log.emit(LogEntry::new(LogLevel::Warning, "Dry run").with_indent(2));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.message, "Dry run");
        assert_eq!(entry.indent, 2);
    }

    #[test]
    fn test_entry_json_shape() {
        let json = serde_json::to_value(LogEntry::new(LogLevel::Error, "boom")).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["indent"], 0);
        assert!(json["at"].is_string());
    }
}
