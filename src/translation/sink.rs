/*!
 * Injected logging for the translation core.
 *
 * The service never touches a global logger. It reports through a
 * `LogSink` handed to it at construction; the binary forwards entries to the
 * `log` facade, tests capture them.
 */

use log::Level;
use parking_lot::Mutex;

/// A single log record emitted by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Destination for the core's log records and progress updates
pub trait LogSink: Send + Sync {
    /// Record one entry
    fn log(&self, entry: LogEntry);

    /// Called after every completed batch with units processed so far
    fn progress(&self, _processed: usize, _total: usize) {}

    fn debug(&self, message: String) {
        self.log(LogEntry::new(Level::Debug, message));
    }

    fn info(&self, message: String) {
        self.log(LogEntry::new(Level::Info, message));
    }

    fn warn(&self, message: String) {
        self.log(LogEntry::new(Level::Warn, message));
    }

    fn error(&self, message: String) {
        self.log(LogEntry::new(Level::Error, message));
    }
}

/// Forwards entries to whatever logger the `log` facade has installed
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn log(&self, entry: LogEntry) {
        log::log!(target: "srtran", entry.level, "{}", entry.message);
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _entry: LogEntry) {}
}

/// Keeps entries and progress updates in memory
#[derive(Debug, Default)]
pub struct CaptureSink {
    entries: Mutex<Vec<LogEntry>>,
    progress: Mutex<Vec<(usize, usize)>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages logged at `level`
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|entry| entry.message.contains(needle))
    }

    /// `(processed, total)` pairs in the order they were reported
    pub fn progress_updates(&self) -> Vec<(usize, usize)> {
        self.progress.lock().clone()
    }
}

impl LogSink for CaptureSink {
    fn log(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }

    fn progress(&self, processed: usize, total: usize) {
        self.progress.lock().push((processed, total));
    }
}
