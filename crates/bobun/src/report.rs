//! User-facing reporting.
//!
//! The orchestrator never prints directly. It talks to a [`Reporter`], so a
//! build can be driven against the terminal or recorded in memory.

use parking_lot::Mutex;

use crate::ui;

/// Severity of a reported line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Log,
    Info,
    Warn,
    Error,
    Success,
}

/// Sink for user-facing messages.
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: &str);

    fn log(&self, message: &str) {
        self.report(Level::Log, message);
    }

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }

    fn success(&self, message: &str) {
        self.report(Level::Success, message);
    }
}

/// Writes to stderr through [`crate::ui`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn report(&self, level: Level, message: &str) {
        match level {
            Level::Log => ui::log(message),
            Level::Info => ui::info(message),
            Level::Warn => ui::warning(message),
            Level::Error => ui::error(message),
            Level::Success => ui::success(message),
        }
    }
}

/// Keeps every reported line, in order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    /// Messages reported at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, level: Level, message: &str) {
        (**self).report(level, message);
    }
}
