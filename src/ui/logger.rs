//! Operator-facing log output
//!
//! A `Logger` is created once in `main` and handed by reference to every
//! operation. All output goes to stderr, so stdout stays clean for command
//! output such as `kd list` and rendered manifests.

use std::fmt::Display;
use std::io::Write;
use std::sync::{Arc, Mutex};

use console::Style;

/// Verbosity of a logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Debug,
}

enum Sink {
    Stderr,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

/// Prefixed, styled status lines
pub struct Logger {
    prefix: String,
    level: Level,
    sink: Sink,
}

impl Logger {
    pub fn new(prefix: impl Into<String>, level: Level) -> Self {
        Self {
            prefix: prefix.into(),
            level,
            sink: Sink::Stderr,
        }
    }

    /// A logger that records plain (unstyled) lines, for tests
    #[cfg(test)]
    pub fn capturing(level: Level) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let logger = Self {
            prefix: "kd".to_string(),
            level,
            sink: Sink::Buffer(Arc::clone(&buffer)),
        };
        (logger, buffer)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_debug(&self) -> bool {
        self.level >= Level::Debug
    }

    pub fn debug(&self, message: impl Display) {
        if self.is_debug() {
            self.emit(Style::new().dim(), message);
        }
    }

    pub fn log(&self, message: impl Display) {
        self.emit(Style::new(), message);
    }

    pub fn note(&self, message: impl Display) {
        self.emit(Style::new().bold().cyan(), message);
    }

    pub fn success(&self, message: impl Display) {
        self.emit(Style::new().bold().green(), message);
    }

    pub fn warn(&self, message: impl Display) {
        self.emit(Style::new().bold().yellow(), message);
    }

    pub fn error(&self, message: impl Display) {
        self.emit(Style::new().bold().red(), message);
    }

    fn emit(&self, style: Style, message: impl Display) {
        let line = format!("{}: {}", self.prefix, message);
        match &self.sink {
            Sink::Stderr => {
                eprintln!("{}", style.for_stderr().apply_to(line));
            }
            Sink::Buffer(buffer) => {
                if let Ok(mut buffer) = buffer.lock() {
                    let _ = writeln!(buffer, "{line}");
                }
            }
        }
    }
}
