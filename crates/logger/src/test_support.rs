//! In-memory console for asserting on console-mode output
//!
//! Enabled by the `test-support` feature.

use crate::{ConsoleSink, Level};
use parking_lot::Mutex;
use std::sync::Arc;

/// A console sink that records every line for later inspection
#[derive(Clone, Debug, Default)]
pub struct CaptureConsole {
    lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl CaptureConsole {
    /// Create an empty capture console
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines with the level they were written at
    #[must_use]
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().clone()
    }

    /// Lines written at `level`
    #[must_use]
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// Whether nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Check if any line contains `text`
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.lines.lock().iter().any(|(_, line)| line.contains(text))
    }

    /// Forget everything captured so far
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl ConsoleSink for CaptureConsole {
    fn write(&self, level: Level, line: &str) {
        self.lines.lock().push((level, line.to_string()));
    }
}
