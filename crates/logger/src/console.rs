//! Console output for console mode

use crate::Level;
use crate::format::format_console_line;

use duolog_file::ErrorReporter;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Where console-mode lines go.
///
/// One call writes one already-colored line. Implementations are expected
/// to be synchronous and to swallow their own I/O failures.
pub trait ConsoleSink: Send + Sync + 'static {
    /// Write a line to the stream for `level`
    fn write(&self, level: Level, line: &str);
}

/// Writes Info to stdout and Warning/Error to stderr
#[derive(Debug, Clone, Default)]
pub struct StdConsole {
    /// Serializes writes so lines from both streams never interleave
    lock: Arc<Mutex<()>>,
}

impl StdConsole {
    /// Create a console sink over the process streams
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConsoleSink for StdConsole {
    fn write(&self, level: Level, line: &str) {
        let _guard = self.lock.lock();

        match level {
            Level::Info => {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{line}");
                let _ = stdout.flush();
            }
            Level::Warning | Level::Error => {
                let mut stderr = std::io::stderr().lock();
                let _ = writeln!(stderr, "{line}");
                let _ = stderr.flush();
            }
        }
    }
}

/// Reports file sink failures as red lines on the console's error stream.
///
/// Only a `debug` event goes to `tracing`, so a subscriber on stderr does not
/// print each failure twice.
pub struct ConsoleReporter {
    console: Arc<dyn ConsoleSink>,
}

impl ConsoleReporter {
    /// Report through `console`
    #[must_use]
    pub fn new(console: Arc<dyn ConsoleSink>) -> Self {
        Self { console }
    }
}

impl ErrorReporter for ConsoleReporter {
    fn report(&self, error: &duolog_file::Error) {
        tracing::debug!("log file sink error: {error}");
        self.console.write(
            Level::Error,
            &format_console_line(Level::Error, &error.to_string()),
        );
    }
}
