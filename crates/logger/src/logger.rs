//! The logger facade

use crate::config::{LoggerConfig, Mode};
use crate::console::{ConsoleReporter, ConsoleSink, StdConsole};
use crate::format::Formatter;
use crate::{Error, Level, LogInput, Result};

use duolog_file::{ErrorReporter, FileSink};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

enum Output {
    Console(Arc<dyn ConsoleSink>),
    File(FileSink),
}

/// Single entry point for logging.
///
/// In console mode every call writes one colored line synchronously. In
/// file mode a call only formats and queues the line; a background drain
/// loop appends it to the file on a later tick.
pub struct Logger {
    formatter: Formatter,
    output: Output,
}

impl Logger {
    /// Create a logger writing to the process console
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or if file mode is
    /// selected outside of a Tokio runtime.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::with_console(config, Arc::new(StdConsole::new()))
    }

    /// Create a logger with an injected console sink.
    ///
    /// File sink failures are reported as red lines on this console.
    ///
    /// # Errors
    ///
    /// See [`Logger::new`].
    pub fn with_console(config: LoggerConfig, console: Arc<dyn ConsoleSink>) -> Result<Self> {
        let reporter = Arc::new(ConsoleReporter::new(Arc::clone(&console)));
        Self::with_reporter(config, console, reporter)
    }

    /// Create a logger with an injected console sink and error reporter
    ///
    /// # Errors
    ///
    /// See [`Logger::new`].
    pub fn with_reporter(
        config: LoggerConfig,
        console: Arc<dyn ConsoleSink>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self> {
        config.validate()?;

        let formatter = Formatter::new(config.locale, config.date_time_format.clone());

        let output = match config.mode {
            Mode::Console => Output::Console(console),
            Mode::File => {
                tokio::runtime::Handle::try_current().map_err(|_| Error::NoRuntime)?;
                let sink_config = config.file_sink_config();
                debug!(path = ?sink_config.path, "starting file logger");
                Output::File(FileSink::start(sink_config, reporter))
            }
        };

        Ok(Self { formatter, output })
    }

    /// Output mode chosen at construction
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.output {
            Output::Console(_) => Mode::Console,
            Output::File(_) => Mode::File,
        }
    }

    /// The file sink, in file mode
    #[must_use]
    pub fn file_sink(&self) -> Option<&FileSink> {
        match &self.output {
            Output::File(sink) => Some(sink),
            Output::Console(_) => None,
        }
    }

    /// Log a message or a leveled record
    pub fn log(&self, input: impl Into<LogInput>) {
        let entry = input.into().into_entry();

        match &self.output {
            Output::Console(console) => {
                console.write(entry.level, &self.formatter.console_line(&entry));
            }
            Output::File(sink) => sink.enqueue(self.formatter.file_line(&entry)),
        }
    }

    /// Log a dynamic value; shapes other than a string or a
    /// `{level, message}` object are ignored
    pub fn log_value(&self, value: &Value) {
        if let Some(input) = LogInput::from_value(value) {
            self.log(input);
        }
    }

    /// Log at Info
    pub fn info(&self, message: impl Into<String>) {
        self.log((Level::Info, message));
    }

    /// Log at Warning
    pub fn warn(&self, message: impl Into<String>) {
        self.log((Level::Warning, message));
    }

    /// Log at Error
    pub fn error(&self, message: impl Into<String>) {
        self.log((Level::Error, message));
    }

    /// Write everything queued so far. No-op in console mode.
    ///
    /// Returns the number of lines written.
    pub async fn flush(&self) -> usize {
        match &self.output {
            Output::File(sink) => sink.flush().await,
            Output::Console(_) => 0,
        }
    }

    /// Stop the drain loop, write everything queued and close the file.
    /// No-op in console mode.
    ///
    /// In file mode, lines logged afterwards are dropped and counted in
    /// [`FileSink::dropped`].
    ///
    /// Returns the number of lines written by the final drain.
    pub async fn shutdown(&self) -> usize {
        match &self.output {
            Output::File(sink) => sink.shutdown().await,
            Output::Console(_) => 0,
        }
    }
}
