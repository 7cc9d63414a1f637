//! Dual-mode logger
//!
//! Messages go either to the console, colored by level, or to a file through
//! an in-memory queue that a background loop drains in bounded batches.
//!
//! ```no_run
//! use duolog::{Level, Logger, LoggerConfig, Mode};
//!
//! # async fn run() -> duolog::Result<()> {
//! let config = LoggerConfig::builder()
//!     .mode(Mode::File)
//!     .file_path("out.log")
//!     .build()?;
//!
//! let logger = Logger::new(config)?;
//! logger.log("started");
//! logger.log((Level::Warning, "disk almost full"));
//!
//! logger.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod config;
mod console;
mod error;
pub mod format;
mod level;
mod logger;
mod record;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{LoggerConfig, LoggerConfigBuilder, Mode};
pub use console::{ConsoleReporter, ConsoleSink, StdConsole};
pub use error::{Error, Result};
pub use format::{DateTimeFormatPreset, FieldStyle, Formatter, Locale};
pub use level::{Level, ParseLevelError, RESET};
pub use logger::Logger;
pub use record::{LogEntry, LogInput};

// File sink types callers may need for reporters and inspection
pub use duolog_file::{ErrorReporter, FileSink, HandleState, TracingReporter};
