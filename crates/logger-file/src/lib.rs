//! File-mode write path for duolog
//!
//! Formatted lines go into an in-memory queue and are persisted later by a
//! periodic drain loop:
//! - The queue is unbounded and never blocks the caller
//! - Each tick writes at most one batch, in enqueue order
//! - The file handle is opened lazily, reused across bursts and closed after
//!   an idle window
//! - Failures are handed to an [`ErrorReporter`] and never stop the loop

#![warn(missing_docs, unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

mod config;
mod drain;
mod error;
mod handle;
mod queue;
mod report;
mod sink;

pub use config::{
    DEFAULT_BATCH_CAP, DEFAULT_IDLE_TIMEOUT, DEFAULT_TICK_INTERVAL, FileSinkConfig,
    FileSinkConfigBuilder, MIN_TICK_INTERVAL,
};
pub use drain::{Drainer, TickOutcome};
pub use error::{Error, Result};
pub use handle::{FileHandleManager, FileLease, HandleState};
pub use queue::LineQueue;
pub use report::{ErrorReporter, TracingReporter};
pub use sink::FileSink;
