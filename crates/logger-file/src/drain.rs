//! Per-tick drain of the queue into the file

use crate::error::{Error, Result};
use crate::handle::{FileHandleManager, FileLease};
use crate::queue::LineQueue;
use crate::report::ErrorReporter;

use std::sync::Arc;

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, trace};

/// What a single drain attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Queue was empty; nothing opened, nothing written
    Idle,
    /// Another drain was already in flight
    Busy,
    /// A batch was written in full
    Wrote(usize),
    /// The drain stopped on an error after writing this many lines
    Failed {
        /// Lines persisted before the failure
        written: usize,
    },
}

/// Moves bounded batches from the queue to the file.
///
/// At most one drain runs at a time; a concurrent [`tick`](Self::tick)
/// returns [`TickOutcome::Busy`] without touching the queue, while
/// [`drain_all`](Self::drain_all) waits its turn.
pub struct Drainer {
    queue: LineQueue,
    handles: FileHandleManager,
    batch_cap: usize,
    reporter: Arc<dyn ErrorReporter>,
    draining: AsyncMutex<()>,
}

impl Drainer {
    /// Create a drainer writing at most `batch_cap` lines per tick
    #[must_use]
    pub fn new(
        queue: LineQueue,
        handles: FileHandleManager,
        batch_cap: usize,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            queue,
            handles,
            batch_cap: batch_cap.max(1),
            reporter,
            draining: AsyncMutex::new(()),
        }
    }

    /// Queue this drainer reads from
    #[must_use]
    pub const fn queue(&self) -> &LineQueue {
        &self.queue
    }

    /// Handle manager this drainer writes through
    #[must_use]
    pub const fn handles(&self) -> &FileHandleManager {
        &self.handles
    }

    /// Run one drain: acquire the handle, write up to one batch in order.
    ///
    /// On a write failure the failing line and everything after it go back
    /// to the head of the queue and the handle is discarded. Failures are
    /// passed to the reporter, never returned.
    pub async fn tick(&self) -> TickOutcome {
        if self.queue.is_empty() {
            return TickOutcome::Idle;
        }

        let Ok(_guard) = self.draining.try_lock() else {
            trace!("drain already in flight");
            return TickOutcome::Busy;
        };

        self.drain_batch().await
    }

    /// Drain until the queue is empty or a batch fails.
    ///
    /// Waits for a drain already in flight instead of skipping it.
    /// Returns the number of lines written.
    pub async fn drain_all(&self) -> usize {
        let _guard = self.draining.lock().await;
        let mut total = 0;

        loop {
            match self.drain_batch().await {
                TickOutcome::Wrote(written) => total += written,
                TickOutcome::Failed { written } => {
                    total += written;
                    break;
                }
                TickOutcome::Idle | TickOutcome::Busy => break,
            }
        }

        total
    }

    // Caller holds `draining`
    async fn drain_batch(&self) -> TickOutcome {
        if self.queue.is_empty() {
            return TickOutcome::Idle;
        }

        let mut lease = match self.handles.acquire().await {
            Ok(lease) => lease,
            Err(e) => {
                self.reporter.report(&e);
                return TickOutcome::Failed { written: 0 };
            }
        };

        match self.write_queued(&mut lease).await {
            Ok(written) => {
                lease.touch();
                trace!(written, pending = self.queue.len(), "wrote log batch");
                TickOutcome::Wrote(written)
            }
            Err((written, e)) => {
                lease.invalidate();
                self.reporter.report(&e);
                TickOutcome::Failed { written }
            }
        }
    }

    /// Take one batch and write it line by line. On failure the unwritten
    /// tail is requeued at the head and the count written so far returned
    /// with the error.
    async fn write_queued<W: LineWriter>(
        &self,
        writer: &mut W,
    ) -> std::result::Result<usize, (usize, Error)> {
        let mut batch = self.queue.drain_batch(self.batch_cap).into_iter();
        let mut written = 0;

        while let Some(line) = batch.next() {
            if let Err(e) = writer.append(&line).await {
                let unwritten: Vec<String> = std::iter::once(line).chain(batch).collect();
                debug!(
                    written,
                    requeued = unwritten.len(),
                    "log batch interrupted"
                );
                self.queue.requeue_front(unwritten);
                return Err((written, e));
            }
            written += 1;
        }

        Ok(written)
    }
}

trait LineWriter {
    fn append(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send;
}

impl LineWriter for FileLease {
    async fn append(&mut self, line: &str) -> Result<()> {
        self.write_line(line).await
    }
}
