//! Background drain loop bundled with its queue and file handle

use crate::config::{FileSinkConfig, MIN_TICK_INTERVAL};
use crate::drain::Drainer;
use crate::handle::{FileHandleManager, HandleState};
use crate::queue::LineQueue;
use crate::report::ErrorReporter;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Queued file writer with a periodic drain loop.
///
/// [`enqueue`](Self::enqueue) never touches the disk; the loop started by
/// [`start`](Self::start) writes up to one batch per tick until
/// [`shutdown`](Self::shutdown) is called. Lines enqueued after shutdown
/// are dropped.
pub struct FileSink {
    drainer: Arc<Drainer>,
    shutdown_token: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl FileSink {
    /// Start the drain loop on the current Tokio runtime.
    ///
    /// A zero tick interval runs at [`MIN_TICK_INTERVAL`].
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn start(config: FileSinkConfig, reporter: Arc<dyn ErrorReporter>) -> Self {
        let drainer = Arc::new(Drainer::new(
            LineQueue::new(),
            FileHandleManager::new(config.path, config.idle_timeout),
            config.batch_cap,
            reporter,
        ));
        let shutdown_token = CancellationToken::new();

        let task = tokio::spawn(drain_loop(
            Arc::clone(&drainer),
            config.tick_interval.max(MIN_TICK_INTERVAL),
            shutdown_token.clone(),
        ));

        Self {
            drainer,
            shutdown_token,
            task: Mutex::new(Some(task)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Queue a formatted line for the next tick; dropped once shut down
    pub fn enqueue(&self, line: impl Into<String>) {
        if self.is_shut_down() {
            if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                warn!("log file sink is shut down, dropping lines");
            }
            return;
        }

        self.drainer.queue().enqueue(line);
    }

    /// Number of lines waiting to be written
    #[must_use]
    pub fn pending(&self) -> usize {
        self.drainer.queue().len()
    }

    /// Lifecycle state of the file handle
    #[must_use]
    pub fn handle_state(&self) -> HandleState {
        self.drainer.handles().state()
    }

    /// Number of times the file has been opened
    #[must_use]
    pub fn opens(&self) -> u64 {
        self.drainer.handles().opens()
    }

    /// Number of lines dropped because they arrived after shutdown
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Whether the drain loop has been stopped
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Write everything queued so far without stopping the loop.
    ///
    /// Returns the number of lines written.
    pub async fn flush(&self) -> usize {
        self.drainer.drain_all().await
    }

    /// Stop the loop, write everything still queued, then close the file.
    ///
    /// The tick in progress, if any, finishes first. Calling this more than
    /// once is harmless. Returns the number of lines written by the final
    /// drain.
    pub async fn shutdown(&self) -> usize {
        self.shutdown_token.cancel();

        let task = self.task.lock().take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            warn!("log drain loop ended abnormally: {e}");
        }

        let written = self.drainer.drain_all().await;
        self.drainer.handles().close().await;

        debug!(written, pending = self.pending(), "log file sink shut down");
        written
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}

async fn drain_loop(drainer: Arc<Drainer>, tick_interval: Duration, token: CancellationToken) {
    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        // Runs outside the select so a cancel never cuts a batch short
        drainer.tick().await;
    }

    debug!("log drain loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::report::TracingReporter;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_loop_drains_on_tick() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tick.log");
        let sink = FileSink::start(
            FileSinkConfig::builder()
                .path(&path)
                .tick_interval(Duration::from_millis(10))
                .build(),
            Arc::new(TracingReporter),
        );

        sink.enqueue("one\n");
        sink.enqueue("two\n");
        assert!(!path.exists());

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
        assert_eq!(sink.pending(), 0);

        sink.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_writes_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shutdown.log");
        let sink = FileSink::start(
            FileSinkConfig::builder()
                .path(&path)
                .tick_interval(Duration::from_secs(60))
                .batch_cap(5)
                .build(),
            Arc::new(TracingReporter),
        );

        // Let the immediate first tick pass with an empty queue
        tokio::time::sleep(Duration::from_millis(20)).await;

        for i in 0..23 {
            sink.enqueue(format!("{i}\n"));
        }

        assert_eq!(sink.shutdown().await, 23);
        assert!(sink.is_shut_down());
        assert_eq!(sink.handle_state(), HandleState::Closed);
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 23);

        // Second call is a no-op
        assert_eq!(sink.shutdown().await, 0);
    }

    #[tokio::test]
    async fn test_flush_keeps_loop_running() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flush.log");
        let sink = FileSink::start(
            FileSinkConfig::builder()
                .path(&path)
                .tick_interval(Duration::from_millis(10))
                .build(),
            Arc::new(TracingReporter),
        );

        sink.enqueue("flushed\n");
        sink.flush().await;
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "flushed\n");
        assert!(!sink.is_shut_down());

        sink.enqueue("ticked\n");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "flushed\nticked\n");

        sink.shutdown().await;
    }

    #[tokio::test]
    async fn test_zero_tick_interval_still_drains() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zero.log");
        let sink = FileSink::start(
            FileSinkConfig {
                path: Some(path.clone()),
                tick_interval: Duration::ZERO,
                ..FileSinkConfig::default()
            },
            Arc::new(TracingReporter),
        );

        sink.enqueue("x\n");
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(sink.pending(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");

        // Loop is still alive and stops cleanly
        assert_eq!(sink.shutdown().await, 0);
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("late.log");
        let sink = FileSink::start(
            FileSinkConfig::builder().path(&path).build(),
            Arc::new(TracingReporter),
        );

        sink.enqueue("kept\n");
        sink.shutdown().await;

        sink.enqueue("late\n");
        sink.enqueue("later\n");

        assert_eq!(sink.pending(), 0);
        assert_eq!(sink.dropped(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "kept\n");
    }
}
