//! File sink configuration

use std::path::PathBuf;
use std::time::Duration;

/// Default idle window before the file handle is closed
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default interval between drain ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Default maximum number of lines written per tick
pub const DEFAULT_BATCH_CAP: usize = 50;

/// Shortest tick interval the drain loop runs with
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Settings for a [`FileSink`](crate::FileSink)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSinkConfig {
    /// File to append to; `None` is reported on the first drain
    pub path: Option<PathBuf>,
    /// Close the handle after this long without a write
    pub idle_timeout: Duration,
    /// Interval between drain ticks
    pub tick_interval: Duration,
    /// Maximum number of lines written per tick
    pub batch_cap: usize,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            path: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            batch_cap: DEFAULT_BATCH_CAP,
        }
    }
}

impl FileSinkConfig {
    /// Create a builder
    #[must_use]
    pub fn builder() -> FileSinkConfigBuilder {
        FileSinkConfigBuilder::default()
    }
}

/// Builder for [`FileSinkConfig`]
#[derive(Debug, Default)]
pub struct FileSinkConfigBuilder {
    config: FileSinkConfig,
}

impl FileSinkConfigBuilder {
    /// Set the target file
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    /// Set the idle window
    #[must_use]
    pub const fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Set the tick interval; zero is bumped to [`MIN_TICK_INTERVAL`]
    #[must_use]
    pub const fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = if interval.is_zero() {
            MIN_TICK_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Set the per-tick batch cap; zero is bumped to one
    #[must_use]
    pub fn batch_cap(mut self, cap: usize) -> Self {
        self.config.batch_cap = cap.max(1);
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> FileSinkConfig {
        self.config
    }
}
