//! Logger configuration

use crate::format::{DateTimeFormatPreset, Locale};
use crate::{Error, Result};

use duolog_file::{
    DEFAULT_BATCH_CAP, DEFAULT_IDLE_TIMEOUT, DEFAULT_TICK_INTERVAL, FileSinkConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Output selection, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Colored lines on stdout/stderr
    #[default]
    Console,
    /// Queued appends to a file
    File,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "console"),
            Self::File => write!(f, "file"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "console" => Ok(Self::Console),
            "file" => Ok(Self::File),
            other => Err(Error::Configuration(format!("unknown mode: {other}"))),
        }
    }
}

/// Everything a [`Logger`](crate::Logger) needs at construction.
///
/// Deserializes from TOML with every field optional:
///
/// ```toml
/// mode = "file"
/// file_path = "out.log"
/// locale = "ru-RU"
/// time_to_close_file_ms = 1000
///
/// [date_time_format]
/// fractionalSecondDigits = 3
/// hour12 = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Console or file output
    pub mode: Mode,
    /// Target file for file mode, relative to `base_dir`
    pub file_path: Option<PathBuf>,
    /// Directory relative paths resolve against; defaults to the working
    /// directory
    pub base_dir: Option<PathBuf>,
    /// Timestamp conventions
    pub locale: Locale,
    /// Timestamp fields
    pub date_time_format: DateTimeFormatPreset,
    /// Idle window before the file handle closes
    #[serde(rename = "time_to_close_file_ms", with = "millis")]
    pub time_to_close_file: Duration,
    /// Interval between drain ticks
    #[serde(rename = "tick_interval_ms", with = "millis")]
    pub tick_interval: Duration,
    /// Maximum lines written per tick
    pub batch_cap: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Console,
            file_path: None,
            base_dir: None,
            locale: Locale::RuRu,
            date_time_format: DateTimeFormatPreset::default(),
            time_to_close_file: DEFAULT_IDLE_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            batch_cap: DEFAULT_BATCH_CAP,
        }
    }
}

impl LoggerConfig {
    /// Create a builder
    #[must_use]
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed or fails
    /// validation.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Io("error reading config file", e))?;
        Self::from_toml_str(&source)
    }

    /// Check values that can be rejected up front.
    ///
    /// A missing file path is not rejected here; it surfaces on the first
    /// drain and goes to the error reporter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a zero batch cap, a zero tick
    /// interval or an invalid preset.
    pub fn validate(&self) -> Result<()> {
        if self.batch_cap == 0 {
            return Err(Error::Configuration("batch_cap must be at least 1".into()));
        }
        if self.tick_interval.is_zero() {
            return Err(Error::Configuration(
                "tick_interval must be greater than zero".into(),
            ));
        }
        self.date_time_format.validate()
    }

    /// Target file with `base_dir` applied; absolute paths are kept as-is
    #[must_use]
    pub fn resolved_file_path(&self) -> Option<PathBuf> {
        let file_path = self.file_path.as_ref()?;
        if file_path.as_os_str().is_empty() {
            return None;
        }

        let base = self
            .base_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();
        Some(base.join(file_path))
    }

    /// Settings for the file sink
    #[must_use]
    pub fn file_sink_config(&self) -> FileSinkConfig {
        FileSinkConfig {
            path: self.resolved_file_path(),
            idle_timeout: self.time_to_close_file,
            tick_interval: self.tick_interval,
            batch_cap: self.batch_cap,
        }
    }
}

/// Builder for [`LoggerConfig`]
#[derive(Debug, Default)]
pub struct LoggerConfigBuilder {
    config: LoggerConfig,
}

impl LoggerConfigBuilder {
    /// Set the output mode
    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the target file
    #[must_use]
    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.file_path = Some(path.into());
        self
    }

    /// Set the directory relative paths resolve against
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = Some(dir.into());
        self
    }

    /// Set the timestamp locale
    #[must_use]
    pub const fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    /// Set the timestamp fields
    #[must_use]
    pub fn date_time_format(mut self, preset: DateTimeFormatPreset) -> Self {
        self.config.date_time_format = preset;
        self
    }

    /// Set the idle window before the file closes
    #[must_use]
    pub const fn time_to_close_file(mut self, timeout: Duration) -> Self {
        self.config.time_to_close_file = timeout;
        self
    }

    /// Set the drain tick interval
    #[must_use]
    pub const fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Set the per-tick batch cap
    #[must_use]
    pub const fn batch_cap(mut self, cap: usize) -> Self {
        self.config.batch_cap = cap;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<LoggerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
