//! Error types for logger construction and configuration

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a logger
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Locale tag that has no known date layout
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    /// File mode needs a runtime to drive the drain loop
    #[error("file mode requires a running Tokio runtime")]
    NoRuntime,

    /// Config file could not be parsed
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO operation failed
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),
}
