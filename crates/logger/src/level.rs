//! Log levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ANSI reset sequence, also used as the Info color
pub const RESET: &str = "\x1b[0m";

const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Severity of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    /// Informational message
    Info,
    /// Something unexpected that did not fail
    Warning,
    /// A failure
    Error,
}

impl Level {
    /// Upper-case label used in file output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// ANSI color sequence that prefixes console output
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Info => RESET,
            Self::Warning => YELLOW,
            Self::Error => RED,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, <Self as TryFrom<String>>::Error> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.as_str().to_ascii_lowercase()
    }
}
