//! Log entries and the shapes `log` accepts

use crate::Level;
use chrono::{DateTime, Local};
use serde_json::Value;

/// A message stamped with its level and creation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: Level,
    /// The log message
    pub message: String,
    /// When the entry was created
    pub timestamp: DateTime<Local>,
}

impl LogEntry {
    /// Create an entry stamped with the current local time
    #[must_use]
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::at(level, message, Local::now())
    }

    /// Create an entry with an explicit timestamp
    #[must_use]
    pub fn at(level: Level, message: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp,
        }
    }
}

/// A log request: a bare message (logged at Info) or a leveled record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogInput {
    /// Bare message, implicitly [`Level::Info`]
    Message(String),
    /// Message with an explicit level
    Record {
        /// Log level
        level: Level,
        /// The log message
        message: String,
    },
}

impl LogInput {
    /// Interpret a dynamic value.
    ///
    /// Strings become messages and objects with a known `level` and a
    /// present `message` become records. Everything else (null, numbers,
    /// arrays, objects with missing or unknown fields) yields `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(message) => Some(Self::Message(message.clone())),
            Value::Object(fields) => {
                let level = fields.get("level")?.as_str()?.parse().ok()?;
                let message = match fields.get("message")? {
                    Value::Null => return None,
                    Value::String(message) => message.clone(),
                    other => other.to_string(),
                };
                Some(Self::Record { level, message })
            }
            _ => None,
        }
    }

    /// Level this input is logged at
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::Message(_) => Level::Info,
            Self::Record { level, .. } => *level,
        }
    }

    /// Stamp the input with the current time
    #[must_use]
    pub fn into_entry(self) -> LogEntry {
        let level = self.level();
        match self {
            Self::Message(message) | Self::Record { message, .. } => LogEntry::new(level, message),
        }
    }
}

impl From<&str> for LogInput {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for LogInput {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl<S: Into<String>> From<(Level, S)> for LogInput {
    fn from((level, message): (Level, S)) -> Self {
        Self::Record {
            level,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_message_is_info() {
        let input = LogInput::from("x");
        assert_eq!(input.level(), Level::Info);

        let entry = input.into_entry();
        assert_eq!(entry.level, Level::Info);
        assert_eq!(entry.message, "x");
    }

    #[test]
    fn test_from_value_accepts_strings_and_records() {
        assert_eq!(
            LogInput::from_value(&json!("plain")),
            Some(LogInput::Message("plain".to_string()))
        );
        assert_eq!(
            LogInput::from_value(&json!({"level": "error", "message": "boom"})),
            Some(LogInput::Record {
                level: Level::Error,
                message: "boom".to_string()
            })
        );
        assert_eq!(
            LogInput::from_value(&json!({"level": "warn", "message": 7})),
            Some(LogInput::Record {
                level: Level::Warning,
                message: "7".to_string()
            })
        );
    }

    #[test]
    fn test_from_value_ignores_invalid_shapes() {
        for value in [
            json!(null),
            json!(42),
            json!(true),
            json!(["a"]),
            json!({}),
            json!({"message": "no level"}),
            json!({"level": "verbose", "message": "x"}),
            json!({"level": "info"}),
            json!({"level": "info", "message": null}),
        ] {
            assert_eq!(LogInput::from_value(&value), None, "{value}");
        }
    }
}
