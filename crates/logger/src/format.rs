//! Turning entries into output lines
//!
//! File lines look like `[INFO, 05.03.2024, 09:07:01.042]: message \n` for
//! the default `ru-RU` locale. The locale picks field order and separators;
//! the [`DateTimeFormatPreset`] picks padding, precision and clock style.

use crate::level::RESET;
use crate::{Error, Level, LogEntry};

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

/// How a numeric date/time field is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldStyle {
    /// No padding; full year
    Numeric,
    /// Zero-padded to two digits; years keep their last two digits
    #[serde(rename = "2-digit")]
    TwoDigit,
}

impl FieldStyle {
    fn push(self, out: &mut String, value: u32) {
        let _ = match self {
            Self::Numeric => write!(out, "{value}"),
            Self::TwoDigit => write!(out, "{value:02}"),
        };
    }

    fn push_year(self, out: &mut String, year: i32) {
        let _ = match self {
            Self::Numeric => write!(out, "{year}"),
            Self::TwoDigit => write!(out, "{:02}", year.rem_euclid(100)),
        };
    }
}

/// Which date/time fields appear and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DateTimeFormatPreset {
    /// Day of month
    pub day: FieldStyle,
    /// Month number
    pub month: FieldStyle,
    /// Year
    pub year: FieldStyle,
    /// Hour
    pub hour: FieldStyle,
    /// Minute
    pub minute: FieldStyle,
    /// Second
    pub second: FieldStyle,
    /// Digits of sub-second precision, 0 to 3
    pub fractional_second_digits: u8,
    /// 12-hour clock with an AM/PM suffix
    pub hour12: bool,
}

impl Default for DateTimeFormatPreset {
    fn default() -> Self {
        Self {
            day: FieldStyle::TwoDigit,
            month: FieldStyle::TwoDigit,
            year: FieldStyle::Numeric,
            hour: FieldStyle::TwoDigit,
            minute: FieldStyle::TwoDigit,
            second: FieldStyle::TwoDigit,
            fractional_second_digits: 3,
            hour12: false,
        }
    }
}

impl DateTimeFormatPreset {
    /// Check the preset can be rendered
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if more than 3 fractional digits are
    /// requested.
    pub fn validate(&self) -> Result<(), Error> {
        if self.fractional_second_digits > 3 {
            return Err(Error::Configuration(format!(
                "fractionalSecondDigits must be between 0 and 3, got {}",
                self.fractional_second_digits
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum DateOrder {
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

/// Regional conventions for rendering timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Locale {
    /// `05.03.2024, 09:07:01.042`
    #[default]
    RuRu,
    /// `05.03.2024, 09:07:01,042`
    DeDe,
    /// `05/03/2024, 09:07:01.042`
    EnGb,
    /// `03/05/2024, 09:07:01.042`
    EnUs,
    /// `2024-03-05 09:07:01,042`
    SvSe,
}

impl Locale {
    /// BCP 47 tag
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::RuRu => "ru-RU",
            Self::DeDe => "de-DE",
            Self::EnGb => "en-GB",
            Self::EnUs => "en-US",
            Self::SvSe => "sv-SE",
        }
    }

    const fn order(self) -> DateOrder {
        match self {
            Self::RuRu | Self::DeDe | Self::EnGb => DateOrder::DayMonthYear,
            Self::EnUs => DateOrder::MonthDayYear,
            Self::SvSe => DateOrder::YearMonthDay,
        }
    }

    const fn date_separator(self) -> char {
        match self {
            Self::RuRu | Self::DeDe => '.',
            Self::EnGb | Self::EnUs => '/',
            Self::SvSe => '-',
        }
    }

    const fn date_time_separator(self) -> &'static str {
        match self {
            Self::SvSe => " ",
            _ => ", ",
        }
    }

    const fn fraction_separator(self) -> char {
        match self {
            Self::DeDe | Self::SvSe => ',',
            _ => '.',
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "ru" | "ru-ru" => Ok(Self::RuRu),
            "de" | "de-de" => Ok(Self::DeDe),
            "en-gb" => Ok(Self::EnGb),
            "en" | "en-us" => Ok(Self::EnUs),
            "sv" | "sv-se" => Ok(Self::SvSe),
            _ => Err(Error::UnknownLocale(s.to_string())),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.tag().to_string()
    }
}

/// Render a timestamp per locale and preset
#[must_use]
pub fn format_timestamp(
    timestamp: &NaiveDateTime,
    locale: Locale,
    preset: &DateTimeFormatPreset,
) -> String {
    let mut out = String::with_capacity(24);
    let sep = locale.date_separator();

    match locale.order() {
        DateOrder::DayMonthYear => {
            preset.day.push(&mut out, timestamp.day());
            out.push(sep);
            preset.month.push(&mut out, timestamp.month());
            out.push(sep);
            preset.year.push_year(&mut out, timestamp.year());
        }
        DateOrder::MonthDayYear => {
            preset.month.push(&mut out, timestamp.month());
            out.push(sep);
            preset.day.push(&mut out, timestamp.day());
            out.push(sep);
            preset.year.push_year(&mut out, timestamp.year());
        }
        DateOrder::YearMonthDay => {
            preset.year.push_year(&mut out, timestamp.year());
            out.push(sep);
            preset.month.push(&mut out, timestamp.month());
            out.push(sep);
            preset.day.push(&mut out, timestamp.day());
        }
    }

    out.push_str(locale.date_time_separator());

    let (pm, hour) = if preset.hour12 {
        let (pm, hour) = timestamp.hour12();
        (Some(pm), hour)
    } else {
        (None, timestamp.hour())
    };

    preset.hour.push(&mut out, hour);
    out.push(':');
    preset.minute.push(&mut out, timestamp.minute());
    out.push(':');
    preset.second.push(&mut out, timestamp.second());

    let digits = u32::from(preset.fractional_second_digits.min(3));
    if digits > 0 {
        // Leap seconds report nanos past 1e9
        let millis = (timestamp.nanosecond() / 1_000_000).min(999);
        let fraction = millis / 10u32.pow(3 - digits);
        out.push(locale.fraction_separator());
        let _ = write!(out, "{fraction:0width$}", width = digits as usize);
    }

    if let Some(pm) = pm {
        out.push_str(if pm { " PM" } else { " AM" });
    }

    out
}

/// Render a file line: `[LEVEL, timestamp]: message \n`
#[must_use]
pub fn format_file_line(
    level: Level,
    message: &str,
    timestamp: &NaiveDateTime,
    locale: Locale,
    preset: &DateTimeFormatPreset,
) -> String {
    format!(
        "[{level}, {}]: {message} \n",
        format_timestamp(timestamp, locale, preset)
    )
}

/// Render a console line: the message wrapped in the level color and a reset
#[must_use]
pub fn format_console_line(level: Level, message: &str) -> String {
    format!("{}{message}{RESET}", level.color())
}

/// Locale and preset bundled for formatting entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Formatter {
    locale: Locale,
    preset: DateTimeFormatPreset,
}

impl Formatter {
    /// Create a formatter
    #[must_use]
    pub const fn new(locale: Locale, preset: DateTimeFormatPreset) -> Self {
        Self { locale, preset }
    }

    /// File line for an entry, using its local wall-clock time
    #[must_use]
    pub fn file_line(&self, entry: &LogEntry) -> String {
        format_file_line(
            entry.level,
            &entry.message,
            &entry.timestamp.naive_local(),
            self.locale,
            &self.preset,
        )
    }

    /// Console line for an entry
    #[must_use]
    pub fn console_line(&self, entry: &LogEntry) -> String {
        format_console_line(entry.level, &entry.message)
    }
}
