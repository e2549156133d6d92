//! Timestamp key type.

use std::fmt;

use chrono::NaiveDateTime;

use crate::common::config::TIMESTAMP_FORMAT;
use crate::common::{Error, Result};

/// The ordering key of every reading.
///
/// A `YYYY-MM-DD HH:MM:SS` string. Because every field is fixed-width and
/// zero-padded, string order is chronological order, so the index compares
/// timestamps as plain strings and never parses them on the hot path.
///
/// `From<&str>` builds a key without validation; this is the path records
/// loaded from the store take. Caller-supplied text goes through
/// [`Timestamp::parse`].
///
/// # Example
/// ```
/// use sensor_index::Timestamp;
///
/// let ts = Timestamp::parse("2024-01-01 00:05:00").unwrap();
/// assert!(Timestamp::from("2024-01-01 00:00:00") < ts);
/// assert_eq!(ts.hour_bucket(), "2024-01-01 00:00:00");
/// assert!(Timestamp::parse("yesterday").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(String);

impl Timestamp {
    /// Parse and normalize a caller-supplied timestamp.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if `s` is not a valid
    /// `YYYY-MM-DD HH:MM:SS` date and time.
    pub fn parse(s: &str) -> Result<Self> {
        NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
            .map(Self::from_datetime)
            .map_err(|e| Error::invalid_input("timestamp", s, e))
    }

    /// Format a `chrono` date-time as a key.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Timestamp(datetime.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Interpret the key as a date-time, if it is well formed.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, TIMESTAMP_FORMAT).ok()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The start of the hour this timestamp falls in (`YYYY-MM-DD HH:00:00`).
    ///
    /// Keys too short to carry an hour are returned unchanged.
    pub fn hour_bucket(&self) -> String {
        match self.0.get(..13) {
            Some(prefix) => format!("{prefix}:00:00"),
            None => self.0.clone(),
        }
    }

    /// The day this timestamp falls in (`YYYY-MM-DD`).
    pub fn day_bucket(&self) -> String {
        self.0.get(..10).unwrap_or(&self.0).to_string()
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Timestamp(s.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(s: String) -> Self {
        Timestamp(s)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::from_datetime(datetime)
    }
}

impl AsRef<str> for Timestamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
