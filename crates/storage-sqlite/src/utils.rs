//! Column codecs shared by the repositories.
//!
//! Timestamps are stored as fixed-width RFC 3339 text (microseconds, `Z`)
//! so that lexical order in SQLite matches chronological order. Money is
//! stored as decimal text, never as a float.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::errors::StorageError;

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(column: &'static str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| StorageError::corrupt(column, format!("{raw:?}: {e}")))
}

pub fn parse_optional_timestamp(
    column: &'static str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, StorageError> {
    raw.map(|r| parse_timestamp(column, r)).transpose()
}

pub fn parse_decimal(column: &'static str, raw: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw).map_err(|e| StorageError::corrupt(column, format!("{raw:?}: {e}")))
}

/// Parses a `FromStr` enum column such as a status or kind.
pub fn parse_enum<T>(column: &'static str, raw: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|e| StorageError::corrupt(column, e))
}
