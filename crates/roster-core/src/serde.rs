//! Serde helpers shared by the wire models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serializer;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serializes an optional date as `YYYY-MM-DD`. Pair with
/// `skip_serializing_if = "Option::is_none"`.
pub fn serialize_optional_date<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
        None => serializer.serialize_none(),
    }
}

/// Serializes an optional timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn serialize_optional_datetime<S>(
    value: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => serializer.collect_str(&ts.format(DATETIME_FORMAT)),
        None => serializer.serialize_none(),
    }
}

/// Parses `YYYY-MM-DD`, tolerating surrounding whitespace.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}
