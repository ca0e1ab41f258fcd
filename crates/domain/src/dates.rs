// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Text representations of dates and timestamps as stored in the database.
//!
//! Dates are `YYYY-MM-DD`; timestamps are UTC `YYYY-MM-DD HH:MM:SS`, the same
//! shape `SQLite` produces for `CURRENT_TIMESTAMP`. Both sort correctly as text.

use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::error::DomainError;

/// Parses a `YYYY-MM-DD` date. Malformed or blank input yields `None`.
#[must_use]
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Parses an optional date field, treating malformed input as absent.
#[must_use]
pub fn parse_optional_date(value: Option<&str>) -> Option<Date> {
    value.and_then(parse_date)
}

#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Formats a timestamp in UTC.
#[must_use]
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let at: OffsetDateTime = at.to_offset(time::UtcOffset::UTC);
    format!(
        "{} {:02}:{:02}:{:02}",
        format_date(at.date()),
        at.hour(),
        at.minute(),
        at.second()
    )
}

#[must_use]
pub fn format_time_of_day(at: OffsetDateTime) -> String {
    let at: OffsetDateTime = at.to_offset(time::UtcOffset::UTC);
    format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second())
}

/// Parses a stored UTC timestamp.
///
/// # Errors
///
/// Returns an error if the value is not in `YYYY-MM-DD HH:MM:SS` form.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(
        value.trim(),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map(PrimitiveDateTime::assume_utc)
    .map_err(|_| DomainError::InvalidTimestamp(value.to_string()))
}

/// Parses a number field, treating malformed or blank input as absent.
#[must_use]
pub fn parse_amount(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
