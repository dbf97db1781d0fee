//! Fixed-width field formatting primitives for V11 records.
//!
//! Overflow of a fixed-width slot is a data-contract violation and fails
//! hard; absent or malformed amounts and dates degrade to zero-filled fields
//! so that one bad value never aborts a whole batch.

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Right-align `input` in a zero-filled field of `length` characters.
///
/// Absent input yields an all-zero field. Input wider than the field fails
/// with [`Error::FieldOverflow`].
pub fn pad_left_zeroes(input: Option<&str>, length: usize) -> Result<String> {
    let input = input.unwrap_or("");
    if input.chars().count() > length {
        return Err(overflow(input, length));
    }
    Ok(format!("{:0>width$}", input, width = length))
}

/// Left-align `input` in a space-filled field of `length` characters.
///
/// Absent input yields an all-space field. Input wider than the field fails
/// with [`Error::FieldOverflow`].
pub fn pad_right_spaces(input: Option<&str>, length: usize) -> Result<String> {
    let input = input.unwrap_or("");
    if input.chars().count() > length {
        return Err(overflow(input, length));
    }
    Ok(format!("{:<width$}", input, width = length))
}

/// Format a decimal amount to two fraction digits, strip the decimal point
/// and zero-pad to `length` (`"123.4"` becomes `"00012340"` at length 8).
///
/// Absent or malformed amounts degrade to an all-zero field. A well-formed
/// amount wider than the field still fails with [`Error::FieldOverflow`].
pub fn pad_without_dot(amount: Option<&str>, length: usize) -> Result<String> {
    let raw = match amount.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok("0".repeat(length)),
    };

    match Decimal::from_str(raw) {
        Ok(value) => pad_decimal_without_dot(value, length),
        Err(_) => {
            tracing::warn!(amount = raw, "malformed amount, writing zero-filled field");
            Ok("0".repeat(length))
        }
    }
}

/// [`pad_without_dot`] for an already-parsed amount, used for group totals.
pub fn pad_decimal_without_dot(value: Decimal, length: usize) -> Result<String> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded).replace('.', "");
    pad_left_zeroes(Some(&digits), length)
}

/// Render a camt date as `YYYYMMDD`.
///
/// Absent or unparsable dates degrade to `"00000000"`.
pub fn format_date_v4(date: Option<&str>) -> String {
    match parse_camt_date(date) {
        Some(date) => date.format("%Y%m%d").to_string(),
        None => "00000000".to_string(),
    }
}

/// Render a camt date as `YYMMDD` (2-digit year).
///
/// Absent or unparsable dates degrade to `"000000"`.
pub fn format_date_v3(date: Option<&str>) -> String {
    match parse_camt_date(date) {
        Some(date) => date.format("%y%m%d").to_string(),
        None => "000000".to_string(),
    }
}

/// Parse an ISO date (`2016-05-06`) or date-time (`2016-05-06T23:01:15`,
/// with or without a trailing offset).
fn parse_camt_date(date: Option<&str>) -> Option<NaiveDate> {
    let raw = date?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    // Time zone suffixes and fractional seconds still start with the date.
    if let Some(prefix) = raw.get(0..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date);
        }
    }

    tracing::warn!(date = raw, "unparsable date, writing zero-filled field");
    None
}

fn overflow(value: &str, width: usize) -> Error {
    Error::FieldOverflow {
        value: value.to_string(),
        width,
    }
}
