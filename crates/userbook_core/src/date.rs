//! Date representation codec.
//!
//! # Responsibility
//! - Convert between the canonical stored form (`DD-MM-YYYY`), the picker
//!   form (`YYYY-MM-DD`), a human display string and a numeric sort key.
//!
//! # Invariants
//! - Every function is total: malformed input degrades, it never panics.
//! - `to_canonical(&to_picker(x)) == x` for every canonical `x`.
//! - `to_sort_key` is strictly increasing with calendar order for valid
//!   canonical dates; unknown dates map to `0`.
//! - Sort keys use UTC midnight, so they do not depend on the host timezone.

use crate::model::user::UserRecord;
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static CANONICAL_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2})-([0-9]{2})-([0-9]{4})$")
        .expect("canonical date pattern must compile")
});

const PICKER_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%b %-d, %Y";

/// Rewrites a canonical `DD-MM-YYYY` date as picker `YYYY-MM-DD`.
///
/// Any other input, including already-ISO values, is returned unchanged.
pub fn to_picker(value: &str) -> String {
    match CANONICAL_DATE_RE.captures(value) {
        Some(caps) => format!("{}-{}-{}", &caps[3], &caps[2], &caps[1]),
        None => value.to_string(),
    }
}

/// Rewrites a picker `YYYY-MM-DD` date as canonical `DD-MM-YYYY`.
///
/// Day and month are zero-padded. Canonical input is returned as-is, RFC 3339
/// timestamps are reduced to their calendar date, anything else passes through.
pub fn to_canonical(value: &str) -> String {
    if value.is_empty() || CANONICAL_DATE_RE.is_match(value) {
        return value.to_string();
    }

    let parts: Vec<&str> = value.split('-').collect();
    if let [year, month, day] = parts.as_slice() {
        if [year, month, day].iter().all(|part| is_digits(part)) {
            return format!("{day:0>2}-{month:0>2}-{year}");
        }
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(timestamp) => timestamp.date_naive().format("%d-%m-%Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// Renders a date as `Mon D, YYYY` (for example `Mar 15, 2030`).
///
/// Returns the input verbatim when it cannot be parsed.
pub fn to_display(value: &str) -> String {
    match parse_calendar_date(value) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => value.to_string(),
    }
}

/// Returns UTC-midnight epoch milliseconds for ordering comparisons.
///
/// Empty or unparseable input yields `0`.
pub fn to_sort_key(value: &str) -> i64 {
    parse_calendar_date(value)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or(0, |midnight| midnight.and_utc().timestamp_millis())
}

/// Orders two date strings by their sort keys.
pub fn compare_dates(left: &str, right: &str) -> Ordering {
    to_sort_key(left).cmp(&to_sort_key(right))
}

/// Stable ascending sort by availability date; unknown dates sort first.
pub fn sort_by_availability(records: &mut [UserRecord]) {
    records.sort_by_cached_key(|record| to_sort_key(&record.availability_date));
}

fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    let picker = to_picker(value);
    if let Ok(date) = NaiveDate::parse_from_str(&picker, PICKER_FORMAT) {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|timestamp| timestamp.date_naive())
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}
