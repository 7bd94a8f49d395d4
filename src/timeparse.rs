//! Timestamp normalization for listing pages.
//!
//! Vietnamese listings mostly print elapsed time ("5 phút trước",
//! "2 giờ trước"), sometimes an absolute date ("05/03/2024 14:30").
//! [`normalize_time`] turns either into a local date-time. It never fails:
//! text it cannot read resolves to `now`, so every article keeps a sort key.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Elapsed-time units, checked in this order. The first hit wins.
const UNITS: &[(&[&str], fn(i64) -> Option<Duration>)] = &[
    (&["giây", "giay"], Duration::try_seconds),
    (&["phút", "phut"], Duration::try_minutes),
    (&["giờ", "gio"], Duration::try_hours),
    (&["ngày", "ngay"], Duration::try_days),
];

/// Absolute layouts, tried in order. `false` marks a date without a time of day.
const ABSOLUTE_FORMATS: &[(&str, bool)] = &[
    ("%d/%m/%Y %H:%M", true),
    ("%d/%m/%Y", false),
    ("%H:%M %d/%m/%Y", true),
];

/// Resolve `text` to an absolute local time, relative to `now`.
///
/// # Arguments
/// * `text` - Time as shown on a listing ("5 phút trước", "05/03/2024 09:15")
/// * `now` - Reference point for relative expressions
///
/// # Returns
/// The resolved time, or `now` when the text cannot be read.
pub fn normalize_time(text: &str, now: NaiveDateTime) -> NaiveDateTime {
    let text = text.trim().to_lowercase();

    if let Some(ts) = parse_relative(&text, now) {
        return ts;
    }
    if let Some(ts) = parse_absolute(&text) {
        return ts;
    }

    trace!(%text, "Unreadable timestamp; using now");
    now
}

/// `None` when no unit keyword matches, no integer is present, or the
/// arithmetic would leave chrono's range.
fn parse_relative(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let (_, unit) = UNITS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))?;

    let amount: i64 = FIRST_INTEGER.find(text)?.as_str().parse().ok()?;
    now.checked_sub_signed(unit(amount)?)
}

fn parse_absolute(text: &str) -> Option<NaiveDateTime> {
    ABSOLUTE_FORMATS.iter().find_map(|&(fmt, has_time)| {
        if has_time {
            NaiveDateTime::parse_from_str(text, fmt).ok()
        } else {
            NaiveDate::parse_from_str(text, fmt).ok()?.and_hms_opt(0, 0, 0)
        }
    })
}
