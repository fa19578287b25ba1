//! Date and location normalization.
//!
//! Every function here is pure. Identity fingerprints are computed over the
//! output, so the same input must always normalize to the same string.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::{NOT_AVAILABLE, TO_BE_DETERMINED};

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b\.?";
const DAY: &str = r"(\d{1,2})(?:st|nd|rd|th)?";

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").expect("valid regex"));

// "March 18, 2026", "Mar 18-20, 2026", "Mar 30 - Apr 2 2026"
static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\s+{DAY}(?:\s*[-–]\s*(?:[a-z]+\.?\s+)?\d{{1,2}}(?:st|nd|rd|th)?)?,?\s+(\d{{4}})\b"
    ))
    .expect("valid regex")
});

// "18 March 2026", "18-20 Mar 2026", "18th of March, 2026"
static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DAY}(?:\s*[-–]\s*\d{{1,2}}(?:st|nd|rd|th)?)?\s+(?:of\s+)?{MONTH},?\s+(\d{{4}})\b"
    ))
    .expect("valid regex")
});

// US ordering, month first.
static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid regex"));

static LOCATION_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^location\s*:\s*").expect("valid regex"));

/// Parses free-form date text into a calendar date.
///
/// Accepts ISO dates, RFC 3339 timestamps and English month-name dates, and
/// will pull a date out of surrounding text ("Starts March 18, 2026 in Paris").
/// Returns `None` for empty input, `"N/A"`, or text without a day, month and
/// year; a missing year is never filled in from the current date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.date());
    }

    fuzzy_date(text)
}

/// [`parse_date`] rendered as canonical `YYYY-MM-DD`.
pub fn normalize_date(text: &str) -> Option<String> {
    parse_date(text).map(|date| date.format("%Y-%m-%d").to_string())
}

fn fuzzy_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE_RE.captures(text) {
        let date = ymd(&caps[1], &caps[2], &caps[3]);
        if date.is_some() {
            return date;
        }
    }
    if let Some(caps) = MONTH_FIRST_RE.captures(text) {
        let month = month_number(&caps[1])?;
        return ymd(&caps[3], &month.to_string(), &caps[2]);
    }
    if let Some(caps) = DAY_FIRST_RE.captures(text) {
        let month = month_number(&caps[2])?;
        return ymd(&caps[3], &month.to_string(), &caps[1]);
    }
    if let Some(caps) = SLASH_DATE_RE.captures(text) {
        return ymd(&caps[3], &caps[1], &caps[2]);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(token: &str) -> Option<u32> {
    let prefix: String = token.chars().take(3).collect::<String>().to_ascii_lowercase();
    let n = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

/// Collapses whitespace, drops a leading `Location:` label and maps an empty
/// result to `"TBD"`.
pub fn normalize_venue(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let venue = LOCATION_LABEL_RE.replace(&collapsed, "");
    let venue = venue.trim();
    if venue.is_empty() {
        TO_BE_DETERMINED.to_string()
    } else {
        venue.to_string()
    }
}

pub fn normalize_name(text: &str) -> String {
    collapse_whitespace(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
