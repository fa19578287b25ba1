//! Core domain model for the AI events catalog.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub mod normalize;

pub use normalize::{normalize_date, normalize_name, normalize_venue, parse_date};

pub const CRATE_NAME: &str = "aec-core";

/// Placeholder for a field whose value is unknown.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder venue for events whose location has not been announced.
pub const TO_BE_DETERMINED: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum EventFormat {
    #[default]
    #[serde(rename = "In-person")]
    InPerson,
    Online,
    Hybrid,
}

impl EventFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InPerson => "In-person",
            Self::Online => "Online",
            Self::Hybrid => "Hybrid",
        }
    }

    /// Reads a hand-edited format label, ignoring case and separators.
    pub fn from_label(label: &str) -> Option<Self> {
        let key: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "inperson" | "offline" | "onsite" => Some(Self::InPerson),
            "online" | "virtual" | "remote" => Some(Self::Online),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

// Catalog files are edited by hand; an unrecognized label falls back to the
// default instead of failing the whole file.
impl<'de> Deserialize<'de> for EventFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label
            .as_deref()
            .and_then(Self::from_label)
            .unwrap_or_default())
    }
}

impl fmt::Display for EventFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry. Field order is the persisted field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub format: EventFormat,
    #[serde(default = "to_be_determined")]
    pub venue: String,
    /// Canonical `YYYY-MM-DD`. Empty only for legacy rows, which sort last.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub theme: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default = "not_available")]
    pub submission_deadline: String,
    #[serde(default = "not_available")]
    pub ticket_start_date: String,
    #[serde(default = "not_available")]
    pub ticket_end_date: String,
    #[serde(default = "not_available")]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub estimated_attendees: u32,
    /// 1-based chronological position, reassigned on every run.
    #[serde(rename = "#", default, deserialize_with = "lenient_count")]
    pub rank: u32,
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

fn to_be_determined() -> String {
    TO_BE_DETERMINED.to_string()
}

/// Accepts `1200`, `1200.0` or `"1,200"`; anything else reads as zero.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Int(u64),
        Float(f64),
        Text(String),
        Other(#[allow(dead_code)] serde::de::IgnoredAny),
    }

    Ok(match Count::deserialize(deserializer)? {
        Count::Int(n) => u32::try_from(n).unwrap_or(u32::MAX),
        Count::Float(f) => f as u32,
        Count::Text(text) => text.trim().replace(',', "").parse().unwrap_or(0),
        Count::Other(_) => 0,
    })
}

impl Event {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Ordering key for the chronological sort; dateless events go last.
    pub fn sort_key(&self) -> NaiveDate {
        self.parsed_date().unwrap_or(NaiveDate::MAX)
    }
}

/// Loosely-typed record as extracted by an adapter, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawEventRecord {
    pub name: String,
    pub format: Option<EventFormat>,
    pub venue: String,
    pub date: String,
    pub theme: String,
    pub event_type: String,
    pub submission_deadline: String,
    pub ticket_start_date: String,
    pub ticket_end_date: String,
    pub url: Option<String>,
    pub description: String,
    pub estimated_attendees: Option<u32>,
}

impl From<Event> for RawEventRecord {
    fn from(event: Event) -> Self {
        Self {
            name: event.name,
            format: Some(event.format),
            venue: event.venue,
            date: event.date,
            theme: event.theme,
            event_type: event.event_type,
            submission_deadline: event.submission_deadline,
            ticket_start_date: event.ticket_start_date,
            ticket_end_date: event.ticket_end_date,
            url: Some(event.url),
            description: event.description,
            estimated_attendees: Some(event.estimated_attendees),
        }
    }
}

impl RawEventRecord {
    /// Runs every field through the normalizer. Records without a name or a
    /// parseable date are skipped, never defaulted.
    pub fn normalize(self) -> RecordOutcome {
        let name = normalize_name(&self.name);
        if name.is_empty() {
            return RecordOutcome::Skipped(SkipReason::MissingName);
        }
        let Some(date) = normalize_date(&self.date) else {
            return RecordOutcome::Skipped(SkipReason::UnparseableDate {
                name,
                raw: self.date.trim().to_string(),
            });
        };

        let url = self
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(not_available);

        RecordOutcome::Accepted(Event {
            name,
            format: self.format.unwrap_or_default(),
            venue: normalize_venue(&self.venue),
            date,
            theme: self.theme.trim().to_string(),
            event_type: self.event_type.trim().to_string(),
            submission_deadline: normalize_date(&self.submission_deadline)
                .unwrap_or_else(not_available),
            ticket_start_date: normalize_date(&self.ticket_start_date)
                .unwrap_or_else(not_available),
            ticket_end_date: normalize_date(&self.ticket_end_date).unwrap_or_else(not_available),
            url,
            description: self.description.trim().to_string(),
            estimated_attendees: self.estimated_attendees.unwrap_or(0),
            rank: 0,
        })
    }
}

/// Why a candidate record did not make it into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingName,
    UnparseableDate { name: String, raw: String },
    PastDate { name: String, date: NaiveDate },
    MalformedRow { detail: String },
}

impl SkipReason {
    /// Short stable label used when aggregating skip counts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingName => "missing-name",
            Self::UnparseableDate { .. } => "unparseable-date",
            Self::PastDate { .. } => "past-date",
            Self::MalformedRow { .. } => "malformed-row",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "record has no event name"),
            Self::UnparseableDate { name, raw } => {
                write!(f, "{name}: could not parse date {raw:?}")
            }
            Self::PastDate { name, date } => write!(f, "{name}: date {date} is in the past"),
            Self::MalformedRow { detail } => write!(f, "malformed row: {detail}"),
        }
    }
}

/// Per-record result handed from adapters to the reconciliation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Accepted(Event),
    Skipped(SkipReason),
}

impl RecordOutcome {
    pub fn accepted(&self) -> Option<&Event> {
        match self {
            Self::Accepted(event) => Some(event),
            Self::Skipped(_) => None,
        }
    }
}
