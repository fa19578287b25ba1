//! Content-derived event identity and the deduplicating catalog.

use std::collections::HashSet;
use std::fmt;

use aec_core::Event;
use sha2::{Digest, Sha256};

const FIELD_SEPARATOR: &str = "|";

/// SHA-256 over case-folded, whitespace-normalized `name|date|venue`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn identity_fragment(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn fingerprint(event: &Event) -> Fingerprint {
    let key = [&event.name, &event.date, &event.venue]
        .iter()
        .map(|field| identity_fragment(field))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}

/// Ordered event collection that never holds two events with the same
/// [`Fingerprint`]. Membership checks use a running fingerprint set, so every
/// `merge` sees the events added earlier in the same run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    events: Vec<Event>,
    seen: HashSet<Fingerprint>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from prior state, keeping the first of any events that
    /// share a fingerprint. Returns the catalog and how many were dropped.
    pub fn from_prior(events: Vec<Event>) -> (Self, usize) {
        let mut catalog = Self::new();
        let mut collapsed = 0;
        for event in events {
            if !catalog.merge(event) {
                collapsed += 1;
            }
        }
        (catalog, collapsed)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn is_duplicate(&self, event: &Event) -> bool {
        self.seen.contains(&fingerprint(event))
    }

    /// Appends `event` unless an event with the same fingerprint is present.
    /// Returns whether it was added.
    pub fn merge(&mut self, event: Event) -> bool {
        if !self.seen.insert(fingerprint(&event)) {
            return false;
        }
        self.events.push(event);
        true
    }

    /// Stable ascending sort by date (dateless last), then dense 1-based ranks.
    pub fn sort_and_rank(&mut self) {
        self.events.sort_by_key(Event::sort_key);
        for (idx, event) in self.events.iter_mut().enumerate() {
            event.rank = idx as u32 + 1;
        }
    }

    /// Earliest and latest parseable dates.
    pub fn date_range(&self) -> Option<(String, String)> {
        let mut dates = self.events.iter().filter_map(Event::parsed_date);
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some((
            min.format("%Y-%m-%d").to_string(),
            max.format("%Y-%m-%d").to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aec_core::EventFormat;

    fn event(name: &str, date: &str, venue: &str) -> Event {
        Event {
            name: name.to_string(),
            format: EventFormat::InPerson,
            venue: venue.to_string(),
            date: date.to_string(),
            theme: String::new(),
            event_type: "Conference".to_string(),
            submission_deadline: "N/A".to_string(),
            ticket_start_date: "N/A".to_string(),
            ticket_end_date: "N/A".to_string(),
            url: "N/A".to_string(),
            description: String::new(),
            estimated_attendees: 0,
            rank: 0,
        }
    }

    #[test]
    fn fingerprint_is_stable_hex_sha256() {
        let fp = fingerprint(&event("ICML 2025", "2025-07-15", "Vancouver, Canada"));
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            fp,
            fingerprint(&event("ICML 2025", "2025-07-15", "Vancouver, Canada"))
        );
    }

    #[test]
    fn fingerprint_ignores_case_and_incidental_whitespace() {
        let a = fingerprint(&event("ICML 2025", "2025-07-15", "Vancouver, Canada"));
        let b = fingerprint(&event(" icml  2025 ", "2025-07-15", "  VANCOUVER, canada  "));
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_only_covers_name_date_venue() {
        let mut a = event("CVPR 2026", "2026-06-19", "Nashville, USA");
        let b = a.clone();
        a.description = "different".into();
        a.estimated_attendees = 99;
        assert_eq!(fingerprint(&a), fingerprint(&b));

        let moved = event("CVPR 2026", "2026-06-20", "Nashville, USA");
        assert_ne!(fingerprint(&moved), fingerprint(&b));
    }

    #[test]
    fn separator_keeps_fields_apart() {
        let a = fingerprint(&event("AI Summit", "2026-01-01", "London"));
        let b = fingerprint(&event("AI", "2026-01-01", "Summit London"));
        assert_ne!(a, b);
    }

    #[test]
    fn merge_sees_events_added_earlier_in_the_same_run() {
        let mut catalog = Catalog::new();
        assert!(catalog.merge(event("ACL 2026", "2026-08-03", "Bangkok, Thailand")));
        assert!(catalog.is_duplicate(&event("acl 2026", "2026-08-03", "Bangkok, Thailand")));
        assert!(!catalog.merge(event("ACL  2026", "2026-08-03", "bangkok, thailand")));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.events()[0].name, "ACL 2026");
    }

    #[test]
    fn prior_duplicates_are_collapsed_keeping_the_first() {
        let (catalog, collapsed) = Catalog::from_prior(vec![
            event("A", "2026-01-01", "Paris"),
            event("a", "2026-01-01", "paris"),
            event("B", "2026-01-02", "Paris"),
        ]);
        assert_eq!(collapsed, 1);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.events()[0].name, "A");
    }

    #[test]
    fn sort_is_stable_with_dateless_events_last_and_ranks_dense() {
        let (mut catalog, _) = Catalog::from_prior(vec![
            event("Undated", "", "Nowhere"),
            event("Late", "2026-09-01", "Rome"),
            event("Tie first", "2026-03-01", "Oslo"),
            event("Early", "2025-12-08", "Vancouver"),
            event("Tie second", "2026-03-01", "Lima"),
        ]);
        catalog.sort_and_rank();
        let names: Vec<_> = catalog.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Tie first", "Tie second", "Late", "Undated"]);
        let ranks: Vec<_> = catalog.events().iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            catalog.date_range(),
            Some(("2025-12-08".to_string(), "2026-09-01".to_string()))
        );
    }

    #[test]
    fn empty_catalog_has_no_date_range() {
        assert_eq!(Catalog::new().date_range(), None);
    }
}
