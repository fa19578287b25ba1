//! Manually vetted baseline of major AI conferences and summits.

use aec_core::{Event, EventFormat, RecordOutcome};
use aec_storage::HttpFetcher;
use async_trait::async_trait;

use crate::{AdapterContext, AdapterError, SourceAdapter, SourceKind};

pub const CURATED_SOURCE_ID: &str = "curated";

#[derive(Debug, Clone, Copy)]
struct CuratedEntry {
    name: &'static str,
    format: EventFormat,
    venue: &'static str,
    date: &'static str,
    theme: &'static str,
    event_type: &'static str,
    submission_deadline: &'static str,
    ticket_start_date: &'static str,
    ticket_end_date: &'static str,
    url: &'static str,
    description: &'static str,
    estimated_attendees: u32,
}

impl From<&CuratedEntry> for Event {
    fn from(entry: &CuratedEntry) -> Self {
        Event {
            name: entry.name.to_string(),
            format: entry.format,
            venue: entry.venue.to_string(),
            date: entry.date.to_string(),
            theme: entry.theme.to_string(),
            event_type: entry.event_type.to_string(),
            submission_deadline: entry.submission_deadline.to_string(),
            ticket_start_date: entry.ticket_start_date.to_string(),
            ticket_end_date: entry.ticket_end_date.to_string(),
            url: entry.url.to_string(),
            description: entry.description.to_string(),
            estimated_attendees: entry.estimated_attendees,
            rank: 0,
        }
    }
}

const CURATED: &[CuratedEntry] = &[
    CuratedEntry {
        name: "NeurIPS 2025",
        format: EventFormat::Hybrid,
        venue: "Vancouver, Canada",
        date: "2025-12-08",
        theme: "Neural Information Processing Systems",
        event_type: "Conference",
        submission_deadline: "2025-05-15",
        ticket_start_date: "2025-08-01",
        ticket_end_date: "2025-12-07",
        url: "https://neurips.cc",
        description: "The leading conference in machine learning and computational neuroscience",
        estimated_attendees: 15000,
    },
    CuratedEntry {
        name: "ICML 2025",
        format: EventFormat::Hybrid,
        venue: "Vancouver, Canada",
        date: "2025-07-15",
        theme: "International Conference on Machine Learning",
        event_type: "Conference",
        submission_deadline: "2025-01-30",
        ticket_start_date: "2025-04-01",
        ticket_end_date: "2025-07-14",
        url: "https://icml.cc",
        description: "Premier gathering of researchers in machine learning",
        estimated_attendees: 10000,
    },
    CuratedEntry {
        name: "CVPR 2026",
        format: EventFormat::Hybrid,
        venue: "Nashville, USA",
        date: "2026-06-19",
        theme: "Computer Vision and Pattern Recognition",
        event_type: "Conference",
        submission_deadline: "2025-11-15",
        ticket_start_date: "2026-03-01",
        ticket_end_date: "2026-06-18",
        url: "https://cvpr.cc",
        description: "Leading conference in computer vision research",
        estimated_attendees: 12000,
    },
    CuratedEntry {
        name: "ICLR 2026",
        format: EventFormat::Hybrid,
        venue: "Singapore",
        date: "2026-04-24",
        theme: "International Conference on Learning Representations",
        event_type: "Conference",
        submission_deadline: "2025-10-01",
        ticket_start_date: "2026-02-01",
        ticket_end_date: "2026-04-23",
        url: "https://iclr.cc",
        description: "Top-tier deep learning research conference",
        estimated_attendees: 8000,
    },
    CuratedEntry {
        name: "ACL 2026",
        format: EventFormat::Hybrid,
        venue: "Bangkok, Thailand",
        date: "2026-08-03",
        theme: "Association for Computational Linguistics",
        event_type: "Conference",
        submission_deadline: "2026-02-15",
        ticket_start_date: "2026-05-01",
        ticket_end_date: "2026-08-02",
        url: "https://www.aclweb.org",
        description: "Premier conference for natural language processing and computational linguistics",
        estimated_attendees: 6000,
    },
    CuratedEntry {
        name: "AAAI 2026",
        format: EventFormat::Hybrid,
        venue: "Philadelphia, USA",
        date: "2026-02-09",
        theme: "Association for the Advancement of Artificial Intelligence",
        event_type: "Conference",
        submission_deadline: "2025-08-15",
        ticket_start_date: "2025-11-01",
        ticket_end_date: "2026-02-08",
        url: "https://aaai.org",
        description: "Major AI conference covering all aspects of artificial intelligence",
        estimated_attendees: 7000,
    },
    CuratedEntry {
        name: "AI Summit New York 2025",
        format: EventFormat::InPerson,
        venue: "New York, USA",
        date: "2025-12-10",
        theme: "Enterprise AI and Business Innovation",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2025-06-01",
        ticket_end_date: "2025-12-09",
        url: "https://theaisummit.com",
        description: "Business-focused AI summit for enterprise leaders and practitioners",
        estimated_attendees: 5000,
    },
    CuratedEntry {
        name: "AI Summit London 2026",
        format: EventFormat::InPerson,
        venue: "London, UK",
        date: "2026-06-10",
        theme: "AI for Business Transformation",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2026-01-15",
        ticket_end_date: "2026-06-09",
        url: "https://theaisummit.com",
        description: "Europe's leading AI event for business and technology leaders",
        estimated_attendees: 6000,
    },
    CuratedEntry {
        name: "RE•WORK Deep Learning Summit 2026",
        format: EventFormat::Hybrid,
        venue: "San Francisco, USA",
        date: "2026-01-29",
        theme: "Deep Learning Applications and Research",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2025-10-01",
        ticket_end_date: "2026-01-28",
        url: "https://www.re-work.co",
        description: "Applied deep learning for business and research",
        estimated_attendees: 2000,
    },
    CuratedEntry {
        name: "MLOps World 2026",
        format: EventFormat::Hybrid,
        venue: "Austin, USA",
        date: "2026-06-03",
        theme: "Machine Learning Operations and Production ML",
        event_type: "Conference",
        submission_deadline: "2026-03-01",
        ticket_start_date: "2026-02-01",
        ticket_end_date: "2026-06-02",
        url: "https://mlopsworld.com",
        description: "The leading event for ML engineering and operations",
        estimated_attendees: 3000,
    },
    CuratedEntry {
        name: "Generative AI World 2026",
        format: EventFormat::InPerson,
        venue: "Las Vegas, USA",
        date: "2026-03-18",
        theme: "Generative AI and Large Language Models",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2025-12-01",
        ticket_end_date: "2026-03-17",
        url: "https://www.gen-ai.world",
        description: "Focused on generative AI, LLMs, and creative AI applications",
        estimated_attendees: 4000,
    },
    CuratedEntry {
        name: "AI in Healthcare Summit 2026",
        format: EventFormat::Hybrid,
        venue: "Boston, USA",
        date: "2026-05-12",
        theme: "AI Applications in Healthcare and Medicine",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2026-02-01",
        ticket_end_date: "2026-05-11",
        url: "https://www.ai-healthcare-summit.com",
        description: "AI innovations for healthcare, diagnostics, and drug discovery",
        estimated_attendees: 2500,
    },
    CuratedEntry {
        name: "PyTorch Conference 2026",
        format: EventFormat::Hybrid,
        venue: "San Francisco, USA",
        date: "2026-10-07",
        theme: "PyTorch and Deep Learning Frameworks",
        event_type: "Conference",
        submission_deadline: "2026-07-01",
        ticket_start_date: "2026-06-01",
        ticket_end_date: "2026-10-06",
        url: "https://pytorchconf.com",
        description: "Community conference for PyTorch developers and researchers",
        estimated_attendees: 3000,
    },
    CuratedEntry {
        name: "TensorFlow Dev Summit 2026",
        format: EventFormat::Online,
        venue: "Virtual",
        date: "2026-03-25",
        theme: "TensorFlow and ML Development",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2026-01-15",
        ticket_end_date: "2026-03-24",
        url: "https://www.tensorflow.org/dev-summit",
        description: "Google's annual TensorFlow developer conference",
        estimated_attendees: 10000,
    },
    CuratedEntry {
        name: "AI India Summit 2026",
        format: EventFormat::Hybrid,
        venue: "Bangalore, India",
        date: "2026-02-25",
        theme: "AI Innovation in India and South Asia",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2025-11-01",
        ticket_end_date: "2026-02-24",
        url: "https://www.aiindiasummit.com",
        description: "Leading AI event in India covering business and technology",
        estimated_attendees: 4000,
    },
    CuratedEntry {
        name: "AI China Conference 2026",
        format: EventFormat::InPerson,
        venue: "Beijing, China",
        date: "2026-07-22",
        theme: "AI Research and Industry in China",
        event_type: "Conference",
        submission_deadline: "2026-04-01",
        ticket_start_date: "2026-04-15",
        ticket_end_date: "2026-07-21",
        url: "https://www.aichinaconf.com",
        description: "Major AI conference showcasing Chinese AI research and applications",
        estimated_attendees: 8000,
    },
    CuratedEntry {
        name: "AI Africa Summit 2026",
        format: EventFormat::Hybrid,
        venue: "Cape Town, South Africa",
        date: "2026-09-16",
        theme: "AI for African Development and Innovation",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2026-05-01",
        ticket_end_date: "2026-09-15",
        url: "https://www.aiafricasummit.com",
        description: "Bringing AI innovation to solve African challenges",
        estimated_attendees: 2000,
    },
    CuratedEntry {
        name: "AI LATAM 2026",
        format: EventFormat::Hybrid,
        venue: "São Paulo, Brazil",
        date: "2026-11-11",
        theme: "AI in Latin America",
        event_type: "Conference",
        submission_deadline: "2026-08-01",
        ticket_start_date: "2026-07-01",
        ticket_end_date: "2026-11-10",
        url: "https://www.ailatam.com",
        description: "Largest AI event in Latin America",
        estimated_attendees: 3500,
    },
    CuratedEntry {
        name: "EmTech Digital 2026",
        format: EventFormat::InPerson,
        venue: "San Francisco, USA",
        date: "2026-05-20",
        theme: "Emerging Technologies and Digital Transformation",
        event_type: "Conference",
        submission_deadline: "N/A",
        ticket_start_date: "2026-02-01",
        ticket_end_date: "2026-05-19",
        url: "https://events.technologyreview.com",
        description: "MIT Technology Review's conference on AI and emerging tech",
        estimated_attendees: 3000,
    },
    CuratedEntry {
        name: "AI for Good Global Summit 2026",
        format: EventFormat::Hybrid,
        venue: "Geneva, Switzerland",
        date: "2026-06-29",
        theme: "AI for Sustainable Development Goals",
        event_type: "Summit",
        submission_deadline: "N/A",
        ticket_start_date: "2026-03-01",
        ticket_end_date: "2026-06-28",
        url: "https://aiforgood.itu.int",
        description: "UN's leading platform on AI for social good",
        estimated_attendees: 2500,
    },
];

pub fn curated_events() -> Vec<Event> {
    CURATED.iter().map(Event::from).collect()
}

/// Always-available source backed by [`curated_events`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CuratedAdapter;

#[async_trait]
impl SourceAdapter for CuratedAdapter {
    fn source_id(&self) -> &'static str {
        CURATED_SOURCE_ID
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Curated
    }

    async fn produce(
        &self,
        _http: &HttpFetcher,
        _ctx: &AdapterContext,
    ) -> Result<Vec<RecordOutcome>, AdapterError> {
        Ok(curated_events()
            .into_iter()
            .map(RecordOutcome::Accepted)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aec_core::RawEventRecord;
    use std::collections::HashSet;

    #[test]
    fn baseline_is_already_normalized() {
        let events = curated_events();
        assert_eq!(events.len(), 20);
        for event in events {
            let renormalized = RawEventRecord::from(event.clone()).normalize();
            assert_eq!(renormalized, RecordOutcome::Accepted(event));
        }
    }

    #[test]
    fn baseline_has_unique_names() {
        let events = curated_events();
        let names: HashSet<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), events.len());
        assert!(names.contains("ICML 2025"));
        assert!(names.contains("AI for Good Global Summit 2026"));
    }

    #[tokio::test]
    async fn produce_emits_every_entry_as_accepted() {
        let http = HttpFetcher::new(Default::default()).expect("client");
        let ctx = AdapterContext::for_date(chrono::NaiveDate::from_ymd_opt(2030, 1, 1).expect("date"));
        let outcomes = CuratedAdapter.produce(&http, &ctx).await.expect("produce");
        assert_eq!(outcomes.len(), 20);
        assert!(outcomes.iter().all(|o| o.accepted().is_some()));
    }
}
