//! Selector-driven adapters for public HTML event listings.

use std::sync::Arc;

use aec_core::{EventFormat, RawEventRecord, RecordOutcome, SkipReason};
use aec_storage::HttpFetcher;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::{AdapterContext, AdapterError, CategoryRules, SourceAdapter, SourceKind};

/// Where each field lives inside one listing row. All selectors except
/// `row` are evaluated relative to the row element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSelectors {
    pub row: &'static str,
    pub name: &'static str,
    pub date: &'static str,
    /// Read the date from this attribute of the `date` element instead of its text.
    pub date_attr: Option<&'static str>,
    pub venue: &'static str,
    pub link: &'static str,
    pub summary: Option<&'static str>,
}

struct CompiledSelectors {
    row: Selector,
    name: Selector,
    date: Selector,
    venue: Selector,
    link: Selector,
    summary: Option<Selector>,
}

impl ListingSelectors {
    fn compile(&self) -> Result<CompiledSelectors, AdapterError> {
        Ok(CompiledSelectors {
            row: parse_selector(self.row)?,
            name: parse_selector(self.name)?,
            date: parse_selector(self.date)?,
            venue: parse_selector(self.venue)?,
            link: parse_selector(self.link)?,
            summary: self.summary.map(parse_selector).transpose()?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, AdapterError> {
    Selector::parse(selector).map_err(|e| AdapterError::Selector {
        selector: selector.to_string(),
        detail: e.to_string(),
    })
}

#[derive(Debug, Clone)]
pub struct HtmlListingAdapter {
    source_id: &'static str,
    display_name: &'static str,
    listing_url: &'static str,
    selectors: ListingSelectors,
    rules: Arc<CategoryRules>,
}

impl HtmlListingAdapter {
    pub fn new(
        source_id: &'static str,
        display_name: &'static str,
        listing_url: &'static str,
        selectors: ListingSelectors,
        rules: Arc<CategoryRules>,
    ) -> Self {
        Self {
            source_id,
            display_name,
            listing_url,
            selectors,
            rules,
        }
    }

    pub fn listing_url(&self) -> &str {
        self.listing_url
    }

    /// Extracts one outcome per listing row. Rows dated before `ctx.today`
    /// are skipped. A page with no matching rows is treated as a markup change.
    pub fn parse_listing(
        &self,
        html: &str,
        page_url: &str,
        ctx: &AdapterContext,
    ) -> Result<Vec<RecordOutcome>, AdapterError> {
        let selectors = self.selectors.compile()?;
        let base = Url::parse(page_url).ok();
        let document = Html::parse_document(html);

        let outcomes: Vec<RecordOutcome> = document
            .select(&selectors.row)
            .map(|row| self.parse_row(row, &selectors, base.as_ref(), ctx))
            .collect();

        if outcomes.is_empty() {
            return Err(AdapterError::Markup(format!(
                "no rows matched {:?} on {page_url}",
                self.selectors.row
            )));
        }
        Ok(outcomes)
    }

    fn parse_row(
        &self,
        row: ElementRef<'_>,
        selectors: &CompiledSelectors,
        base: Option<&Url>,
        ctx: &AdapterContext,
    ) -> RecordOutcome {
        let name = first_text(row, &selectors.name).unwrap_or_default();
        let date = match self.selectors.date_attr {
            Some(attr) => first_attr(row, &selectors.date, attr)
                .or_else(|| first_text(row, &selectors.date)),
            None => first_text(row, &selectors.date),
        }
        .unwrap_or_default();
        let venue = first_text(row, &selectors.venue).unwrap_or_default();
        let url = first_attr(row, &selectors.link, "href").and_then(|href| resolve_link(base, &href));
        let summary = selectors
            .summary
            .as_ref()
            .and_then(|sel| first_text(row, sel));

        let theme = self.rules.categorize(&name).to_string();
        let description = summary
            .unwrap_or_else(|| format!("{} (listed on {})", name.trim(), self.display_name));

        let record = RawEventRecord {
            format: Some(infer_format(&venue)),
            event_type: infer_event_type(&name).to_string(),
            name,
            venue,
            date,
            theme,
            url,
            description,
            ..Default::default()
        };

        match record.normalize() {
            RecordOutcome::Accepted(event) => match event.parsed_date() {
                Some(date) if date < ctx.today => {
                    debug!(source_id = self.source_id, name = %event.name, %date, "skipping past event");
                    RecordOutcome::Skipped(SkipReason::PastDate {
                        name: event.name,
                        date,
                    })
                }
                Some(_) => RecordOutcome::Accepted(event),
                None => RecordOutcome::Skipped(SkipReason::MalformedRow {
                    detail: format!("{}: normalized date {:?} did not parse", event.name, event.date),
                }),
            },
            skipped => skipped,
        }
    }
}

#[async_trait]
impl SourceAdapter for HtmlListingAdapter {
    fn source_id(&self) -> &'static str {
        self.source_id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PublicHtml
    }

    async fn produce(
        &self,
        http: &HttpFetcher,
        ctx: &AdapterContext,
    ) -> Result<Vec<RecordOutcome>, AdapterError> {
        let page = http.fetch_text(self.source_id, self.listing_url).await?;
        self.parse_listing(&page.body, &page.final_url, ctx)
    }
}

fn text_or_none(value: String) -> Option<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn first_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .and_then(|n| text_or_none(n.text().collect::<String>()))
}

fn first_attr(row: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    row.select(selector)
        .next()
        .and_then(|n| n.value().attr(attr))
        .and_then(|s| text_or_none(s.to_string()))
}

fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    if let Ok(absolute) = Url::parse(href) {
        return Some(absolute.to_string());
    }
    base.and_then(|b| b.join(href).ok()).map(|u| u.to_string())
}

/// Venue text is the only signal listings give for attendance mode.
pub fn infer_format(venue: &str) -> EventFormat {
    let lower = venue.to_lowercase();
    if lower.contains("hybrid") {
        EventFormat::Hybrid
    } else if lower.contains("online") || lower.contains("virtual") {
        EventFormat::Online
    } else {
        EventFormat::InPerson
    }
}

pub fn infer_event_type(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.contains("summit") {
        "Summit"
    } else if lower.contains("expo") {
        "Expo"
    } else {
        "Conference"
    }
}

pub const DEV_EVENTS_SOURCE_ID: &str = "dev-events";
pub const CONFERENCE_INDEX_SOURCE_ID: &str = "conference-index";

pub fn dev_events_adapter(rules: Arc<CategoryRules>) -> HtmlListingAdapter {
    HtmlListingAdapter::new(
        DEV_EVENTS_SOURCE_ID,
        "dev.events",
        "https://dev.events/AI",
        ListingSelectors {
            row: "div.row.columns",
            name: "h2.title a",
            date: "time",
            date_attr: Some("datetime"),
            venue: "p.subtitle",
            link: "h2.title a",
            summary: None,
        },
        rules,
    )
}

pub fn conference_index_adapter(rules: Arc<CategoryRules>) -> HtmlListingAdapter {
    HtmlListingAdapter::new(
        CONFERENCE_INDEX_SOURCE_ID,
        "Conference Index",
        "https://conferenceindex.org/conferences/artificial-intelligence",
        ListingSelectors {
            row: "div.conference-item",
            name: "a.conference-title",
            date: ".conference-date",
            date_attr: None,
            venue: ".conference-location",
            link: "a.conference-title",
            summary: Some(".conference-topic"),
        },
        rules,
    )
}
