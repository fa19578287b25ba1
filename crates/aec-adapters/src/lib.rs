//! Source adapter contracts + the curated and scraped adapter implementations.

use std::sync::Arc;

use aec_core::RecordOutcome;
use aec_storage::{FetchError, HttpFetcher};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use thiserror::Error;

mod category;
mod curated;
mod listing;

pub use category::{CategoryRule, CategoryRules};
pub use curated::{curated_events, CuratedAdapter, CURATED_SOURCE_ID};
pub use listing::{
    conference_index_adapter, dev_events_adapter, infer_event_type, infer_format,
    HtmlListingAdapter, ListingSelectors, CONFERENCE_INDEX_SOURCE_ID, DEV_EVENTS_SOURCE_ID,
};

pub const CRATE_NAME: &str = "aec-adapters";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Embedded data, no I/O.
    Curated,
    /// Scraped from a public web page.
    PublicHtml,
}

impl SourceKind {
    pub fn needs_network(&self) -> bool {
        matches!(self, Self::PublicHtml)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterContext {
    /// Reference date; scraped rows dated before it are skipped.
    pub today: NaiveDate,
}

impl AdapterContext {
    pub fn now() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn for_date(today: NaiveDate) -> Self {
        Self { today }
    }
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("invalid selector {selector:?}: {detail}")]
    Selector { selector: String, detail: String },
    #[error("unexpected markup: {0}")]
    Markup(String),
}

/// One origin of candidate events.
///
/// Failures returned from `produce` cover the whole source; per-record
/// problems are reported as [`RecordOutcome::Skipped`] inside the `Ok` value.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_id(&self) -> &'static str;
    fn kind(&self) -> SourceKind;

    async fn produce(
        &self,
        http: &HttpFetcher,
        ctx: &AdapterContext,
    ) -> Result<Vec<RecordOutcome>, AdapterError>;
}

/// Every adapter in run order: the curated baseline first, then each scraped site.
pub fn default_adapters() -> anyhow::Result<Vec<Box<dyn SourceAdapter>>> {
    let rules = Arc::new(CategoryRules::builtin()?);
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(CuratedAdapter),
        Box::new(dev_events_adapter(Arc::clone(&rules))),
        Box::new(conference_index_adapter(rules)),
    ];
    Ok(adapters)
}
