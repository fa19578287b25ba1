//! Reconciliation pipeline: load → collect → merge → sort → persist.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use aec_adapters::{default_adapters, AdapterContext, SourceAdapter, SourceKind};
use aec_core::{RawEventRecord, RecordOutcome};
use aec_storage::{CatalogLoad, CatalogStore, HttpClientConfig, HttpFetcher, DEFAULT_CATALOG_PATH};
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

mod dedup;

pub use dedup::{fingerprint, identity_fragment, Catalog, Fingerprint};

pub const CRATE_NAME: &str = "aec-sync";

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub catalog_path: PathBuf,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    /// Only run sources that need no network access.
    pub offline: bool,
}

impl ReconcileConfig {
    pub fn new(catalog_path: impl Into<PathBuf>) -> Self {
        let http = HttpClientConfig::default();
        Self {
            catalog_path: catalog_path.into(),
            user_agent: http.user_agent,
            http_timeout_secs: http.timeout.as_secs(),
            offline: false,
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::new(DEFAULT_CATALOG_PATH);
        Self {
            catalog_path: std::env::var("AEC_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.catalog_path),
            user_agent: std::env::var("AEC_USER_AGENT").unwrap_or(defaults.user_agent),
            http_timeout_secs: std::env::var("AEC_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_timeout_secs),
            offline: std::env::var("AEC_OFFLINE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(false),
        }
    }
}

/// Driver states, in the only order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    Loaded,
    Collecting,
    Merging,
    Sorted,
    Persisted,
}

impl RunState {
    fn advance(&mut self, next: RunState) {
        debug_assert!(next > *self, "run state cannot go from {:?} to {:?}", self, next);
        debug!(from = ?*self, to = ?next, "run state transition");
        *self = next;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorState {
    Missing,
    Loaded,
    Corrupt { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    Ok,
    /// The source failed as a whole and contributed nothing this run.
    Degraded { reason: String },
    /// Not invoked because the run is offline.
    Offline,
}

#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source_id: String,
    pub kind: SourceKind,
    pub status: SourceStatus,
    pub produced: usize,
    pub added: usize,
    pub duplicates: usize,
    /// Skip counts keyed by [`aec_core::SkipReason::label`].
    pub skipped: BTreeMap<String, usize>,
}

impl SourceReport {
    fn new(source_id: &str, kind: SourceKind, status: SourceStatus) -> Self {
        Self {
            source_id: source_id.to_string(),
            kind,
            status,
            produced: 0,
            added: 0,
            duplicates: 0,
            skipped: BTreeMap::new(),
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub catalog_path: String,
    pub prior_state: PriorState,
    pub loaded: usize,
    /// Prior entries dropped because they repeated an earlier fingerprint.
    pub collapsed_prior: usize,
    pub sources: Vec<SourceReport>,
    pub total_events: usize,
    pub date_range: Option<(String, String)>,
    pub final_state: RunState,
}

impl ReconcileSummary {
    pub fn added_total(&self) -> usize {
        self.sources.iter().map(|s| s.added).sum()
    }

    pub fn degraded_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Degraded { .. }))
            .count()
    }
}

impl fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AI events catalog: {}", self.catalog_path)?;
        match &self.prior_state {
            PriorState::Missing => writeln!(f, "prior catalog: none found, started fresh")?,
            PriorState::Loaded => writeln!(f, "prior catalog: {} events", self.loaded)?,
            PriorState::Corrupt { reason } => {
                writeln!(f, "prior catalog: unreadable ({reason}), started fresh")?
            }
        }
        if self.collapsed_prior > 0 {
            writeln!(f, "prior duplicates collapsed: {}", self.collapsed_prior)?;
        }
        for source in &self.sources {
            match &source.status {
                SourceStatus::Ok => {
                    write!(
                        f,
                        "  {}: {} produced, {} added, {} duplicates, {} skipped",
                        source.source_id,
                        source.produced,
                        source.added,
                        source.duplicates,
                        source.skipped_total()
                    )?;
                    if !source.skipped.is_empty() {
                        let detail = source
                            .skipped
                            .iter()
                            .map(|(label, n)| format!("{label}: {n}"))
                            .collect::<Vec<_>>()
                            .join(", ");
                        write!(f, " ({detail})")?;
                    }
                    writeln!(f)?;
                }
                SourceStatus::Degraded { reason } => {
                    writeln!(f, "  {}: degraded, 0 events ({reason})", source.source_id)?
                }
                SourceStatus::Offline => writeln!(f, "  {}: skipped (offline)", source.source_id)?,
            }
        }
        let added = self.added_total();
        if added > 0 {
            writeln!(f, "new events added: {added}")?;
        } else {
            writeln!(f, "no new events, all {} are up to date", self.total_events)?;
        }
        writeln!(f, "total events tracked: {}", self.total_events)?;
        match &self.date_range {
            Some((first, last)) => write!(f, "date range: {first} to {last}"),
            None => write!(f, "date range: n/a"),
        }
    }
}

struct SourceBatch {
    report: SourceReport,
    outcomes: Vec<RecordOutcome>,
}

pub struct ReconcilePipeline {
    config: ReconcileConfig,
    store: CatalogStore,
    http: HttpFetcher,
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl ReconcilePipeline {
    pub fn new(config: ReconcileConfig) -> Result<Self> {
        let store = CatalogStore::new(config.catalog_path.clone());
        let http = HttpFetcher::new(HttpClientConfig {
            timeout: Duration::from_secs(config.http_timeout_secs),
            user_agent: config.user_agent.clone(),
        })?;
        Ok(Self {
            config,
            store,
            http,
            adapters: default_adapters()?,
        })
    }

    /// Replaces the adapter list; adapters run in the given order.
    pub fn with_adapters(mut self, adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        self.adapters = adapters;
        self
    }

    /// Runs the full pipeline once. The catalog file is only touched by the
    /// final save, so an error before that leaves it as it was.
    pub async fn run_once(&self, ctx: &AdapterContext) -> Result<ReconcileSummary> {
        let run_id = Uuid::new_v4();
        let span = info_span!("reconcile_run", %run_id);
        self.run_inner(run_id, ctx).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, ctx: &AdapterContext) -> Result<ReconcileSummary> {
        let started_at = Utc::now();

        let load = self.store.load().await;
        let prior_state = match &load {
            CatalogLoad::Missing => PriorState::Missing,
            CatalogLoad::Loaded(_) => PriorState::Loaded,
            CatalogLoad::Corrupt { reason } => PriorState::Corrupt {
                reason: reason.clone(),
            },
        };
        let prior = load.into_events();
        let loaded = prior.len();
        let (mut catalog, collapsed_prior) = Catalog::from_prior(prior);
        if collapsed_prior > 0 {
            warn!(collapsed_prior, "prior catalog held duplicate fingerprints");
        }
        let mut state = RunState::Loaded;

        state.advance(RunState::Collecting);
        let mut batches = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            batches.push(self.collect(adapter.as_ref(), ctx).await);
        }

        state.advance(RunState::Merging);
        let mut sources = Vec::with_capacity(batches.len());
        for batch in batches {
            sources.push(merge_batch(&mut catalog, batch));
        }

        state.advance(RunState::Sorted);
        catalog.sort_and_rank();

        self.store.save(catalog.events()).await?;
        state.advance(RunState::Persisted);

        let summary = ReconcileSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            catalog_path: self.config.catalog_path.display().to_string(),
            prior_state,
            loaded,
            collapsed_prior,
            total_events: catalog.len(),
            date_range: catalog.date_range(),
            sources,
            final_state: state,
        };
        info!(
            added = summary.added_total(),
            total = summary.total_events,
            degraded = summary.degraded_sources(),
            "reconcile run complete"
        );
        Ok(summary)
    }

    /// Source failures stop here: the adapter contributes nothing and is
    /// reported as degraded.
    async fn collect(&self, adapter: &dyn SourceAdapter, ctx: &AdapterContext) -> SourceBatch {
        let source_id = adapter.source_id();
        let kind = adapter.kind();

        if self.config.offline && kind.needs_network() {
            info!(source_id, "offline, not contacting source");
            return SourceBatch {
                report: SourceReport::new(source_id, kind, SourceStatus::Offline),
                outcomes: Vec::new(),
            };
        }

        match adapter.produce(&self.http, ctx).await {
            Ok(outcomes) => {
                info!(source_id, records = outcomes.len(), "collected source");
                let mut report = SourceReport::new(source_id, kind, SourceStatus::Ok);
                report.produced = outcomes.len();
                SourceBatch { report, outcomes }
            }
            Err(err) => {
                warn!(source_id, error = %err, "source degraded, continuing without it");
                SourceBatch {
                    report: SourceReport::new(
                        source_id,
                        kind,
                        SourceStatus::Degraded {
                            reason: err.to_string(),
                        },
                    ),
                    outcomes: Vec::new(),
                }
            }
        }
    }
}

fn merge_batch(catalog: &mut Catalog, batch: SourceBatch) -> SourceReport {
    let SourceBatch {
        mut report,
        outcomes,
    } = batch;

    for outcome in outcomes {
        let outcome = match outcome {
            RecordOutcome::Accepted(event) => RawEventRecord::from(event).normalize(),
            skipped => skipped,
        };
        match outcome {
            RecordOutcome::Accepted(event) => {
                let name = event.name.clone();
                let date = event.date.clone();
                if catalog.merge(event) {
                    info!(source_id = %report.source_id, %name, %date, "added event");
                    report.added += 1;
                } else {
                    report.duplicates += 1;
                }
            }
            RecordOutcome::Skipped(reason) => {
                debug!(source_id = %report.source_id, %reason, "skipped record");
                *report.skipped.entry(reason.label().to_string()).or_default() += 1;
            }
        }
    }
    report
}

pub async fn run_reconcile_from_env(catalog_path: Option<PathBuf>) -> Result<ReconcileSummary> {
    let mut config = ReconcileConfig::from_env();
    if let Some(path) = catalog_path {
        config.catalog_path = path;
    }
    let pipeline = ReconcilePipeline::new(config)?;
    pipeline.run_once(&AdapterContext::now()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use aec_core::{Event, EventFormat, SkipReason};
    use chrono::NaiveDate;

    fn event(name: &str, date: &str) -> Event {
        Event {
            name: name.to_string(),
            format: EventFormat::Online,
            venue: "Virtual".to_string(),
            date: date.to_string(),
            theme: String::new(),
            event_type: "Summit".to_string(),
            submission_deadline: "N/A".to_string(),
            ticket_start_date: "N/A".to_string(),
            ticket_end_date: "N/A".to_string(),
            url: "N/A".to_string(),
            description: String::new(),
            estimated_attendees: 0,
            rank: 0,
        }
    }

    fn batch(outcomes: Vec<RecordOutcome>) -> SourceBatch {
        SourceBatch {
            report: SourceReport::new("stub", SourceKind::PublicHtml, SourceStatus::Ok),
            outcomes,
        }
    }

    #[test]
    fn run_states_only_move_forward() {
        let mut state = RunState::Loaded;
        for next in [
            RunState::Collecting,
            RunState::Merging,
            RunState::Sorted,
            RunState::Persisted,
        ] {
            state.advance(next);
        }
        assert_eq!(state, RunState::Persisted);
    }

    #[test]
    fn merge_batch_counts_added_duplicates_and_skips() {
        let mut catalog = Catalog::new();
        let report = merge_batch(
            &mut catalog,
            batch(vec![
                RecordOutcome::Accepted(event("TensorFlow Dev Summit 2026", "2026-03-25")),
                RecordOutcome::Accepted(event("tensorflow dev summit 2026 ", "2026-03-25")),
                RecordOutcome::Accepted(event("No Date Summit", "soon")),
                RecordOutcome::Skipped(SkipReason::PastDate {
                    name: "Old".into(),
                    date: NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
                }),
            ]),
        );
        assert_eq!(report.added, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.skipped.get("unparseable-date"), Some(&1));
        assert_eq!(report.skipped.get("past-date"), Some(&1));
        assert_eq!(report.skipped_total(), 2);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn summary_renders_counts_and_range() {
        let mut ok = SourceReport::new("curated", SourceKind::Curated, SourceStatus::Ok);
        ok.produced = 20;
        ok.added = 2;
        ok.duplicates = 18;
        let mut scraped = SourceReport::new("conference-index", SourceKind::PublicHtml, SourceStatus::Ok);
        scraped.produced = 3;
        scraped.skipped.insert("past-date".into(), 3);
        let degraded = SourceReport::new(
            "dev-events",
            SourceKind::PublicHtml,
            SourceStatus::Degraded {
                reason: "http status 503 for https://dev.events/AI".into(),
            },
        );
        let summary = ReconcileSummary {
            run_id: Uuid::nil(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            catalog_path: "docs/events_data.json".into(),
            prior_state: PriorState::Loaded,
            loaded: 18,
            collapsed_prior: 0,
            sources: vec![ok, degraded, scraped],
            total_events: 20,
            date_range: Some(("2025-07-15".into(), "2026-11-11".into())),
            final_state: RunState::Persisted,
        };

        let text = summary.to_string();
        assert!(text.contains("prior catalog: 18 events"));
        assert!(text.contains("curated: 20 produced, 2 added, 18 duplicates, 0 skipped"));
        assert!(text.contains("dev-events: degraded, 0 events (http status 503"));
        assert!(text.contains("conference-index: 3 produced, 0 added, 0 duplicates, 3 skipped (past-date: 3)"));
        assert!(text.contains("new events added: 2"));
        assert!(text.contains("date range: 2025-07-15 to 2026-11-11"));
        assert_eq!(summary.degraded_sources(), 1);
    }

    #[test]
    fn config_defaults_point_at_docs_catalog() {
        let config = ReconcileConfig::new(DEFAULT_CATALOG_PATH);
        assert_eq!(config.catalog_path, PathBuf::from("docs/events_data.json"));
        assert_eq!(config.http_timeout_secs, 15);
        assert!(!config.offline);
    }
}
