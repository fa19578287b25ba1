//! Catalog persistence + HTTP fetch utilities for the events catalog.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aec_core::Event;
use anyhow::Context;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

pub const CRATE_NAME: &str = "aec-storage";

pub const DEFAULT_CATALOG_PATH: &str = "docs/events_data.json";

/// What was found on disk when loading prior state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLoad {
    Missing,
    Loaded(Vec<Event>),
    /// The file exists but could not be read or parsed. Callers rebuild from
    /// scratch, so entries no adapter still produces are lost on the next save.
    Corrupt { reason: String },
}

impl CatalogLoad {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    pub fn into_events(self) -> Vec<Event> {
        match self {
            Self::Loaded(events) => events,
            Self::Missing | Self::Corrupt { .. } => Vec::new(),
        }
    }
}

/// JSON file holding the ordered array of catalog events.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads prior state. Never fails: a missing file is an empty catalog and
    /// an unreadable one is reported as [`CatalogLoad::Corrupt`]. Only a file
    /// that is not a JSON array is corrupt; a single bad row is dropped with a
    /// warning and the rest are kept.
    pub async fn load(&self) -> CatalogLoad {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no existing catalog, starting fresh");
                return CatalogLoad::Missing;
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "catalog unreadable, starting fresh");
                return CatalogLoad::Corrupt {
                    reason: format!("reading {}: {err}", self.path.display()),
                };
            }
        };

        let rows = match serde_json::from_str::<Vec<serde_json::Value>>(&text) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "catalog corrupt, starting fresh");
                return CatalogLoad::Corrupt {
                    reason: format!("parsing {}: {err}", self.path.display()),
                };
            }
        };

        let mut events = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<Event>(row) {
                Ok(event) => events.push(event),
                Err(err) => {
                    warn!(path = %self.path.display(), index, error = %err, "dropping malformed catalog row");
                }
            }
        }
        info!(path = %self.path.display(), count = events.len(), "loaded existing catalog");
        CatalogLoad::Loaded(events)
    }

    /// Writes the full catalog via a temp file and atomic rename, creating
    /// parent directories as needed.
    pub async fn save(&self, events: &[Event]) -> anyhow::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .await
            .with_context(|| format!("creating catalog directory {}", parent.display()))?;

        let mut bytes = serde_json::to_vec_pretty(events).context("serializing catalog")?;
        bytes.push(b'\n');

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());
        let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
            .await
            .with_context(|| format!("opening temp catalog file {}", temp_path.display()))?;
        let written: std::io::Result<()> = async {
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err)
                .with_context(|| format!("writing temp catalog file {}", temp_path.display()));
        }

        if let Err(err) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(err).with_context(|| {
                format!(
                    "atomically renaming temp catalog {} -> {}",
                    temp_path.display(),
                    self.path.display()
                )
            });
        }

        info!(path = %self.path.display(), count = events.len(), "saved catalog");
        Ok(())
    }
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },
}

/// Single-attempt GET client. A timed-out or failed request is the caller's
/// signal to give up on that source for this run.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .context("building reqwest client")?;
        Ok(Self { client })
    }

    pub async fn fetch_text(&self, source_id: &str, url: &str) -> Result<FetchedPage, FetchError> {
        let span = tracing::info_span!("http_fetch", source_id, url);
        async {
            let resp = self.client.get(url).send().await?;
            let status = resp.status();
            let final_url = resp.url().to_string();
            if !status.is_success() {
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    url: final_url,
                });
            }
            let body = resp.text().await?;
            Ok(FetchedPage {
                final_url,
                body,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aec_core::EventFormat;
    use tempfile::tempdir;

    fn event(name: &str, date: &str, venue: &str) -> Event {
        Event {
            name: name.to_string(),
            format: EventFormat::Hybrid,
            venue: venue.to_string(),
            date: date.to_string(),
            theme: "Machine Learning".to_string(),
            event_type: "Conference".to_string(),
            submission_deadline: "N/A".to_string(),
            ticket_start_date: "2026-01-15".to_string(),
            ticket_end_date: "N/A".to_string(),
            url: "https://example.org".to_string(),
            description: "Ünïcode stays verbatim 東京".to_string(),
            estimated_attendees: 1200,
            rank: 1,
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_missing() {
        let dir = tempdir().expect("tempdir");
        let store = CatalogStore::new(dir.path().join("docs/events_data.json"));
        assert_eq!(store.load().await, CatalogLoad::Missing);
    }

    #[tokio::test]
    async fn corrupt_file_is_flagged_not_fatal() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("events_data.json");
        std::fs::write(&path, "[{\"name\": \"half a record\"").expect("write");
        let loaded = CatalogStore::new(&path).load().await;
        assert!(loaded.is_corrupt());
        assert!(loaded.into_events().is_empty());
    }

    #[tokio::test]
    async fn bad_rows_are_dropped_and_good_rows_survive() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("events_data.json");
        std::fs::write(
            &path,
            r##"[
  {"name": "AI Africa Summit 2026", "format": "Hybrid", "date": "2026-09-16", "#": 1},
  {"name": "AI LATAM 2026", "format": "In-Person", "date": "2026-11-11", "estimated_attendees": "2,000", "#": 2},
  {"format": "Online", "date": "2026-12-01", "#": 3},
  "stray note"
]"##,
        )
        .expect("write");

        let loaded = CatalogStore::new(&path).load().await;
        let CatalogLoad::Loaded(events) = loaded else {
            panic!("expected loaded catalog");
        };
        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["AI Africa Summit 2026", "AI LATAM 2026"]);
        assert_eq!(events[1].format, EventFormat::InPerson);
        assert_eq!(events[1].estimated_attendees, 2000);
    }

    #[tokio::test]
    async fn non_array_catalog_is_corrupt() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("events_data.json");
        std::fs::write(&path, r#"{"events": []}"#).expect("write");
        assert!(CatalogStore::new(&path).load().await.is_corrupt());
    }

    #[tokio::test]
    async fn save_then_load_round_trips_and_creates_directories() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested/docs/events_data.json");
        let store = CatalogStore::new(&path);
        let events = vec![
            event("AI Africa Summit 2026", "2026-09-16", "Cape Town, South Africa"),
            event("AI LATAM 2026", "2026-11-11", "São Paulo, Brazil"),
        ];

        store.save(&events).await.expect("save");
        assert_eq!(store.load().await, CatalogLoad::Loaded(events));

        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.contains("São Paulo"));
        assert!(text.contains("東京"));
        assert!(text.starts_with("[\n  {\n    \"name\""));
    }

    #[tokio::test]
    async fn save_overwrites_and_leaves_no_temp_files() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("events_data.json");
        let store = CatalogStore::new(&path);

        store
            .save(&[event("A", "2026-01-01", "Paris")])
            .await
            .expect("first save");
        store
            .save(&[event("B", "2026-02-02", "Rome")])
            .await
            .expect("second save");

        let loaded = store.load().await.into_events();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "B");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn default_client_config_identifies_as_a_browser() {
        let config = HttpClientConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(HttpFetcher::new(config).is_ok());
    }
}
