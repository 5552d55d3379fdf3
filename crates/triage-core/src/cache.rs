//! Time-bounded snapshot of every active project in the workspace.
//!
//! Reads inside the TTL return the installed `Arc<Snapshot>` without touching
//! the network. Refreshes drain every page, retry on 503 with exponential
//! backoff, and install the result in one step; a failed refresh leaves the
//! previous snapshot in place. Refreshes are serialized, and a caller that
//! queued behind a refresh which succeeded takes its result instead of
//! fetching again.

use crate::config::{CacheSettings, ConfigStore, Credentials};
use crate::error::{Result, TriageError};
use crate::source::{ListQuery, ProjectSource, SourceError};
use crate::types::{Project, Snapshot};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tokio::time::Instant;

struct Installed {
    snapshot: Arc<Snapshot>,
    /// Monotonic fetch time used for the TTL.
    fetched: Option<Instant>,
    generation: u64,
}

pub struct CacheEngine {
    source: Arc<dyn ProjectSource>,
    config: Arc<ConfigStore>,
    settings: CacheSettings,
    state: RwLock<Installed>,
    refresh: Mutex<()>,
}

impl CacheEngine {
    pub fn new(
        source: Arc<dyn ProjectSource>,
        config: Arc<ConfigStore>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            source,
            config,
            settings,
            state: RwLock::new(Installed {
                snapshot: Arc::new(Snapshot::empty()),
                fetched: None,
                generation: 0,
            }),
            refresh: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Return the cached snapshot while it is younger than the TTL, otherwise
    /// fetch a new one. `force` skips the TTL check.
    pub async fn get_snapshot(&self, force: bool) -> Result<Arc<Snapshot>> {
        if !force {
            if let Some(snapshot) = self.fresh() {
                return Ok(snapshot);
            }
        }

        let creds = self.config.credentials()?;
        let seen = self.generation();
        let _guard = self.refresh.lock().await;

        if self.generation() != seen {
            tracing::debug!("refresh completed while waiting, reusing it");
            return Ok(self.snapshot());
        }

        let projects = self.fetch_all(&creds).await?;
        Ok(self.install(projects))
    }

    /// The installed snapshot, which is empty before the first refresh.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.read().snapshot)
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.read().snapshot.fetched_at
    }

    /// True when the next non-forced read would go to the network.
    pub fn is_stale(&self) -> bool {
        self.fresh().is_none()
    }

    fn fresh(&self) -> Option<Arc<Snapshot>> {
        let state = self.read();
        let fetched = state.fetched?;
        (fetched.elapsed() < self.settings.ttl()).then(|| Arc::clone(&state.snapshot))
    }

    fn generation(&self) -> u64 {
        self.read().generation
    }

    fn install(&self, projects: Vec<Project>) -> Arc<Snapshot> {
        let snapshot = Arc::new(Snapshot::new(projects, Utc::now()));
        let mut state = self.write();
        state.snapshot = Arc::clone(&snapshot);
        state.fetched = Some(Instant::now());
        state.generation += 1;
        snapshot
    }

    async fn fetch_all(&self, creds: &Credentials) -> Result<Vec<Project>> {
        let max_attempts = self.settings.max_attempts();
        let mut delay = self.settings.backoff_base();
        let mut attempt = 1;
        loop {
            tracing::info!(attempt, "fetching fresh projects data");
            match self.drain(creds).await {
                Ok(projects) => {
                    tracing::info!(count = projects.len(), "projects found");
                    return Ok(projects);
                }
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "service unavailable, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempt, error = %e, "project refresh failed");
                    return Err(TriageError::FetchFailed(e.message));
                }
            }
        }
    }

    async fn drain(&self, creds: &Credentials) -> std::result::Result<Vec<Project>, SourceError> {
        let query = ListQuery::active(&creds.workspace, self.settings.page_size());
        let mut projects = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let page = self
                .source
                .list_projects_page(creds, &query, offset.as_deref())
                .await?;
            projects.extend(page.projects);
            match page.next_offset {
                Some(next) => offset = Some(next),
                None => return Ok(projects),
            }
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Installed> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Installed> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
