use crate::secrets::KeyringBackend;
use anyhow::Context as _;
use asana_client::{AsanaClient, DEFAULT_BASE_URL};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use triage_core::config::{MemoryBackend, SETTINGS_FILE};
use triage_core::{CacheEngine, ConfigStore, NoteMutator, SecretBackend, Settings, ViewSet};

/// Global flags shared by every subcommand.
pub struct Options {
    pub settings_path: Option<PathBuf>,
    pub json: bool,
    pub no_keyring: bool,
}

/// Locate the settings file.
///
/// Priority:
/// 1. `--config` flag / `TRIAGE_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `triage.yaml`
/// 3. `triage.yaml` in `cwd`, which may not exist
pub fn resolve_settings_path(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let mut dir = cwd.to_path_buf();
    loop {
        let candidate = dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            return candidate;
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    cwd.join(SETTINGS_FILE)
}

/// Everything a command needs, built once from the global flags.
pub struct Context {
    pub json: bool,
    pub settings: Settings,
    pub views: ViewSet,
    pub config: Arc<ConfigStore>,
}

impl Context {
    pub fn load(opts: &Options) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let path = resolve_settings_path(opts.settings_path.as_deref(), &cwd);
        let settings = Settings::load(&path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        let views = settings.view_set().context("invalid view table")?;

        let backend: Box<dyn SecretBackend> = if opts.no_keyring {
            Box::new(MemoryBackend::default())
        } else {
            Box::new(KeyringBackend)
        };
        let config = Arc::new(ConfigStore::load(backend)?);
        tracing::debug!(settings = %path.display(), views = views.len(), "context loaded");

        Ok(Self {
            json: opts.json,
            settings,
            views,
            config,
        })
    }

    /// API client pointed at `ASANA_BASE_URL`, or the public endpoint.
    pub fn client(&self) -> anyhow::Result<Arc<AsanaClient>> {
        let base_url = std::env::var("ASANA_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let client = AsanaClient::with_base_url(base_url)?;
        tracing::debug!(base_url = client.base_url(), "asana client ready");
        Ok(Arc::new(client))
    }

    pub fn engine(&self) -> anyhow::Result<CacheEngine> {
        Ok(CacheEngine::new(
            self.client()?,
            Arc::clone(&self.config),
            self.settings.cache.clone(),
        ))
    }

    pub fn mutator(&self) -> anyhow::Result<NoteMutator> {
        Ok(NoteMutator::new(self.client()?, Arc::clone(&self.config)))
    }
}

/// Run `fut` to completion on a fresh runtime.
pub fn block_on<F: std::future::Future>(fut: F) -> anyhow::Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(fut))
}
