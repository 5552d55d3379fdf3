use crate::error::{Result, TriageError};
use crate::view::{ViewDefinition, ViewSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "triage.yaml";

// ---------------------------------------------------------------------------
// ConfigKey
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKey {
    Token,
    Workspace,
    Initials,
}

impl ConfigKey {
    pub fn all() -> &'static [ConfigKey] {
        &[ConfigKey::Token, ConfigKey::Workspace, ConfigKey::Initials]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Token => "token",
            ConfigKey::Workspace => "workspace",
            ConfigKey::Initials => "initials",
        }
    }

    /// Environment variable that overrides the stored value.
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKey::Token => "ASANA_TOKEN",
            ConfigKey::Workspace => "ASANA_WORKSPACE",
            ConfigKey::Initials => "ASANA_INITIALS",
        }
    }

    fn normalize(self, value: &str) -> String {
        match self {
            ConfigKey::Initials => value.trim().to_uppercase(),
            _ => value.trim().to_string(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfigKey {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "token" => Ok(ConfigKey::Token),
            "workspace" => Ok(ConfigKey::Workspace),
            "initials" => Ok(ConfigKey::Initials),
            _ => Err(TriageError::UnknownConfigKey(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// SecretBackend
// ---------------------------------------------------------------------------

/// Where secrets live between runs (OS keychain in the CLI, memory in tests).
pub trait SecretBackend: Send + Sync {
    fn get(&self, key: ConfigKey) -> Result<Option<String>>;
    fn set(&self, key: ConfigKey, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<ConfigKey, String>>,
}

impl MemoryBackend {
    pub fn with(values: &[(ConfigKey, &str)]) -> Self {
        let map = values.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Self {
            values: Mutex::new(map),
        }
    }
}

impl SecretBackend for MemoryBackend {
    fn get(&self, key: ConfigKey) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| TriageError::Secret("memory backend poisoned".into()))?;
        Ok(values.get(&key).cloned())
    }

    fn set(&self, key: ConfigKey, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| TriageError::Secret("memory backend poisoned".into()))?;
        values.insert(key, value.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ConfigStore
// ---------------------------------------------------------------------------

/// Owned copy of a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub workspace: String,
    pub initials: String,
}

#[derive(Debug, Clone, Default)]
struct Values {
    token: Option<String>,
    workspace: Option<String>,
    initials: Option<String>,
}

impl Values {
    fn slot(&mut self, key: ConfigKey) -> &mut Option<String> {
        match key {
            ConfigKey::Token => &mut self.token,
            ConfigKey::Workspace => &mut self.workspace,
            ConfigKey::Initials => &mut self.initials,
        }
    }

    fn get(&self, key: ConfigKey) -> Option<&String> {
        match key {
            ConfigKey::Token => self.token.as_ref(),
            ConfigKey::Workspace => self.workspace.as_ref(),
            ConfigKey::Initials => self.initials.as_ref(),
        }
    }
}

/// The three secrets every request needs.
pub struct ConfigStore {
    backend: Box<dyn SecretBackend>,
    values: RwLock<Values>,
}

impl ConfigStore {
    /// Load every key from the process environment, falling back to `backend`.
    pub fn load(backend: Box<dyn SecretBackend>) -> Result<Self> {
        Self::load_with(backend, |var| std::env::var(var).ok())
    }

    /// Like [`ConfigStore::load`] with an explicit environment lookup.
    pub fn load_with<F>(backend: Box<dyn SecretBackend>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = Values::default();
        for key in ConfigKey::all() {
            let value = match env(key.env_var()).filter(|v| !v.trim().is_empty()) {
                Some(v) => Some(v),
                None => backend.get(*key)?,
            };
            *values.slot(*key) = value
                .map(|v| key.normalize(&v))
                .filter(|v| !v.is_empty());
        }
        Ok(Self {
            backend,
            values: RwLock::new(values),
        })
    }

    pub fn get(&self, key: ConfigKey) -> Option<String> {
        self.read().get(key).cloned()
    }

    /// Persist `value` to the backend and make it current. Initials are
    /// stored upper-cased.
    pub fn set(&self, key: ConfigKey, value: &str) -> Result<()> {
        let value = key.normalize(value);
        self.backend.set(key, &value)?;
        let mut values = self
            .values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *values.slot(key) = Some(value).filter(|v| !v.is_empty());
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        let values = self.read();
        ConfigKey::all().iter().all(|k| values.get(*k).is_some())
    }

    pub fn initials(&self) -> Option<String> {
        self.get(ConfigKey::Initials)
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let values = self.read();
        match (&values.token, &values.workspace, &values.initials) {
            (Some(token), Some(workspace), Some(initials)) => Ok(Credentials {
                token: token.clone(),
                workspace: workspace.clone(),
                initials: initials.clone(),
            }),
            _ => Err(TriageError::NotConfigured),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Values> {
        self.values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_page_size() -> u32 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            page_size: default_page_size(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// The API caps pages at 100 items.
    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, 100)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

/// Optional `triage.yaml`: cache tuning and a replacement view table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<Vec<ViewDefinition>>,
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// The configured view table, or the built-in one.
    pub fn view_set(&self) -> Result<ViewSet> {
        match &self.views {
            Some(views) => ViewSet::new(views.clone()),
            None => Ok(ViewSet::default()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
