use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields requested from the API for every project read.
pub const DEFAULT_FIELDS: &[&str] = &["name", "color", "permalink_url", "notes", "created_at"];

// ---------------------------------------------------------------------------
// ProjectId
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        ProjectId(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        ProjectId(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A project record as returned by the API. Fields the API omits fall back to
/// their defaults; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub gid: ProjectId,
    #[serde(default)]
    pub name: String,
    /// Internal color identifier, e.g. `light-purple`.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink_url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// ProjectPatch
// ---------------------------------------------------------------------------

/// Partial update sent to the API. Only the set fields are serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ProjectPatch {
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Default::default()
        }
    }

    pub fn color(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            ..Default::default()
        }
    }

    /// Field names the API should echo back after the update.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["name"];
        if self.notes.is_some() {
            fields.push("notes");
        }
        if self.color.is_some() {
            fields.push("color");
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable copy of every project fetched in one refresh.
///
/// `fetched_at` is `None` only for the empty snapshot that exists before the
/// first successful refresh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(projects: Vec<Project>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            projects,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.fetched_at.map(|at| now - at)
    }

    /// True when the snapshot was never fetched or is at least `ttl` old.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        match self.age(now) {
            None => true,
            Some(age) => age.num_seconds() >= ttl.as_secs() as i64,
        }
    }

    /// Compact age for display: `42s`, `5m`, `2h`, or `None` if never fetched.
    pub fn age_label(&self, now: DateTime<Utc>) -> Option<String> {
        self.age(now).map(|age| format_age(age.num_seconds().max(0)))
    }
}

pub fn format_age(secs: i64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h", secs / 3600)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
