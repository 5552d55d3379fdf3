//! Writes back to the API: dated notes, holds, and color changes.
//!
//! Notes are read-modify-write: the project's current notes are fetched right
//! before the update so a stale snapshot never overwrites someone else's
//! edit. This narrows the window for lost updates but does not close it.
//! Mutations are never retried.

use crate::config::ConfigStore;
use crate::error::{Result, TriageError};
use crate::palette::PaletteColor;
use crate::source::ProjectSource;
use crate::types::{ProjectId, ProjectPatch};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

/// Only this many leading lines are searched for the header separator.
const HEADER_SCAN_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Confirmation {
    pub project_id: ProjectId,
    pub message: String,
    /// The full notes written, for note mutations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `MM/DD text`, followed by ` ///INITIALS` when the author is known.
pub fn compose_line(text: &str, initials: Option<&str>, now: DateTime<Local>) -> String {
    let mut line = format!("{} {}", now.format("%m/%d"), text.trim());
    if let Some(initials) = initials.filter(|i| !i.is_empty()) {
        line.push_str(" ///");
        line.push_str(initials);
    }
    line
}

/// Insert `line` after the first blank line among the first five lines of
/// `existing`, keeping a pinned header above it. Without such a blank line
/// the new line goes on top.
pub fn insert_note(existing: &str, line: &str) -> String {
    if existing.is_empty() {
        return line.to_string();
    }
    let mut lines: Vec<&str> = existing.split('\n').collect();
    let blank = lines
        .iter()
        .take(HEADER_SCAN_LINES)
        .position(|l| l.trim().is_empty());
    match blank {
        Some(i) => lines.insert(i + 1, line),
        None => lines.insert(0, line),
    }
    lines.join("\n")
}

/// The note text that places a hold through `until`.
///
/// Two-digit years only read back as 2000-2069, so any other year is
/// written in full.
pub fn hold_text(until: NaiveDate) -> String {
    let format = if (2000..=2069).contains(&until.year()) {
        "%m/%d/%y"
    } else {
        "%m/%d/%Y"
    };
    format!("hold {}", until.format(format))
}

pub struct NoteMutator {
    source: Arc<dyn ProjectSource>,
    config: Arc<ConfigStore>,
}

impl NoteMutator {
    pub fn new(source: Arc<dyn ProjectSource>, config: Arc<ConfigStore>) -> Self {
        Self { source, config }
    }

    /// Add a dated, attributed note line to the project's notes.
    pub async fn add_note(&self, text: &str, project_id: &ProjectId) -> Result<Confirmation> {
        self.add_note_at(text, project_id, Local::now()).await
    }

    pub async fn add_note_at(
        &self,
        text: &str,
        project_id: &ProjectId,
        now: DateTime<Local>,
    ) -> Result<Confirmation> {
        let creds = self.config.credentials()?;
        let line = compose_line(text, Some(&creds.initials), now);

        let current = self
            .source
            .get_project(&creds, project_id, &["notes"])
            .await
            .map_err(|e| {
                tracing::error!(project = %project_id, error = %e, "could not read current notes");
                TriageError::UpdateFailed(e.message)
            })?;

        let notes = insert_note(&current.notes, &line);
        self.source
            .update_project(&creds, project_id, &ProjectPatch::notes(notes.clone()))
            .await
            .map_err(|e| {
                tracing::error!(project = %project_id, error = %e, "note update rejected");
                TriageError::UpdateFailed(e.message)
            })?;

        tracing::info!(project = %project_id, "note added");
        Ok(Confirmation {
            project_id: project_id.clone(),
            message: "Note added.".to_string(),
            notes: Some(notes),
        })
    }

    /// Hide the project from the caller's views through `until`.
    pub async fn add_hold(&self, project_id: &ProjectId, until: NaiveDate) -> Result<Confirmation> {
        self.add_note(&hold_text(until), project_id).await
    }

    /// Recolor a project using a user-facing color name.
    pub async fn change_color(&self, color: &str, project_id: &ProjectId) -> Result<Confirmation> {
        let creds = self.config.credentials()?;
        let color = PaletteColor::from_str(color)?;

        self.source
            .update_project(&creds, project_id, &ProjectPatch::color(color.internal()))
            .await
            .map_err(|e| {
                tracing::error!(project = %project_id, error = %e, "color update rejected");
                TriageError::UpdateFailed(e.message)
            })?;

        Ok(Confirmation {
            project_id: project_id.clone(),
            message: format!("Color changed to {color}."),
            notes: None,
        })
    }
}
