//! The remote side of the cache: a paginated project listing, a single
//! project read, and a partial update.

use crate::config::Credentials;
use crate::types::{Project, ProjectId, ProjectPatch, DEFAULT_FIELDS};
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Server overloaded (HTTP 503); worth retrying after a pause.
    Transient,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transient,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Other,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == SourceErrorKind::Transient
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SourceError {}

/// Parameters for one listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub workspace: String,
    pub limit: u32,
    pub archived: bool,
    pub fields: Vec<&'static str>,
}

impl ListQuery {
    /// Unarchived projects in `workspace`, with the default field selection.
    pub fn active(workspace: &str, limit: u32) -> Self {
        Self {
            workspace: workspace.to_string(),
            limit,
            archived: false,
            fields: DEFAULT_FIELDS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPage {
    pub projects: Vec<Project>,
    /// Offset token for the next page; `None` on the last page.
    pub next_offset: Option<String>,
}

#[async_trait]
pub trait ProjectSource: Send + Sync {
    async fn list_projects_page(
        &self,
        creds: &Credentials,
        query: &ListQuery,
        offset: Option<&str>,
    ) -> Result<ProjectPage, SourceError>;

    async fn get_project(
        &self,
        creds: &Credentials,
        id: &ProjectId,
        fields: &[&str],
    ) -> Result<Project, SourceError>;

    async fn update_project(
        &self,
        creds: &Credentials,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), SourceError>;
}
