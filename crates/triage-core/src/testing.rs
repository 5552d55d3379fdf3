//! In-memory `ProjectSource` with scripted responses, shared by unit tests.

use crate::config::{ConfigKey, ConfigStore, Credentials, MemoryBackend};
use crate::source::{ListQuery, ProjectPage, ProjectSource, SourceError};
use crate::types::{Project, ProjectId, ProjectPatch};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn project(id: &str, name: &str, color: Option<&str>, notes: &str) -> Project {
    Project {
        gid: ProjectId::from(id),
        name: name.into(),
        color: color.map(String::from),
        notes: notes.into(),
        created_at: None,
        permalink_url: None,
    }
}

pub fn page(projects: Vec<Project>, next: Option<&str>) -> ProjectPage {
    ProjectPage {
        projects,
        next_offset: next.map(String::from),
    }
}

pub fn configured() -> Arc<ConfigStore> {
    let backend = MemoryBackend::with(&[
        (ConfigKey::Token, "tok"),
        (ConfigKey::Workspace, "ws-1"),
        (ConfigKey::Initials, "AJP"),
    ]);
    Arc::new(ConfigStore::load_with(Box::new(backend), |_| None).unwrap())
}

pub fn unconfigured() -> Arc<ConfigStore> {
    Arc::new(ConfigStore::load_with(Box::new(MemoryBackend::default()), |_| None).unwrap())
}

#[derive(Default)]
pub struct FakeSource {
    pages: Mutex<VecDeque<Result<ProjectPage, SourceError>>>,
    projects: Mutex<VecDeque<Result<Project, SourceError>>>,
    update_result: Mutex<Option<SourceError>>,
    pub list_delay: Option<Duration>,
    pub list_calls: Mutex<Vec<(ListQuery, Option<String>)>>,
    pub get_calls: Mutex<Vec<ProjectId>>,
    pub updates: Mutex<Vec<(ProjectId, ProjectPatch)>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list_delay(delay: Duration) -> Self {
        Self {
            list_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push_page(&self, page: Result<ProjectPage, SourceError>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub fn push_project(&self, project: Result<Project, SourceError>) {
        self.projects.lock().unwrap().push_back(project);
    }

    pub fn fail_updates(&self, error: SourceError) {
        *self.update_result.lock().unwrap() = Some(error);
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ProjectSource for FakeSource {
    async fn list_projects_page(
        &self,
        _creds: &Credentials,
        query: &ListQuery,
        offset: Option<&str>,
    ) -> Result<ProjectPage, SourceError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((query.clone(), offset.map(String::from)));
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ProjectPage::default()))
    }

    async fn get_project(
        &self,
        _creds: &Credentials,
        id: &ProjectId,
        _fields: &[&str],
    ) -> Result<Project, SourceError> {
        self.get_calls.lock().unwrap().push(id.clone());
        self.projects
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SourceError::other(format!("project {id} not found"))))
    }

    async fn update_project(
        &self,
        _creds: &Credentials,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), SourceError> {
        if let Some(err) = self.update_result.lock().unwrap().clone() {
            return Err(err);
        }
        self.updates.lock().unwrap().push((id.clone(), patch.clone()));
        Ok(())
    }
}
