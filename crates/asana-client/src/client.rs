//! HTTP client for the Asana projects endpoints.
//!
//! No caching or retry here; the cache engine owns both.

use crate::error::AsanaError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use triage_core::{
    Credentials, ListQuery, Project, ProjectId, ProjectPage, ProjectPatch, ProjectSource,
    SourceError,
};

pub const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `{"data": ..., "next_page": {"offset": ...}}`
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    next_page: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    offset: String,
}

#[derive(Debug, Serialize)]
struct PatchBody<'a> {
    data: &'a ProjectPatch,
}

#[derive(Debug, Clone)]
pub struct AsanaClient {
    http: Client,
    base_url: String,
}

impl AsanaClient {
    /// Client for the public API.
    pub fn new() -> Result<Self, AsanaError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client for a custom base URL (mock servers in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, AsanaError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One page of projects in a workspace.
    pub async fn list_projects(
        &self,
        token: &str,
        query: &ListQuery,
        offset: Option<&str>,
    ) -> Result<ProjectPage, AsanaError> {
        let url = format!("{}/projects", self.base_url);
        let mut params = vec![
            ("workspace", query.workspace.clone()),
            ("limit", query.limit.to_string()),
            ("archived", query.archived.to_string()),
            ("opt_fields", query.fields.join(",")),
        ];
        if let Some(offset) = offset {
            params.push(("offset", offset.to_string()));
        }

        let envelope: Envelope<Vec<Project>> =
            self.send(self.http.get(&url).bearer_auth(token).query(&params)).await?;
        tracing::debug!(
            count = envelope.data.len(),
            more = envelope.next_page.is_some(),
            "project page received"
        );
        Ok(ProjectPage {
            projects: envelope.data,
            next_offset: envelope.next_page.map(|p| p.offset),
        })
    }

    pub async fn get_project(
        &self,
        token: &str,
        id: &ProjectId,
        fields: &[&str],
    ) -> Result<Project, AsanaError> {
        let url = format!("{}/projects/{}", self.base_url, id);
        let envelope: Envelope<Project> = self
            .send(
                self.http
                    .get(&url)
                    .bearer_auth(token)
                    .query(&[("opt_fields", fields.join(","))]),
            )
            .await?;
        Ok(envelope.data)
    }

    pub async fn update_project(
        &self,
        token: &str,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), AsanaError> {
        let url = format!("{}/projects/{}", self.base_url, id);
        let _: Envelope<serde_json::Value> = self
            .send(
                self.http
                    .put(&url)
                    .bearer_auth(token)
                    .query(&[("opt_fields", patch.fields().join(","))])
                    .json(&PatchBody { data: patch }),
            )
            .await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AsanaError> {
        let response = request.send().await?;
        let status = response.status().as_u16();

        if status >= 400 {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".into());
            return Err(AsanaError::Api { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| AsanaError::InvalidResponse(format!("failed to parse response: {e}")))
    }
}

#[async_trait]
impl ProjectSource for AsanaClient {
    async fn list_projects_page(
        &self,
        creds: &Credentials,
        query: &ListQuery,
        offset: Option<&str>,
    ) -> Result<ProjectPage, SourceError> {
        self.list_projects(&creds.token, query, offset)
            .await
            .map_err(SourceError::from)
    }

    async fn get_project(
        &self,
        creds: &Credentials,
        id: &ProjectId,
        fields: &[&str],
    ) -> Result<Project, SourceError> {
        AsanaClient::get_project(self, &creds.token, id, fields)
            .await
            .map_err(SourceError::from)
    }

    async fn update_project(
        &self,
        creds: &Credentials,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> Result<(), SourceError> {
        AsanaClient::update_project(self, &creds.token, id, patch)
            .await
            .map_err(SourceError::from)
    }
}
