//! Remote record store client (PostgREST-style HTTP API).
//!
//! Table-per-record-kind layout: `agent_personas`, `task_assignments`,
//! `coordination_sessions`, `context_log`.

use crate::store::{PersonaUpdate, RecordStore, StoreError};
use crate::types::*;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

/// HTTP record store client.
#[derive(Debug, Clone)]
pub struct RestStore {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct StatusPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<&'a str>,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct ContextInsert<'a> {
    kind: &'a str,
    data: &'a serde_json::Value,
    recorded_at: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn check(resp: &reqwest::Response) -> Result<(), StoreError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: status.canonical_reason().unwrap_or("").to_string(),
            });
        }
        Ok(())
    }

    async fn insert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        record: &T,
    ) -> Result<(), StoreError> {
        debug!("Record store insert into {}", table);
        let resp = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(record)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn load_all_personas(&self) -> Result<Vec<AgentPersona>, StoreError> {
        let resp = self
            .http
            .get(self.table_url("agent_personas"))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[("select", "*")])
            .send()
            .await?;

        Self::check(&resp)?;
        let personas: Vec<AgentPersona> = resp.json().await?;
        debug!("Loaded {} personas from record store", personas.len());
        Ok(personas)
    }

    async fn insert_persona(&self, persona: &AgentPersona) -> Result<(), StoreError> {
        self.insert("agent_personas", persona).await
    }

    async fn update_persona_fields(
        &self,
        agent_id: &str,
        update: &PersonaUpdate,
    ) -> Result<(), StoreError> {
        let status_str = update.status.map(|s| s.to_string());
        let patch = StatusPatch {
            status: status_str.as_deref(),
            updated_at: update.updated_at.to_rfc3339(),
        };

        let resp = self
            .http
            .patch(self.table_url("agent_personas"))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[("agent_id", format!("eq.{agent_id}"))])
            .json(&patch)
            .send()
            .await?;

        Self::check(&resp)
    }

    async fn append_task_assignment(&self, assignment: &TaskAssignment) -> Result<(), StoreError> {
        self.insert("task_assignments", assignment).await
    }

    async fn append_coordination_session(
        &self,
        session: &CoordinationSession,
    ) -> Result<(), StoreError> {
        self.insert("coordination_sessions", session).await
    }

    async fn query_recent_task_assignments(
        &self,
        limit: usize,
    ) -> Result<Vec<TaskAssignment>, StoreError> {
        let resp = self
            .http
            .get(self.table_url("task_assignments"))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", "*".to_string()),
                ("order", "assigned_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        Self::check(&resp)?;
        Ok(resp.json().await?)
    }

    async fn store_context(
        &self,
        kind: &str,
        data: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let record = ContextInsert {
            kind,
            data,
            recorded_at: Utc::now().to_rfc3339(),
        };
        self.insert("context_log", &record).await
    }

    async fn recent_context(&self, limit: usize) -> Result<Vec<ContextEntry>, StoreError> {
        let resp = self
            .http
            .get(self.table_url("context_log"))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", "kind,data,recorded_at".to_string()),
                ("order", "recorded_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        Self::check(&resp)?;
        Ok(resp.json().await?)
    }
}
