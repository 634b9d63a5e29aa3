//! Persistence adapter for the agent registry and daemon memory.
//!
//! The registry treats the store as write-behind: in-memory state is
//! authoritative and a failed write degrades durability, not correctness.
//! Two backends implement the trait: a remote REST record store and an
//! embedded SQLite store (also the test backend via `open_memory`).

pub mod rest;
pub mod schema;
pub mod sqlite;

pub use rest::RestStore;
pub use sqlite::SqliteStore;

use crate::types::{AgentPersona, AgentStatus, ContextEntry, CoordinationSession, TaskAssignment};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors from a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("record decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Field updates applied to a persisted persona. Only mutable fields are
/// represented; `updated_at` is always refreshed alongside.
#[derive(Debug, Clone)]
pub struct PersonaUpdate {
    pub status: Option<AgentStatus>,
    pub updated_at: DateTime<Utc>,
}

impl PersonaUpdate {
    pub fn status(status: AgentStatus) -> Self {
        Self {
            status: Some(status),
            updated_at: Utc::now(),
        }
    }
}

/// Durable record store for personas, task assignments, coordination
/// sessions, and the daemon's context log.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load every known persona, any status.
    async fn load_all_personas(&self) -> Result<Vec<AgentPersona>, StoreError>;

    /// Insert a newly registered persona.
    async fn insert_persona(&self, persona: &AgentPersona) -> Result<(), StoreError>;

    /// Apply a field update to a persisted persona.
    async fn update_persona_fields(
        &self,
        agent_id: &str,
        update: &PersonaUpdate,
    ) -> Result<(), StoreError>;

    /// Append a task assignment record (append-only log).
    async fn append_task_assignment(&self, assignment: &TaskAssignment) -> Result<(), StoreError>;

    /// Append a coordination session record (append-only log).
    async fn append_coordination_session(
        &self,
        session: &CoordinationSession,
    ) -> Result<(), StoreError>;

    /// Most recent task assignments, newest first.
    async fn query_recent_task_assignments(
        &self,
        limit: usize,
    ) -> Result<Vec<TaskAssignment>, StoreError>;

    /// Append an entry to the daemon context log.
    async fn store_context(&self, kind: &str, data: &serde_json::Value)
        -> Result<(), StoreError>;

    /// Most recent context entries, newest first.
    async fn recent_context(&self, limit: usize) -> Result<Vec<ContextEntry>, StoreError>;
}
