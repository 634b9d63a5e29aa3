//! Embedded SQLite record store with WAL mode and migration support.
//!
//! Used when no remote record store is configured, and in-memory for
//! tests.

use crate::store::schema;
use crate::store::{PersonaUpdate, RecordStore, StoreError};
use crate::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// SQLite-backed record store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing and ephemeral runs).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run schema creation and migrations.
    fn migrate(conn: &Connection) -> Result<(), StoreError> {
        let version: u32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if version == 0 {
            info!("Creating record store schema v{}", schema::SCHEMA_VERSION);
            conn.execute_batch(schema::CREATE_SCHEMA)?;
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::SCHEMA_VERSION],
            )?;
        } else if version < schema::SCHEMA_VERSION {
            conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }
}

fn parse_timestamp(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Decode one persona row. A row whose role or status no longer parses
/// is skipped with a warning rather than coerced to a different value.
fn persona_from_row(row: &Row<'_>) -> rusqlite::Result<Option<AgentPersona>> {
    let agent_id: String = row.get(0)?;
    let role_raw: String = row.get(2)?;
    let Ok(role) = role_raw.parse::<AgentRole>() else {
        warn!(
            "Skipping persona {} with unrecognized role '{}'",
            agent_id, role_raw
        );
        return Ok(None);
    };
    let status_raw: String = row.get(9)?;
    let Ok(status) = status_raw.parse::<AgentStatus>() else {
        warn!(
            "Skipping persona {} with unrecognized status '{}'",
            agent_id, status_raw
        );
        return Ok(None);
    };

    Ok(Some(AgentPersona {
        agent_id,
        name: row.get(1)?,
        role,
        personality_traits: serde_json::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        communication_style: row.get(4)?,
        expertise_areas: serde_json::from_str(&row.get::<_, String>(5)?).unwrap_or_default(),
        authority_level: row.get::<_, i64>(6)? as u8,
        social_accounts: serde_json::from_str(&row.get::<_, String>(7)?).unwrap_or_default(),
        contact_info: serde_json::from_str(&row.get::<_, String>(8)?).unwrap_or_default(),
        status,
        created_at: row.get::<_, String>(10).map(parse_timestamp)?,
        updated_at: row.get::<_, String>(11).map(parse_timestamp)?,
    }))
}

const PERSONA_COLUMNS: &str = "agent_id, name, role, personality_traits, communication_style, \
     expertise_areas, authority_level, social_accounts, contact_info, status, created_at, updated_at";

#[async_trait]
impl RecordStore for SqliteStore {
    async fn load_all_personas(&self) -> Result<Vec<AgentPersona>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PERSONA_COLUMNS} FROM agent_personas ORDER BY created_at"
        ))?;
        let rows = stmt.query_map([], persona_from_row)?;

        let mut personas = Vec::new();
        for row in rows {
            if let Some(persona) = row? {
                personas.push(persona);
            }
        }
        Ok(personas)
    }

    async fn insert_persona(&self, persona: &AgentPersona) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO agent_personas (agent_id, name, role, personality_traits,
                communication_style, expertise_areas, authority_level, social_accounts,
                contact_info, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                persona.agent_id,
                persona.name,
                persona.role.to_string(),
                serde_json::to_string(&persona.personality_traits)?,
                persona.communication_style,
                serde_json::to_string(&persona.expertise_areas)?,
                persona.authority_level as i64,
                serde_json::to_string(&persona.social_accounts)?,
                serde_json::to_string(&persona.contact_info)?,
                persona.status.to_string(),
                persona.created_at.to_rfc3339(),
                persona.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn update_persona_fields(
        &self,
        agent_id: &str,
        update: &PersonaUpdate,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        if let Some(status) = update.status {
            conn.execute(
                "UPDATE agent_personas SET status = ?2, updated_at = ?3 WHERE agent_id = ?1",
                params![
                    agent_id,
                    status.to_string(),
                    update.updated_at.to_rfc3339()
                ],
            )?;
        } else {
            conn.execute(
                "UPDATE agent_personas SET updated_at = ?2 WHERE agent_id = ?1",
                params![agent_id, update.updated_at.to_rfc3339()],
            )?;
        }
        Ok(())
    }

    async fn append_task_assignment(&self, assignment: &TaskAssignment) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO task_assignments (assignment_id, agent_id, task_type,
                task_description, assigned_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                assignment.assignment_id,
                assignment.agent_id,
                assignment.task_type,
                assignment.task_description,
                assignment.assigned_at.to_rfc3339(),
                assignment.status,
            ],
        )?;
        Ok(())
    }

    async fn append_coordination_session(
        &self,
        session: &CoordinationSession,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO coordination_sessions (session_id, coordination_type,
                participants, started_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.session_id,
                session.coordination_type,
                serde_json::to_string(&session.participants)?,
                session.started_at.to_rfc3339(),
                session.status,
            ],
        )?;
        Ok(())
    }

    async fn query_recent_task_assignments(
        &self,
        limit: usize,
    ) -> Result<Vec<TaskAssignment>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT assignment_id, agent_id, task_type, task_description, assigned_at, status
             FROM task_assignments ORDER BY assigned_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(TaskAssignment {
                assignment_id: row.get(0)?,
                agent_id: row.get(1)?,
                task_type: row.get(2)?,
                task_description: row.get(3)?,
                assigned_at: row.get::<_, String>(4).map(parse_timestamp)?,
                status: row.get(5)?,
            })
        })?;

        let mut assignments = Vec::new();
        for row in rows {
            assignments.push(row?);
        }
        Ok(assignments)
    }

    async fn store_context(
        &self,
        kind: &str,
        data: &serde_json::Value,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO context_log (id, kind, data, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                ulid::Ulid::new().to_string(),
                kind,
                serde_json::to_string(data)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn recent_context(&self, limit: usize) -> Result<Vec<ContextEntry>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT kind, data, recorded_at FROM context_log
             ORDER BY recorded_at DESC, rowid DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ContextEntry {
                kind: row.get(0)?,
                data: serde_json::from_str(&row.get::<_, String>(1)?)
                    .unwrap_or(serde_json::Value::Null),
                recorded_at: row.get::<_, String>(2).map(parse_timestamp)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_persona(id: &str, role: AgentRole) -> AgentPersona {
        let now = Utc::now();
        AgentPersona {
            agent_id: id.to_string(),
            name: format!("Persona {id}"),
            role,
            personality_traits: HashMap::from([("precision".to_string(), 9.0)]),
            communication_style: "technical_but_clear".into(),
            expertise_areas: vec!["blockchain".into(), "mining".into()],
            authority_level: 8,
            social_accounts: HashMap::new(),
            contact_info: HashMap::new(),
            status: AgentStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn persona_round_trip() {
        let store = SqliteStore::open_memory().unwrap();
        let persona = sample_persona("p1", AgentRole::Technical);
        store.insert_persona(&persona).await.unwrap();

        let loaded = store.load_all_personas().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].agent_id, "p1");
        assert_eq!(loaded[0].role, AgentRole::Technical);
        assert_eq!(loaded[0].expertise_areas, vec!["blockchain", "mining"]);
        assert_eq!(loaded[0].authority_level, 8);
        assert_eq!(loaded[0].status, AgentStatus::Active);
    }

    #[tokio::test]
    async fn corrupt_role_or_status_rows_are_skipped() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .insert_persona(&sample_persona("good", AgentRole::Technical))
            .await
            .unwrap();

        {
            let conn = store.conn.lock().await;
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO agent_personas (agent_id, name, role, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params!["bad-role", "Ghost", "wizard", "active", now, now],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO agent_personas (agent_id, name, role, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params!["bad-status", "Ghost", "technical", "retired", now, now],
            )
            .unwrap();
        }

        let loaded = store.load_all_personas().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].agent_id, "good");
    }

    #[tokio::test]
    async fn status_update_persists() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .insert_persona(&sample_persona("p1", AgentRole::Community))
            .await
            .unwrap();

        store
            .update_persona_fields("p1", &PersonaUpdate::status(AgentStatus::Suspended))
            .await
            .unwrap();

        let loaded = store.load_all_personas().await.unwrap();
        assert_eq!(loaded[0].status, AgentStatus::Suspended);
    }

    #[tokio::test]
    async fn assignments_come_back_newest_first() {
        let store = SqliteStore::open_memory().unwrap();
        for i in 0..5 {
            let assignment = TaskAssignment {
                assignment_id: format!("a{i}"),
                agent_id: "p1".into(),
                task_type: "technical".into(),
                task_description: format!("task {i}"),
                assigned_at: Utc::now() + chrono::Duration::seconds(i),
                status: "assigned".into(),
            };
            store.append_task_assignment(&assignment).await.unwrap();
        }

        let recent = store.query_recent_task_assignments(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].assignment_id, "a4");
        assert_eq!(recent[2].assignment_id, "a2");
    }

    #[tokio::test]
    async fn context_log_round_trip() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .store_context("cycle_summary", &serde_json::json!({"cycle": 1}))
            .await
            .unwrap();
        store
            .store_context("cycle_summary", &serde_json::json!({"cycle": 2}))
            .await
            .unwrap();

        let entries = store.recent_context(10).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].data["cycle"], 2);
        assert_eq!(entries[1].data["cycle"], 1);
    }
}
