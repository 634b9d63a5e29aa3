//! Schema definitions for the embedded SQLite record store.

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Full DDL for the quorum record store.
pub const CREATE_SCHEMA: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

-- Agent personas (full catalogue, any status)
CREATE TABLE IF NOT EXISTS agent_personas (
    agent_id            TEXT PRIMARY KEY,
    name                TEXT NOT NULL,
    role                TEXT NOT NULL,
    personality_traits  TEXT NOT NULL DEFAULT '{}',
    communication_style TEXT NOT NULL DEFAULT 'professional',
    expertise_areas     TEXT NOT NULL DEFAULT '[]',
    authority_level     INTEGER NOT NULL DEFAULT 5,
    social_accounts     TEXT NOT NULL DEFAULT '{}',
    contact_info        TEXT NOT NULL DEFAULT '{}',
    status              TEXT NOT NULL DEFAULT 'active',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

-- Task assignment log (append-only)
CREATE TABLE IF NOT EXISTS task_assignments (
    assignment_id    TEXT PRIMARY KEY,
    agent_id         TEXT NOT NULL,
    task_type        TEXT NOT NULL,
    task_description TEXT NOT NULL DEFAULT '',
    assigned_at      TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'assigned'
);

-- Coordination session log (append-only)
CREATE TABLE IF NOT EXISTS coordination_sessions (
    session_id        TEXT PRIMARY KEY,
    coordination_type TEXT NOT NULL,
    participants      TEXT NOT NULL DEFAULT '[]',
    started_at        TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'active'
);

-- Daemon context log (cycle summaries, monitoring snapshots)
CREATE TABLE IF NOT EXISTS context_log (
    id          TEXT PRIMARY KEY,
    kind        TEXT NOT NULL,
    data        TEXT NOT NULL DEFAULT '{}',
    recorded_at TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_personas_role ON agent_personas(role);
CREATE INDEX IF NOT EXISTS idx_assignments_at ON task_assignments(assigned_at);
CREATE INDEX IF NOT EXISTS idx_sessions_at ON coordination_sessions(started_at);
CREATE INDEX IF NOT EXISTS idx_context_at ON context_log(recorded_at);
"#;
