//! Persistent storage and reconciliation for the dashboard.
//!
//! The reconciliation engine in this crate owns the entire write path into
//! `agents` / `skills` / `agent_skills`. Discovery only produces values; this
//! crate merges them into the database with create-or-update semantics.

pub mod agents;
pub mod error;
pub mod reconcile;
pub mod skills;

pub use {
    agents::{AgentRecord, AgentStore, SqliteAgentStore},
    error::{Error, Result},
    reconcile::{Reconciler, SyncSummary},
    skills::{SkillRecord, SkillStore, SqliteSkillStore},
};

/// Create the schema. Called once at startup, before any store is used.
/// `IF NOT EXISTS` keeps repeated startups and in-memory test pools cheap.
pub async fn init(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS agents (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id   TEXT    NOT NULL UNIQUE,
            name          TEXT    NOT NULL,
            title         TEXT    NOT NULL DEFAULT '',
            description   TEXT    NOT NULL DEFAULT '',
            avatar_url    TEXT    NOT NULL DEFAULT '',
            department_id INTEGER NOT NULL DEFAULT 1,
            desk_x        INTEGER NOT NULL DEFAULT 0,
            desk_y        INTEGER NOT NULL DEFAULT 0,
            status        TEXT    NOT NULL DEFAULT 'idle',
            last_detected INTEGER NOT NULL,
            created_at    INTEGER NOT NULL,
            updated_at    INTEGER NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS skills (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            slug        TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            version     TEXT NOT NULL DEFAULT 'unknown',
            path        TEXT NOT NULL DEFAULT ''
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS agent_skills (
            agent_id INTEGER NOT NULL REFERENCES agents(id),
            skill_id INTEGER NOT NULL REFERENCES skills(id),
            PRIMARY KEY (agent_id, skill_id)
        )"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
