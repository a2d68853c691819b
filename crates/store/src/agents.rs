use std::time::{SystemTime, UNIX_EPOCH};

use {agentdesk_discovery::DiscoveredAgent, async_trait::async_trait, serde::Serialize};

use crate::error::Result;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// A persisted agent. At most one record per `external_id`; the surrogate
/// `id` exists only for joins.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRecord {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub avatar_url: String,
    pub department_id: i64,
    pub desk_x: i64,
    pub desk_y: i64,
    pub status: String,
    pub last_detected_ms: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Persistence seam for agent records.
#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<AgentRecord>>;

    /// Insert a newly detected agent with default placement and status.
    /// Returns the surrogate id. Keyed on `external_id`, so a concurrent
    /// insert of the same workspace resolves to an update, not a duplicate.
    async fn insert_detected(&self, agent: &DiscoveredAgent) -> Result<i64>;

    /// Refresh the mutable identity fields and `last_detected` of an
    /// existing record. Placement and status are operator-owned and never
    /// touched by detection.
    async fn update_detected(&self, id: i64, agent: &DiscoveredAgent) -> Result<()>;

    async fn list(&self) -> Result<Vec<AgentRecord>>;
}

/// SQLite-backed agent store.
pub struct SqliteAgentStore {
    pool: sqlx::SqlitePool,
}

impl SqliteAgentStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgentStore for SqliteAgentStore {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<AgentRecord>> {
        let row = sqlx::query_as::<_, AgentRow>("SELECT * FROM agents WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_detected(&self, agent: &DiscoveredAgent) -> Result<i64> {
        let now = now_ms();
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO agents (external_id, name, title, description, avatar_url,
                                   department_id, desk_x, desk_y, status,
                                   last_detected, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, 1, 0, 0, 'idle', ?, ?, ?)
               ON CONFLICT(external_id) DO UPDATE SET
                 name = excluded.name,
                 title = excluded.title,
                 description = excluded.description,
                 avatar_url = excluded.avatar_url,
                 last_detected = excluded.last_detected,
                 updated_at = excluded.updated_at
               RETURNING id"#,
        )
        .bind(&agent.external_id)
        .bind(&agent.name)
        .bind(&agent.title)
        .bind(&agent.description)
        .bind(&agent.avatar_url)
        .bind(agent.detected_at_ms)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_detected(&self, id: i64, agent: &DiscoveredAgent) -> Result<()> {
        sqlx::query(
            r#"UPDATE agents
               SET name = ?, title = ?, description = ?, avatar_url = ?,
                   last_detected = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&agent.name)
        .bind(&agent.title)
        .bind(&agent.description)
        .bind(&agent.avatar_url)
        .bind(agent.detected_at_ms)
        .bind(now_ms())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<AgentRecord>> {
        let rows = sqlx::query_as::<_, AgentRow>("SELECT * FROM agents ORDER BY external_id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct AgentRow {
    id: i64,
    external_id: String,
    name: String,
    title: String,
    description: String,
    avatar_url: String,
    department_id: i64,
    desk_x: i64,
    desk_y: i64,
    status: String,
    last_detected: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<AgentRow> for AgentRecord {
    fn from(r: AgentRow) -> Self {
        Self {
            id: r.id,
            external_id: r.external_id,
            name: r.name,
            title: r.title,
            description: r.description,
            avatar_url: r.avatar_url,
            department_id: r.department_id,
            desk_x: r.desk_x,
            desk_y: r.desk_y,
            status: r.status,
            last_detected_ms: r.last_detected,
            created_at_ms: r.created_at,
            updated_at_ms: r.updated_at,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn discovered(external_id: &str, name: &str) -> DiscoveredAgent {
        DiscoveredAgent {
            external_id: external_id.into(),
            name: name.into(),
            title: "Engineer".into(),
            description: "desc".into(),
            avatar_url: "/assets/agents/alex_ne.png".into(),
            skills: Vec::new(),
            detected_at_ms: 1_000,
        }
    }

    async fn pool() -> sqlx::SqlitePool {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::init(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn insert_sets_default_placement() {
        let store = SqliteAgentStore::new(pool().await);
        store.insert_detected(&discovered("alex", "Alex")).await.unwrap();

        let rec = store.find_by_external_id("alex").await.unwrap().unwrap();
        assert_eq!(rec.name, "Alex");
        assert_eq!(rec.department_id, 1);
        assert_eq!((rec.desk_x, rec.desk_y), (0, 0));
        assert_eq!(rec.status, "idle");
        assert_eq!(rec.last_detected_ms, 1_000);
    }

    #[tokio::test]
    async fn update_preserves_placement_and_status() {
        let store = SqliteAgentStore::new(pool().await);
        let id = store.insert_detected(&discovered("alex", "Alex")).await.unwrap();

        let mut renamed = discovered("alex", "Alexandra");
        renamed.detected_at_ms = 2_000;
        store.update_detected(id, &renamed).await.unwrap();

        let rec = store.find_by_external_id("alex").await.unwrap().unwrap();
        assert_eq!(rec.id, id);
        assert_eq!(rec.name, "Alexandra");
        assert_eq!(rec.last_detected_ms, 2_000);
        assert_eq!(rec.status, "idle");
    }

    #[tokio::test]
    async fn insert_is_an_upsert_on_external_id() {
        let store = SqliteAgentStore::new(pool().await);
        let first = store.insert_detected(&discovered("alex", "Alex")).await.unwrap();
        let second = store.insert_detected(&discovered("alex", "Al")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.find_by_external_id("alex").await.unwrap().unwrap().name, "Al");
    }

    #[tokio::test]
    async fn find_missing_is_none() {
        let store = SqliteAgentStore::new(pool().await);
        assert!(store.find_by_external_id("nobody").await.unwrap().is_none());
    }
}
