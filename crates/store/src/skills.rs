use {agentdesk_skills::SkillInfo, async_trait::async_trait, serde::Serialize};

use crate::error::Result;

/// Description used when a skill is created lazily from a slug reference
/// before any catalog scan has seen its directory.
const PLACEHOLDER_DESCRIPTION: &str = "Auto-detected skill";

/// A persisted skill. `slug` is the stable key.
#[derive(Debug, Clone, Serialize)]
pub struct SkillRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub version: String,
    pub source_path: String,
}

/// Persistence seam for the skill catalog and agent-skill associations.
#[async_trait]
pub trait SkillStore: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<SkillRecord>>;

    /// Lazily create a skill from a bare slug reference. The slug doubles as
    /// the display name until a catalog scan fills in real metadata.
    async fn insert_placeholder(&self, slug: &str) -> Result<i64>;

    /// Destructive catalog refresh: replace the whole `skills` table with the
    /// scan output, inside one transaction. Skills absent from `skills`
    /// disappear; that is the scan's contract.
    async fn replace_all(&self, skills: &[SkillInfo]) -> Result<usize>;

    /// Associate an agent with a skill. Duplicate links are no-ops.
    async fn link_agent(&self, agent_id: i64, skill_id: i64) -> Result<()>;

    async fn list(&self) -> Result<Vec<SkillRecord>>;
}

/// SQLite-backed skill store.
pub struct SqliteSkillStore {
    pool: sqlx::SqlitePool,
}

impl SqliteSkillStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillStore for SqliteSkillStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<SkillRecord>> {
        let row = sqlx::query_as::<_, SkillRow>("SELECT * FROM skills WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_placeholder(&self, slug: &str) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"INSERT INTO skills (name, slug, description)
               VALUES (?, ?, ?)
               ON CONFLICT(slug) DO UPDATE SET slug = excluded.slug
               RETURNING id"#,
        )
        .bind(slug)
        .bind(slug)
        .bind(PLACEHOLDER_DESCRIPTION)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn replace_all(&self, skills: &[SkillInfo]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM agent_skills").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM skills").execute(&mut *tx).await?;
        for skill in skills {
            sqlx::query(
                "INSERT INTO skills (name, slug, description, version, path) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&skill.name)
            .bind(&skill.slug)
            .bind(&skill.description)
            .bind(&skill.version)
            .bind(skill.path.to_string_lossy().as_ref())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(skills.len())
    }

    async fn link_agent(&self, agent_id: i64, skill_id: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO agent_skills (agent_id, skill_id) VALUES (?, ?) \
             ON CONFLICT(agent_id, skill_id) DO NOTHING",
        )
        .bind(agent_id)
        .bind(skill_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SkillRecord>> {
        let rows = sqlx::query_as::<_, SkillRow>("SELECT * FROM skills ORDER BY slug")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct SkillRow {
    id: i64,
    name: String,
    slug: String,
    description: String,
    version: String,
    path: String,
}

impl From<SkillRow> for SkillRecord {
    fn from(r: SkillRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            version: r.version,
            source_path: r.path,
        }
    }
}
