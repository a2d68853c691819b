use std::sync::Arc;

use {agentdesk_discovery::DiscoveredAgent, serde::Serialize, tracing::warn};

use crate::{agents::AgentStore, skills::SkillStore};

/// Aggregate result of one reconciliation run.
///
/// `skills_synced` counts every slug successfully associated this run, not
/// just newly created links — it reports work done, not novelty.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub created: u64,
    pub updated: u64,
    pub skills_synced: u64,
}

/// Merges discovered agents into persistent storage by external id.
///
/// Upsert-by-natural-key: the filesystem is the source of truth for identity,
/// so records are matched on `external_id`, never on the surrogate id.
/// Records are never deleted here; a workspace that disappears leaves its
/// record behind until removed manually.
pub struct Reconciler {
    agents: Arc<dyn AgentStore>,
    skills: Arc<dyn SkillStore>,
}

impl Reconciler {
    pub fn new(agents: Arc<dyn AgentStore>, skills: Arc<dyn SkillStore>) -> Self {
        Self { agents, skills }
    }

    /// Reconcile a discovered batch, one record at a time.
    ///
    /// A failing record is logged and dropped from the counts; the batch
    /// keeps going. 99 reconciled agents and one logged failure beats an
    /// all-or-nothing transaction on a dashboard.
    pub async fn reconcile(&self, batch: &[DiscoveredAgent]) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for agent in batch {
            match self.reconcile_one(agent).await {
                Ok((created, skills_synced)) => {
                    if created {
                        summary.created += 1;
                    } else {
                        summary.updated += 1;
                    }
                    summary.skills_synced += skills_synced;
                },
                Err(e) => {
                    warn!(external_id = %agent.external_id, error = %e, "failed to reconcile agent");
                },
            }
        }

        summary
    }

    /// Returns `(created, skills_synced)` for one record.
    async fn reconcile_one(&self, agent: &DiscoveredAgent) -> crate::Result<(bool, u64)> {
        let (agent_id, created) = match self.agents.find_by_external_id(&agent.external_id).await? {
            Some(existing) => {
                self.agents.update_detected(existing.id, agent).await?;
                (existing.id, false)
            },
            None => (self.agents.insert_detected(agent).await?, true),
        };

        let mut synced = 0;
        for slug in &agent.skills {
            match self.sync_skill(agent_id, slug).await {
                Ok(()) => synced += 1,
                Err(e) => {
                    warn!(external_id = %agent.external_id, slug = %slug, error = %e,
                        "failed to sync skill");
                },
            }
        }

        Ok((created, synced))
    }

    /// Find-or-create the skill, then idempotently link it to the agent.
    async fn sync_skill(&self, agent_id: i64, slug: &str) -> crate::Result<()> {
        let skill_id = match self.skills.find_by_slug(slug).await? {
            Some(skill) => skill.id,
            None => self.skills.insert_placeholder(slug).await?,
        };
        self.skills.link_agent(agent_id, skill_id).await
    }
}
