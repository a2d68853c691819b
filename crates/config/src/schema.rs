use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level agentdesk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeskConfig {
    pub workspace: WorkspaceConfig,
    pub skills: SkillsConfig,
    pub database: DatabaseConfig,
    pub agents: AgentsConfig,
}

/// Where agent workspaces live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Root directory holding one subdirectory per agent.
    /// Defaults to `<data_dir>/agents` when unset.
    pub root: Option<PathBuf>,
}

impl WorkspaceConfig {
    pub fn resolved_root(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("agents"))
    }
}

/// Skill catalog roots. Scanned in order; first occurrence of a slug wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillsConfig {
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// sqlx connection URL. `mode=rwc` creates the file on first use.
    pub url: Option<String>,
}

impl DatabaseConfig {
    pub fn resolved_url(&self) -> String {
        self.url.clone().unwrap_or_else(|| {
            let path = crate::loader::data_dir().join("agentdesk.db");
            format!("sqlite://{}?mode=rwc", path.display())
        })
    }
}

/// Per-agent tweaks applied on top of discovery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentsConfig {
    /// Display-name overrides keyed by external id (workspace dir name).
    pub overrides: HashMap<String, String>,
}
