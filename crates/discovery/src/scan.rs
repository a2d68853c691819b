use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::{debug, warn};

use crate::{avatar, identity, types::DiscoveredAgent};

/// Preferred identity document inside a workspace.
const PRIMARY_DOC: &str = "SOUL.md";
/// Fallback document, consulted for a description when the primary has none.
const SECONDARY_DOC: &str = "AGENTS.md";

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Walks a root directory of per-agent workspace folders.
pub struct WorkspaceScanner {
    root: PathBuf,
}

impl WorkspaceScanner {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Discover every agent workspace under the root.
    ///
    /// A missing root is a valid "nothing discovered" state, not an error.
    /// A failure inside one workspace skips that workspace and keeps the
    /// batch going — one corrupt folder must not empty the dashboard.
    pub fn discover(&self) -> Vec<DiscoveredAgent> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "workspace root not readable");
                return Vec::new();
            },
        };

        let mut agents = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || !path.is_dir() {
                continue;
            }
            match scan_workspace(&name, &path) {
                Ok(agent) => agents.push(agent),
                Err(e) => {
                    warn!(workspace = %name, error = %e, "skipping workspace");
                },
            }
        }

        debug!(root = %self.root.display(), count = agents.len(), "workspace scan complete");
        agents
    }
}

/// Assemble one [`DiscoveredAgent`] from a workspace directory.
fn scan_workspace(external_id: &str, path: &Path) -> anyhow::Result<DiscoveredAgent> {
    let mut name = external_id.to_string();
    let mut title = String::new();
    let mut description = String::new();

    let primary = path.join(PRIMARY_DOC);
    if primary.is_file() {
        let parsed = identity::extract_identity(&std::fs::read_to_string(&primary)?);
        if let Some(n) = parsed.name {
            name = n;
        }
        if let Some(t) = parsed.title {
            title = t;
        }
        if let Some(d) = parsed.description {
            description = d;
        }
    }

    // Secondary document only ever contributes a description; name and title
    // from the primary are kept.
    let secondary = path.join(SECONDARY_DOC);
    if description.is_empty() && secondary.is_file() {
        let parsed = identity::extract_identity(&std::fs::read_to_string(&secondary)?);
        if let Some(d) = parsed.description {
            description = d;
        }
    }

    let skills = agentdesk_skills::workspace_slugs(&path.join("skills"));
    let avatar_url = avatar::assign_avatar(external_id, &name);

    Ok(DiscoveredAgent {
        external_id: external_id.to_string(),
        name,
        title,
        description,
        avatar_url,
        skills,
        detected_at_ms: now_ms(),
    })
}

/// Apply configured display-name overrides to a discovered batch, keyed by
/// external id. Runs before reconciliation so the override lands in storage.
pub fn apply_name_overrides(agents: &mut [DiscoveredAgent], overrides: &HashMap<String, String>) {
    for agent in agents {
        if let Some(name) = overrides.get(&agent.external_id) {
            agent.name = name.clone();
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(root: &Path, id: &str) -> PathBuf {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_root_yields_empty_batch() {
        let scanner = WorkspaceScanner::new(PathBuf::from("/nonexistent/agents"));
        assert!(scanner.discover().is_empty());
    }

    #[test]
    fn hidden_and_file_entries_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        workspace(tmp.path(), ".hidden");
        std::fs::write(tmp.path().join("stray.md"), "x").unwrap();
        workspace(tmp.path(), "alex");

        let agents = WorkspaceScanner::new(tmp.path().to_path_buf()).discover();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].external_id, "alex");
    }

    #[test]
    fn identity_and_skills_from_workspace() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = workspace(tmp.path(), "alex");
        std::fs::write(dir.join("SOUL.md"), "name: Alex\ntitle: Engineer\n").unwrap();
        std::fs::create_dir_all(dir.join("skills/git-tools")).unwrap();

        let agents = WorkspaceScanner::new(tmp.path().to_path_buf()).discover();
        assert_eq!(agents.len(), 1);
        let agent = &agents[0];
        assert_eq!(agent.external_id, "alex");
        assert_eq!(agent.name, "Alex");
        assert_eq!(agent.title, "Engineer");
        assert_eq!(agent.skills, vec!["git-tools".to_string()]);
        assert!(agent.avatar_url.starts_with("/assets/agents/alex_"));
        assert!(agent.detected_at_ms > 0);
    }

    #[test]
    fn bare_workspace_uses_directory_name() {
        let tmp = tempfile::tempdir().unwrap();
        workspace(tmp.path(), "ghost");

        let agents = WorkspaceScanner::new(tmp.path().to_path_buf()).discover();
        assert_eq!(agents[0].name, "ghost");
        assert_eq!(agents[0].title, "");
        assert!(agents[0].skills.is_empty());
    }

    #[test]
    fn secondary_doc_fills_missing_description_only() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = workspace(tmp.path(), "kevin");
        std::fs::write(dir.join("SOUL.md"), "name: Kevin\n").unwrap();
        std::fs::write(dir.join("AGENTS.md"), "name: Someone Else\n\nRuns the help desk.\n")
            .unwrap();

        let agents = WorkspaceScanner::new(tmp.path().to_path_buf()).discover();
        let agent = &agents[0];
        assert_eq!(agent.name, "Kevin");
        assert_eq!(agent.description, "Runs the help desk.");
    }

    #[test]
    fn primary_description_is_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = workspace(tmp.path(), "lena");
        std::fs::write(dir.join("SOUL.md"), "name: Lena\n\nWrites the docs.\n").unwrap();
        std::fs::write(dir.join("AGENTS.md"), "\nSomething different.\n").unwrap();

        let agents = WorkspaceScanner::new(tmp.path().to_path_buf()).discover();
        assert_eq!(agents[0].description, "Writes the docs.");
    }

    #[test]
    fn name_overrides_apply_by_external_id() {
        let mut agents = vec![DiscoveredAgent {
            external_id: "alex".into(),
            name: "Alex".into(),
            title: String::new(),
            description: String::new(),
            avatar_url: String::new(),
            skills: Vec::new(),
            detected_at_ms: 0,
        }];
        let overrides = HashMap::from([("alex".to_string(), "Alexandra".to_string())]);
        apply_name_overrides(&mut agents, &overrides);
        assert_eq!(agents[0].name, "Alexandra");
    }
}
