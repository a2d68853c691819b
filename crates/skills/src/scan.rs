use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::types::{SkillInfo, SkillManifest};

/// Structured manifest checked first.
const MANIFEST_FILE: &str = "package.json";
/// Fallback: first `#` heading becomes the description.
const README_FILE: &str = "README.md";
/// Fallback: `description:` line becomes the description.
const SKILL_DOC: &str = "SKILL.md";

const DEFAULT_DESCRIPTION: &str = "No description available";
const DEFAULT_VERSION: &str = "unknown";

/// Scans configured catalog roots for skill directories.
pub struct SkillScanner {
    /// Roots in priority order. The first root to contribute a slug wins.
    roots: Vec<PathBuf>,
}

impl SkillScanner {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Default catalog roots: the shared skills dir plus every agent
    /// workspace's local `skills/` folder that exists.
    pub fn default_roots(workspace_root: &Path) -> Vec<PathBuf> {
        let mut roots = vec![agentdesk_config::data_dir().join("skills")];
        if let Ok(entries) = std::fs::read_dir(workspace_root) {
            for entry in entries.flatten() {
                let skills_dir = entry.path().join("skills");
                if skills_dir.is_dir() {
                    roots.push(skills_dir);
                }
            }
        }
        roots
    }

    /// Scan all roots and return one [`SkillInfo`] per distinct slug.
    ///
    /// Roots are scanned in order; a slug seen in an earlier root shadows the
    /// same slug in later roots. Missing roots are skipped silently — an
    /// unconfigured machine is a valid "no skills" state.
    pub fn scan_all(&self) -> Vec<SkillInfo> {
        let mut skills = Vec::new();
        let mut seen = HashSet::new();

        for root in &self.roots {
            let entries = match std::fs::read_dir(root) {
                Ok(e) => e,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_dir() {
                    continue;
                }
                let Some(slug) = dir_name(&path) else {
                    continue;
                };
                if slug.starts_with('.') || !seen.insert(slug.clone()) {
                    continue;
                }
                skills.push(parse_skill_dir(&path, &slug));
            }
        }

        debug!(count = skills.len(), "skill catalog scan complete");
        skills
    }
}

/// Read metadata for a single skill directory.
///
/// Fallback chain: manifest → README heading → SKILL.md `description:` line →
/// literal defaults. Every step degrades instead of failing; the slug alone is
/// enough to produce a record.
pub fn parse_skill_dir(path: &Path, slug: &str) -> SkillInfo {
    let mut name = slug.to_string();
    let mut description = String::new();
    let mut version = String::new();

    match read_manifest(path) {
        Ok(Some(manifest)) => {
            if let Some(n) = manifest.name {
                name = n;
            }
            description = manifest.description.unwrap_or_default();
            version = manifest.version.unwrap_or_default();
        },
        Ok(None) => {},
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable skill manifest");
        },
    }

    if description.is_empty()
        && let Ok(readme) = std::fs::read_to_string(path.join(README_FILE))
        && let Some(heading) = first_heading(&readme)
    {
        description = heading;
    }

    if description.is_empty()
        && let Ok(doc) = std::fs::read_to_string(path.join(SKILL_DOC))
        && let Some(desc) = description_line(&doc)
    {
        description = desc;
    }

    SkillInfo {
        name,
        slug: slug.to_string(),
        description: if description.is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            description
        },
        version: if version.is_empty() {
            DEFAULT_VERSION.to_string()
        } else {
            version
        },
        path: path.to_path_buf(),
    }
}

/// List skill slugs inside one agent workspace's local `skills/` folder.
///
/// Only directory names are returned; metadata is resolved lazily at
/// reconciliation time. A missing folder yields an empty list.
pub fn workspace_slugs(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };
    entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| dir_name(&e.path()))
        .filter(|name| !name.starts_with('.'))
        .collect()
}

fn read_manifest(path: &Path) -> anyhow::Result<Option<SkillManifest>> {
    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&manifest_path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

/// First `#` heading of a markdown document, with the marker stripped.
fn first_heading(text: &str) -> Option<String> {
    text.lines()
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_string())
        .filter(|heading| !heading.is_empty())
}

/// First `description:` line (case-insensitive), value trimmed.
fn description_line(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let trimmed = line.trim();
        let lower = trimmed.to_ascii_lowercase();
        let value = lower
            .strip_prefix("description:")
            .map(|rest| trimmed[trimmed.len() - rest.len()..].trim())?;
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}
