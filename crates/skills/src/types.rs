use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Metadata for one skill directory discovered during a catalog scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillInfo {
    /// Display name — manifest `name` if present, otherwise the slug.
    pub name: String,
    /// Stable key: always the directory name, regardless of manifest content.
    pub slug: String,
    pub description: String,
    pub version: String,
    /// Filesystem path to the skill directory.
    pub path: PathBuf,
}

/// Optional structured manifest inside a skill directory.
#[derive(Debug, Default, Deserialize)]
pub struct SkillManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}
