use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, warn};

use crate::schema::DeskConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["agentdesk.toml", "agentdesk.json"];

/// Process-wide data dir override (set by `--data-dir`).
static DATA_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Override the data directory for this process.
pub fn set_data_dir(dir: PathBuf) {
    if let Ok(mut guard) = DATA_DIR_OVERRIDE.write() {
        *guard = Some(dir);
    }
}

/// Clear the data directory override (used by tests).
pub fn clear_data_dir() {
    if let Ok(mut guard) = DATA_DIR_OVERRIDE.write() {
        *guard = None;
    }
}

/// Returns the data directory where the database and default workspace roots
/// live. Honors the `--data-dir` override, otherwise the platform data dir.
pub fn data_dir() -> PathBuf {
    if let Ok(guard) = DATA_DIR_OVERRIDE.read()
        && let Some(dir) = guard.as_ref()
    {
        return dir.clone();
    }
    directories::ProjectDirs::from("", "", "agentdesk")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".agentdesk"))
}

/// Returns the user-global config directory (`~/.config/agentdesk/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "agentdesk").map(|d| d.config_dir().to_path_buf())
}

/// Load config from the given path (TOML or JSON by extension).
pub fn load_config(path: &Path) -> anyhow::Result<DeskConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<DeskConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./agentdesk.{toml,json}` (project-local)
/// 2. `~/.config/agentdesk/agentdesk.{toml,json}` (user-global)
///
/// Returns `DeskConfig::default()` if no config file is found or the file
/// fails to parse — a broken config file degrades to defaults with a warning.
pub fn discover_and_load() -> DeskConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    DeskConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    if let Some(config_dir) = config_dir() {
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentdesk.toml");
        std::fs::write(&path, "[workspace]\nroot = \"/srv/agents\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.workspace.root, Some(PathBuf::from("/srv/agents")));
    }

    #[test]
    fn load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentdesk.json");
        std::fs::write(&path, r#"{"skills": {"roots": ["/opt/skills"]}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.skills.roots, vec![PathBuf::from("/opt/skills")]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agentdesk.ini");
        std::fs::write(&path, "workspace=x").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn data_dir_override_round_trip() {
        set_data_dir(PathBuf::from("/tmp/desk-test"));
        assert_eq!(data_dir(), PathBuf::from("/tmp/desk-test"));
        clear_data_dir();
        assert_ne!(data_dir(), PathBuf::from("/tmp/desk-test"));
    }
}
