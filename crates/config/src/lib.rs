//! Configuration loading for the agentdesk dashboard engine.
//!
//! Config files: `agentdesk.toml` or `agentdesk.json`, searched in `./` then
//! the user config dir (`~/.config/agentdesk/`). Missing files fall back to
//! defaults, never to an error.

pub mod loader;
pub mod schema;

pub use {
    loader::{clear_data_dir, config_dir, data_dir, discover_and_load, load_config, set_data_dir},
    schema::{AgentsConfig, DatabaseConfig, DeskConfig, SkillsConfig, WorkspaceConfig},
};
