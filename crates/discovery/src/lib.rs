//! Agent workspace discovery.
//!
//! Walks a root directory of per-agent workspace folders, extracts identity
//! metadata from loosely-formatted `SOUL.md`/`AGENTS.md` documents, and
//! assembles one [`DiscoveredAgent`] per workspace. Discovery never mutates
//! persistent state; reconciliation lives in `agentdesk-store`.

pub mod avatar;
pub mod identity;
pub mod scan;
pub mod types;

pub use {
    avatar::{assign_avatar, sprite_for},
    identity::{Identity, extract_identity},
    scan::{WorkspaceScanner, apply_name_overrides},
    types::DiscoveredAgent,
};
