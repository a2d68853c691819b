//! Skill directory scanning.
//!
//! A skill is a directory under one of the configured catalog roots. The
//! directory name is the skill's stable slug; everything else (display name,
//! description, version) is best-effort metadata read from an optional
//! `package.json` manifest with README/SKILL.md fallbacks.

pub mod scan;
pub mod types;

pub use {
    scan::{SkillScanner, parse_skill_dir, workspace_slugs},
    types::SkillInfo,
};
