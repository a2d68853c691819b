use serde::{Deserialize, Serialize};

/// One agent workspace as seen on disk, produced fresh each scan.
///
/// `external_id` is the workspace directory name — the stable key that
/// reconciliation matches persistent records against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredAgent {
    pub external_id: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub avatar_url: String,
    /// Slugs from the workspace's local `skills/` folder, resolved lazily
    /// against the catalog at reconciliation time.
    pub skills: Vec<String>,
    /// Unix millis of the scan that produced this record.
    pub detected_at_ms: i64,
}
