use serde::Deserialize;

use crate::error::DebugResult;

/// Configuration for the interactive debugger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebugConfig {
    /// Number of REPL inputs kept for recall.
    #[serde(default = "default_repl_history_limit")]
    pub repl_history_limit: usize,
    /// Snapshot table size; `0` means unlimited.
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,
    /// Length of generated snapshot ids (clamped to 4..=32).
    #[serde(default = "default_snapshot_id_length")]
    pub snapshot_id_length: usize,
    /// Whether to pause before the first node executes.
    #[serde(default)]
    pub break_on_start: bool,
}

fn default_repl_history_limit() -> usize {
    100
}

fn default_max_snapshots() -> usize {
    50
}

fn default_snapshot_id_length() -> usize {
    8
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            repl_history_limit: default_repl_history_limit(),
            max_snapshots: default_max_snapshots(),
            snapshot_id_length: default_snapshot_id_length(),
            break_on_start: false,
        }
    }
}

impl DebugConfig {
    pub fn from_json(json: &str) -> DebugResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
