//! Planner tuning knobs.
//!
//! Deserializable from any serde format; missing fields fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};

/// Gap length (in cells) that connectivity repair will bridge by default.
pub const DEFAULT_MAX_GAP_FILL: i32 = 3;

/// Configuration for a [`PathPlanner`](crate::pathfinding::PathPlanner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Largest same-axis distance between two authored cells that gets
    /// filled with intermediate cells. Values of 1 or less disable repair.
    pub max_gap_fill: i32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_gap_fill: DEFAULT_MAX_GAP_FILL,
        }
    }
}

impl PlannerConfig {
    pub fn with_max_gap_fill(mut self, max_gap_fill: i32) -> Self {
        self.max_gap_fill = max_gap_fill;
        self
    }
}
