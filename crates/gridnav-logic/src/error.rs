//! Error types for scene loading and path planning.

use thiserror::Error;

use crate::geometry::GridCell;
use crate::scene::{NodeId, SceneId};

/// Failures at the scene loader boundary.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene data parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Scene #{0} does not exist")]
    UnknownScene(SceneId),

    #[error("Scene #{0} is defined more than once")]
    DuplicateScene(SceneId),

    #[error("Node #{0} is defined more than once")]
    DuplicateNode(NodeId),

    #[error("Fence #{0} is defined more than once")]
    DuplicateFence(u64),
}

/// Caller-visible planning failures.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Node #{0} not found in scene")]
    NodeNotFound(NodeId),

    #[error("Start {start} or end {end} is not traversable")]
    NotTraversable { start: GridCell, end: GridCell },

    #[error("No traversable path from {start} to {end} (blocked by fences or disconnected)")]
    NoPathFound { start: GridCell, end: GridCell },

    #[error("Scene load failed: {0}")]
    Load(#[from] LoadError),
}

pub type Result<T> = std::result::Result<T, PlanError>;
