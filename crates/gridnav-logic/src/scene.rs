//! Scene data as seen by the planner, and the loader boundary that supplies it.
//!
//! The planner only reads scenes through [`SceneLoader`]. Production code backs
//! it with the persistence layer; [`SceneStore`] is the in-memory version used
//! by the harness and tests, loadable from a JSON scene file.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::geometry::{segments_intersect, GridCell};

pub type SceneId = u64;
pub type NodeId = u64;
pub type FenceId = u64;

/// An authored waypoint belonging to one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub scene_id: SceneId,
    pub order: u32,
    pub cell: GridCell,
}

/// A straight barrier between two grid points. Directionless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fence {
    pub id: FenceId,
    pub scene_id: SceneId,
    pub order: u32,
    pub a: GridCell,
    pub b: GridCell,
}

impl Fence {
    /// Whether a straight move from `from` to `to` touches this fence.
    pub fn blocks(&self, from: GridCell, to: GridCell) -> bool {
        segments_intersect(from, to, self.a, self.b)
    }
}

/// Canvas metadata. Consumed by the UI only; planning ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneMeta {
    pub id: SceneId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub origin_x: i32,
    #[serde(default)]
    pub origin_y: i32,
}

impl SceneMeta {
    pub fn new(id: SceneId) -> Self {
        Self {
            id,
            name: String::new(),
            width: 0,
            height: 0,
            origin_x: 0,
            origin_y: 0,
        }
    }
}

/// Read-only source of scene snapshots.
///
/// All returned collections contain non-deleted rows only.
pub trait SceneLoader {
    /// Nodes of a scene, in authoring order.
    fn load_nodes(&self, scene_id: SceneId) -> Result<Vec<Node>, LoadError>;

    /// Fences of a scene, in authoring order.
    fn load_fences(&self, scene_id: SceneId) -> Result<Vec<Fence>, LoadError>;

    /// A single node by id, regardless of scene. `Ok(None)` if unknown.
    fn load_node_by_id(&self, node_id: NodeId) -> Result<Option<Node>, LoadError>;
}

impl<L: SceneLoader + ?Sized> SceneLoader for &L {
    fn load_nodes(&self, scene_id: SceneId) -> Result<Vec<Node>, LoadError> {
        (**self).load_nodes(scene_id)
    }

    fn load_fences(&self, scene_id: SceneId) -> Result<Vec<Fence>, LoadError> {
        (**self).load_fences(scene_id)
    }

    fn load_node_by_id(&self, node_id: NodeId) -> Result<Option<Node>, LoadError> {
        (**self).load_node_by_id(node_id)
    }
}

impl<L: SceneLoader + ?Sized> SceneLoader for Arc<L> {
    fn load_nodes(&self, scene_id: SceneId) -> Result<Vec<Node>, LoadError> {
        (**self).load_nodes(scene_id)
    }

    fn load_fences(&self, scene_id: SceneId) -> Result<Vec<Fence>, LoadError> {
        (**self).load_fences(scene_id)
    }

    fn load_node_by_id(&self, node_id: NodeId) -> Result<Option<Node>, LoadError> {
        (**self).load_node_by_id(node_id)
    }
}

// ── Scene file format ───────────────────────────────────────────────────

/// Top-level JSON scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub scenes: Vec<SceneRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(flatten)]
    pub meta: SceneMeta,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub fences: Vec<FenceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub order: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FenceRecord {
    pub id: FenceId,
    #[serde(default)]
    pub order: u32,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    #[serde(default)]
    pub deleted: bool,
}

// ── In-memory store ─────────────────────────────────────────────────────

/// In-memory scene snapshot store.
///
/// Rejects duplicate ids and references to unknown scenes on insert, so
/// everything handed to the planner is already well-formed.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    scenes: HashMap<SceneId, SceneMeta>,
    nodes: HashMap<NodeId, Node>,
    /// scene_id → node ids, kept sorted by (order, id)
    scene_nodes: HashMap<SceneId, Vec<NodeId>>,
    /// scene_id → fences, kept sorted by (order, id)
    fences: HashMap<SceneId, Vec<Fence>>,
    fence_ids: HashSet<FenceId>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a parsed scene file. Soft-deleted rows are dropped.
    pub fn from_scene_file(file: SceneFile) -> Result<Self, LoadError> {
        let mut store = Self::new();
        for record in file.scenes {
            let scene_id = record.meta.id;
            store.add_scene(record.meta)?;
            for n in record.nodes.into_iter().filter(|n| !n.deleted) {
                store.insert_node(Node {
                    id: n.id,
                    scene_id,
                    order: n.order,
                    cell: GridCell::new(n.x, n.y),
                })?;
            }
            for f in record.fences.into_iter().filter(|f| !f.deleted) {
                store.insert_fence(Fence {
                    id: f.id,
                    scene_id,
                    order: f.order,
                    a: GridCell::new(f.x1, f.y1),
                    b: GridCell::new(f.x2, f.y2),
                })?;
            }
        }
        log::debug!(
            "Scene store loaded: {} scenes, {} nodes, {} fences",
            store.scenes.len(),
            store.nodes.len(),
            store.fence_ids.len()
        );
        Ok(store)
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let file: SceneFile = serde_json::from_str(json)?;
        Self::from_scene_file(file)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn add_scene(&mut self, meta: SceneMeta) -> Result<(), LoadError> {
        if self.scenes.contains_key(&meta.id) {
            return Err(LoadError::DuplicateScene(meta.id));
        }
        self.scene_nodes.insert(meta.id, Vec::new());
        self.fences.insert(meta.id, Vec::new());
        self.scenes.insert(meta.id, meta);
        Ok(())
    }

    /// Append a node at the end of the scene's authoring order.
    pub fn add_node(
        &mut self,
        scene_id: SceneId,
        node_id: NodeId,
        cell: impl Into<GridCell>,
    ) -> Result<(), LoadError> {
        let order = self.scene_nodes.get(&scene_id).map_or(0, |ids| ids.len() as u32);
        self.insert_node(Node {
            id: node_id,
            scene_id,
            order,
            cell: cell.into(),
        })
    }

    /// Append a fence at the end of the scene's fence order.
    pub fn add_fence(
        &mut self,
        scene_id: SceneId,
        fence_id: FenceId,
        a: impl Into<GridCell>,
        b: impl Into<GridCell>,
    ) -> Result<(), LoadError> {
        let order = self.fences.get(&scene_id).map_or(0, |f| f.len() as u32);
        self.insert_fence(Fence {
            id: fence_id,
            scene_id,
            order,
            a: a.into(),
            b: b.into(),
        })
    }

    pub fn insert_node(&mut self, node: Node) -> Result<(), LoadError> {
        if self.nodes.contains_key(&node.id) {
            return Err(LoadError::DuplicateNode(node.id));
        }
        let ids = self
            .scene_nodes
            .get_mut(&node.scene_id)
            .ok_or(LoadError::UnknownScene(node.scene_id))?;
        ids.push(node.id);
        self.nodes.insert(node.id, node);

        let nodes = &self.nodes;
        ids.sort_by_key(|id| nodes.get(id).map(|n| (n.order, n.id)));
        Ok(())
    }

    pub fn insert_fence(&mut self, fence: Fence) -> Result<(), LoadError> {
        if self.fence_ids.contains(&fence.id) {
            return Err(LoadError::DuplicateFence(fence.id));
        }
        let fences = self
            .fences
            .get_mut(&fence.scene_id)
            .ok_or(LoadError::UnknownScene(fence.scene_id))?;
        fences.push(fence);
        fences.sort_by_key(|f| (f.order, f.id));
        self.fence_ids.insert(fence.id);
        Ok(())
    }

    pub fn scene(&self, scene_id: SceneId) -> Option<&SceneMeta> {
        self.scenes.get(&scene_id)
    }

    /// Scene ids in ascending order.
    pub fn scene_ids(&self) -> Vec<SceneId> {
        let mut ids: Vec<SceneId> = self.scenes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl SceneLoader for SceneStore {
    fn load_nodes(&self, scene_id: SceneId) -> Result<Vec<Node>, LoadError> {
        let ids = self
            .scene_nodes
            .get(&scene_id)
            .ok_or(LoadError::UnknownScene(scene_id))?;
        Ok(ids.iter().filter_map(|id| self.nodes.get(id).copied()).collect())
    }

    fn load_fences(&self, scene_id: SceneId) -> Result<Vec<Fence>, LoadError> {
        self.fences
            .get(&scene_id)
            .cloned()
            .ok_or(LoadError::UnknownScene(scene_id))
    }

    fn load_node_by_id(&self, node_id: NodeId) -> Result<Option<Node>, LoadError> {
        Ok(self.nodes.get(&node_id).copied())
    }
}
