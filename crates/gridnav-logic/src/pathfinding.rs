//! Fence-aware BFS path planning over a scene's repaired waypoint grid.
//!
//! `PathPlanner` resolves node ids through a [`SceneLoader`], builds the
//! passable cell set (authored nodes minus forbidden nodes, then gap-filled),
//! and runs a 4-connected BFS that rejects any move touching a fence.
//! All working state is local to one call.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::annotate::{annotate, to_records, PathRecord, PathStep};
use crate::config::PlannerConfig;
use crate::error::{PlanError, Result};
use crate::geometry::GridCell;
use crate::repair::fill_gaps;
use crate::scene::{Fence, Node, NodeId, SceneId, SceneLoader};

/// Neighbour enumeration order: up, right, down, left.
///
/// "Up" is `-y`, the device's forward direction. BFS ties are broken by this
/// order, which makes planning deterministic.
pub const MOVES: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Plans routes for one scene source.
pub struct PathPlanner<L> {
    loader: L,
    config: PlannerConfig,
}

impl<L: SceneLoader> PathPlanner<L> {
    pub fn new(loader: L) -> Self {
        Self::with_config(loader, PlannerConfig::default())
    }

    pub fn with_config(loader: L, config: PlannerConfig) -> Self {
        Self { loader, config }
    }

    /// Plan a route between two nodes of `scene_id`.
    ///
    /// Nodes in `forbidden` are excluded for this call only; ids that are
    /// unknown or belong to another scene are ignored. Pass an empty set for
    /// unrestricted planning.
    pub fn plan_path(
        &self,
        scene_id: SceneId,
        from_node_id: NodeId,
        to_node_id: NodeId,
        forbidden: &HashSet<NodeId>,
    ) -> Result<Vec<PathStep>> {
        let start = self.resolve_node(scene_id, from_node_id)?.cell;
        let end = self.resolve_node(scene_id, to_node_id)?.cell;

        let passable = self.passable_cells(scene_id, forbidden)?;
        if !passable.contains(&start) || !passable.contains(&end) {
            return Err(PlanError::NotTraversable { start, end });
        }

        let fences = self.loader.load_fences(scene_id)?;
        let cells = find_route(&passable, &fences, start, end)
            .ok_or(PlanError::NoPathFound { start, end })?;

        log::debug!(
            "Scene #{}: planned {} -> {} in {} steps ({} passable cells, {} fences)",
            scene_id,
            start,
            end,
            cells.len(),
            passable.len(),
            fences.len()
        );
        Ok(annotate(&cells))
    }

    /// [`plan_path`](Self::plan_path), converted to wire records.
    pub fn plan_records(
        &self,
        scene_id: SceneId,
        from_node_id: NodeId,
        to_node_id: NodeId,
        forbidden: &HashSet<NodeId>,
    ) -> Result<Vec<PathRecord>> {
        let steps = self.plan_path(scene_id, from_node_id, to_node_id, forbidden)?;
        Ok(to_records(&steps))
    }

    /// The final passable set for a scene: authored cells minus forbidden
    /// cells, gap-filled, then minus forbidden cells again so repair can
    /// never reopen a forbidden waypoint.
    pub fn passable_cells(
        &self,
        scene_id: SceneId,
        forbidden: &HashSet<NodeId>,
    ) -> Result<HashSet<GridCell>> {
        let nodes = self.loader.load_nodes(scene_id)?;
        let blocked = self.forbidden_cells(scene_id, forbidden)?;

        let authored: HashSet<GridCell> = nodes
            .iter()
            .map(|n| n.cell)
            .filter(|c| !blocked.contains(c))
            .collect();

        let mut passable = fill_gaps(&authored, self.config.max_gap_fill);
        passable.retain(|c| !blocked.contains(c));
        Ok(passable)
    }

    fn forbidden_cells(
        &self,
        scene_id: SceneId,
        forbidden: &HashSet<NodeId>,
    ) -> Result<HashSet<GridCell>> {
        let mut cells = HashSet::with_capacity(forbidden.len());
        for &id in forbidden {
            match self.loader.load_node_by_id(id)? {
                Some(node) if node.scene_id == scene_id => {
                    cells.insert(node.cell);
                }
                Some(node) => log::warn!(
                    "Ignoring forbidden node #{} from scene #{} (planning scene #{})",
                    id,
                    node.scene_id,
                    scene_id
                ),
                None => log::warn!("Ignoring unknown forbidden node #{}", id),
            }
        }
        Ok(cells)
    }

    fn resolve_node(&self, scene_id: SceneId, node_id: NodeId) -> Result<Node> {
        match self.loader.load_node_by_id(node_id)? {
            Some(node) if node.scene_id == scene_id => Ok(node),
            _ => Err(PlanError::NodeNotFound(node_id)),
        }
    }
}

/// Shortest 4-connected route from `start` to `end` through `passable`,
/// never crossing or touching a fence.
///
/// Returns the cells from `start` to `end` inclusive, or `None` if the search
/// exhausts. Each cell is expanded at most once, so the search is bounded by
/// `passable.len()`.
pub fn find_route(
    passable: &HashSet<GridCell>,
    fences: &[Fence],
    start: GridCell,
    end: GridCell,
) -> Option<Vec<GridCell>> {
    if !passable.contains(&start) || !passable.contains(&end) {
        return None;
    }
    if start == end {
        return Some(vec![start]);
    }

    let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
    let mut visited: HashSet<GridCell> = HashSet::new();
    let mut queue: VecDeque<GridCell> = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    let mut expanded = 0usize;
    while let Some(current) = queue.pop_front() {
        expanded += 1;
        for &(dx, dy) in &MOVES {
            let Some(next) = current.offset(dx, dy) else {
                continue;
            };
            if !passable.contains(&next) || visited.contains(&next) {
                continue;
            }
            if fences.iter().any(|f| f.blocks(current, next)) {
                continue;
            }
            visited.insert(next);
            came_from.insert(next, current);
            if next == end {
                log::trace!("BFS reached {} after expanding {} cells", end, expanded);
                return Some(reconstruct(&came_from, start, end));
            }
            queue.push_back(next);
        }
    }
    debug_assert!(expanded <= passable.len());
    log::trace!("BFS exhausted after expanding {} cells", expanded);
    None
}

fn reconstruct(came_from: &HashMap<GridCell, GridCell>, start: GridCell, end: GridCell) -> Vec<GridCell> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
