//! Pure navigation planning for GridNav.
//!
//! This crate computes routes for mobile devices across a scene's authored
//! waypoint grid. It has no database, transport, or runtime dependency:
//! scene data comes in through the [`scene::SceneLoader`] trait and planned
//! paths go out as plain data, so everything here is unit-testable and can
//! sit behind any service layer.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`annotate`] | Turn headings per path step, wire records |
//! | [`cache`] | Read-through scene cache for loaders |
//! | [`config`] | Planner tuning (gap-fill distance) |
//! | [`error`] | Load and planning error kinds |
//! | [`geometry`] | Integer grid cells, segment intersection |
//! | [`pathfinding`] | Fence-aware BFS planner with forbidden nodes |
//! | [`repair`] | Gap filling between sparse authored cells |
//! | [`scene`] | Nodes, fences, loader trait, in-memory store |
//!
//! ```
//! use std::collections::HashSet;
//! use gridnav_logic::pathfinding::PathPlanner;
//! use gridnav_logic::scene::{SceneMeta, SceneStore};
//!
//! let mut store = SceneStore::new();
//! store.add_scene(SceneMeta::new(1)).unwrap();
//! store.add_node(1, 1, (0, 0)).unwrap();
//! store.add_node(1, 2, (2, 0)).unwrap();
//!
//! let planner = PathPlanner::new(store);
//! let path = planner.plan_path(1, 1, 2, &HashSet::new()).unwrap();
//! assert_eq!(path.len(), 3);
//! ```

pub mod annotate;
pub mod cache;
pub mod config;
pub mod error;
pub mod geometry;
pub mod pathfinding;
pub mod repair;
pub mod scene;

pub use annotate::{Heading, PathRecord, PathStep};
pub use config::PlannerConfig;
pub use error::{LoadError, PlanError};
pub use geometry::GridCell;
pub use pathfinding::PathPlanner;
pub use scene::{Fence, Node, NodeId, SceneId, SceneLoader, SceneStore};
