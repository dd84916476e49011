//! GridNav Headless Planning Harness
//!
//! Plans routes over JSON scene files and runs built-in planner checks.
//! Runs entirely in-process — no DB, no networking.
//!
//! Usage:
//!   cargo run -p gridnav-simtest -- plan --scenes data/warehouse_scene.json --scene 1 --from 101 --to 108
//!   cargo run -p gridnav-simtest -- check --verbose

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gridnav_logic::annotate::{annotate, to_records};
use gridnav_logic::geometry::segments_intersect;
use gridnav_logic::pathfinding::find_route;
use gridnav_logic::repair::fill_gaps;
use gridnav_logic::scene::{SceneMeta, SceneStore};
use gridnav_logic::{GridCell, LoadError, NodeId, PathPlanner, PlanError, PlannerConfig};

// ── Built-in fixture (same JSON the integration tests use) ──────────────
const WAREHOUSE_JSON: &str = include_str!("../../../data/warehouse_scene.json");

#[derive(Parser, Debug)]
#[command(name = "gridnav-simtest", version, about = "GridNav headless planning harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan one route over a scene file
    Plan {
        /// JSON scene file
        #[arg(long)]
        scenes: PathBuf,
        /// Scene id to plan in
        #[arg(long)]
        scene: u64,
        /// Start node id
        #[arg(long)]
        from: NodeId,
        /// End node id
        #[arg(long)]
        to: NodeId,
        /// Node ids to avoid for this plan (repeatable)
        #[arg(long = "forbid")]
        forbid: Vec<NodeId>,
        /// Planner TOML config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print `{grid_x, grid_y, angle}` records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run built-in planner checks
    Check {
        #[arg(long)]
        verbose: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Plan {
            scenes,
            scene,
            from,
            to,
            forbid,
            config,
            json,
        } => {
            let config = load_config(config.as_deref());
            match run_plan(&scenes, scene, from, to, &forbid, config, json) {
                Ok(()) => 0,
                Err(e) => {
                    log::error!("{:#}", e);
                    1
                }
            }
        }
        Command::Check { verbose } => run_checks(verbose),
    };
    std::process::exit(code);
}

fn load_config(path: Option<&Path>) -> PlannerConfig {
    let Some(path) = path else {
        return PlannerConfig::default();
    };
    match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("Failed to parse config {}: {}", path.display(), e);
                PlannerConfig::default()
            }
        },
        Err(e) => {
            log::warn!("Failed to read config {}: {}", path.display(), e);
            PlannerConfig::default()
        }
    }
}

fn run_plan(
    scenes: &Path,
    scene_id: u64,
    from: NodeId,
    to: NodeId,
    forbid: &[NodeId],
    config: PlannerConfig,
    json: bool,
) -> Result<()> {
    let store = SceneStore::from_path(scenes)
        .with_context(|| format!("loading scenes from {}", scenes.display()))?;
    let name = store
        .scene(scene_id)
        .map(|m| m.name.clone())
        .unwrap_or_default();
    log::info!(
        "Planning in scene #{} \"{}\": {} -> {} (forbidden: {:?}, max_gap_fill: {})",
        scene_id,
        name,
        from,
        to,
        forbid,
        config.max_gap_fill
    );

    let planner = PathPlanner::with_config(store, config);
    let forbidden: HashSet<NodeId> = forbid.iter().copied().collect();
    let records = planner
        .plan_records(scene_id, from, to, &forbidden)
        .context("planning failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for (i, r) in records.iter().enumerate() {
            println!("{:>3}  ({:>4}, {:>4})  {:>4}°", i, r.grid_x, r.grid_y, r.angle);
        }
    }
    log::info!("Route has {} steps", records.len());
    Ok(())
}

// ── Check harness ───────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn run_checks(verbose: bool) -> i32 {
    println!("=== GridNav Planning Harness ===\n");

    let mut results = Vec::new();

    // 1. Geometry
    results.extend(validate_geometry(verbose));

    // 2. Gap filling
    results.extend(validate_gap_filling(verbose));

    // 3. Scenario plans
    results.extend(validate_scenarios(verbose));

    // 4. Fixture scene
    results.extend(validate_fixture(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        1
    } else {
        0
    }
}

fn c(x: i32, y: i32) -> GridCell {
    GridCell::new(x, y)
}

// ── 1. Geometry ─────────────────────────────────────────────────────────

fn validate_geometry(_verbose: bool) -> Vec<TestResult> {
    println!("--- Geometry ---");
    vec![
        TestResult {
            name: "geometry_cross".into(),
            passed: segments_intersect(c(0, 1), c(2, 1), c(1, 0), c(1, 2)),
            detail: "plus sign crosses".into(),
        },
        TestResult {
            name: "geometry_touch".into(),
            passed: segments_intersect(c(0, 0), c(1, 0), c(1, 0), c(1, 4)),
            detail: "touching endpoint counts as blocked".into(),
        },
        TestResult {
            name: "geometry_parallel".into(),
            passed: !segments_intersect(c(0, 0), c(4, 0), c(0, 1), c(4, 1)),
            detail: "parallel rows do not intersect".into(),
        },
    ]
}

// ── 2. Gap filling ──────────────────────────────────────────────────────

fn validate_gap_filling(verbose: bool) -> Vec<TestResult> {
    println!("--- Gap filling ---");
    let mut results = Vec::new();

    for gap in 1..=4 {
        let authored: HashSet<GridCell> = [c(0, 0), c(gap, 0)].into_iter().collect();
        let passable = fill_gaps(&authored, PlannerConfig::default().max_gap_fill);
        let route = find_route(&passable, &[], c(0, 0), c(gap, 0));
        let expect_connected = gap <= 3;
        if verbose {
            println!("  gap {} → {} passable cells", gap, passable.len());
        }
        results.push(TestResult {
            name: format!("gap_fill_{}", gap),
            passed: route.is_some() == expect_connected,
            detail: format!(
                "gap {} {}",
                gap,
                if expect_connected {
                    "connects"
                } else {
                    "stays open"
                }
            ),
        });
    }
    results
}

// ── 3. Scenario plans ───────────────────────────────────────────────────

fn scene_with(
    pts: &[(i32, i32)],
    fences: &[((i32, i32), (i32, i32))],
) -> Result<SceneStore, LoadError> {
    let mut store = SceneStore::new();
    store.add_scene(SceneMeta::new(1))?;
    for (i, &p) in pts.iter().enumerate() {
        store.add_node(1, i as NodeId + 1, p)?;
    }
    for (i, &(a, b)) in fences.iter().enumerate() {
        store.add_fence(1, i as u64 + 1, a, b)?;
    }
    Ok(store)
}

fn angles_of(cells: &[(i32, i32)]) -> Vec<i16> {
    let cells: Vec<GridCell> = cells.iter().map(|&p| GridCell::from(p)).collect();
    to_records(&annotate(&cells))
        .iter()
        .map(|r| r.angle)
        .collect()
}

fn validate_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Scenarios ---");
    scenario_results(verbose).unwrap_or_else(|e| {
        vec![TestResult {
            name: "scenario_setup".into(),
            passed: false,
            detail: format!("scene setup failed: {}", e),
        }]
    })
}

fn scenario_results(verbose: bool) -> Result<Vec<TestResult>, LoadError> {
    let mut results = Vec::new();
    let none = HashSet::new();

    // Unobstructed
    let planner = PathPlanner::new(scene_with(&[(0, 0), (1, 0), (2, 0)], &[])?);
    let plain = planner.plan_records(1, 1, 3, &none);
    let got: Vec<(i32, i32, i16)> = plain
        .as_ref()
        .map(|rs| rs.iter().map(|r| (r.grid_x, r.grid_y, r.angle)).collect())
        .unwrap_or_default();
    results.push(TestResult {
        name: "plan_unobstructed".into(),
        passed: got == vec![(0, 0, 90), (1, 0, 90), (2, 0, 0)],
        detail: format!("{:?}", got),
    });

    // Headings
    results.push(TestResult {
        name: "headings_plus_x".into(),
        passed: angles_of(&[(0, 0), (1, 0), (2, 0)]) == vec![90, 90, 0],
        detail: "+x straight → [90, 90, 0]".into(),
    });
    results.push(TestResult {
        name: "headings_minus_y".into(),
        passed: angles_of(&[(0, 2), (0, 1), (0, 0)]) == vec![0, 0, 0],
        detail: "-y straight → [0, 0, 0]".into(),
    });

    // Fence detour around a ring; the stub also covers the gap-filled center
    let ring = [
        (0, 0),
        (1, 0),
        (2, 0),
        (0, 1),
        (2, 1),
        (0, 2),
        (1, 2),
        (2, 2),
    ];
    let planner = PathPlanner::new(scene_with(&ring, &[((1, -2), (1, 1))])?);
    let detour = planner.plan_path(1, 1, 3, &none);
    let len = detour.as_ref().map(|p| p.len()).unwrap_or(0);
    if verbose {
        println!("  fence detour: {} cells", len);
    }
    results.push(TestResult {
        name: "plan_fence_detour".into(),
        passed: len == 7,
        detail: format!("{} cells around the ring (expected 7)", len),
    });

    // Forbidden node detour
    let planner = PathPlanner::new(scene_with(
        &[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)],
        &[],
    )?);
    let forbidden: HashSet<NodeId> = [2].into_iter().collect();
    let detour = planner.plan_path(1, 1, 3, &forbidden);
    let avoids = detour
        .as_ref()
        .map(|p| p.iter().all(|s| s.cell != c(1, 0)) && p.len() == 5)
        .unwrap_or(false);
    results.push(TestResult {
        name: "plan_forbidden_detour".into(),
        passed: avoids,
        detail: "forbidding (1,0) routes through row 1".into(),
    });

    // Unreachable island
    let planner = PathPlanner::new(scene_with(&[(0, 0), (1, 0), (6, 0), (7, 0)], &[])?);
    let unreachable = planner.plan_path(1, 1, 4, &none);
    results.push(TestResult {
        name: "plan_unreachable".into(),
        passed: matches!(unreachable, Err(PlanError::NoPathFound { .. })),
        detail: "gap of 5 → NoPathFound".into(),
    });

    // Unknown node
    let unknown = planner.plan_path(1, 1, 999, &none);
    results.push(TestResult {
        name: "plan_unknown_node".into(),
        passed: matches!(unknown, Err(PlanError::NodeNotFound(999))),
        detail: "node 999 → NodeNotFound".into(),
    });

    Ok(results)
}

// ── 4. Fixture scene ────────────────────────────────────────────────────

fn validate_fixture(verbose: bool) -> Vec<TestResult> {
    println!("--- Fixture scene ---");
    let mut results = Vec::new();

    let store = match SceneStore::from_json_str(WAREHOUSE_JSON) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "fixture_parse".into(),
                passed: false,
                detail: format!("scene parse error: {}", e),
            });
            return results;
        }
    };
    results.push(TestResult {
        name: "fixture_parse".into(),
        passed: store.scene_ids() == vec![1, 2],
        detail: format!("{} scenes, {} nodes", store.scene_ids().len(), store.node_count()),
    });

    let planner = PathPlanner::new(store);
    let none = HashSet::new();
    let route = planner.plan_path(1, 101, 108, &none);
    if verbose {
        if let Ok(steps) = &route {
            for s in steps {
                println!("    {} {}°", s.cell, s.heading.degrees());
            }
        }
    }
    results.push(TestResult {
        name: "fixture_dock_to_packing".into(),
        passed: route.as_ref().map(|p| p.len() == 13).unwrap_or(false),
        detail: "101 → 108 around the shelving fence in 13 cells".into(),
    });

    let office = planner.plan_path(2, 301, 304, &none);
    results.push(TestResult {
        name: "fixture_office".into(),
        passed: office.is_ok(),
        detail: "301 → 304 along the corridor".into(),
    });

    results
}
