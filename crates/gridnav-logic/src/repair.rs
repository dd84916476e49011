//! Connectivity repair ("gap filling") over sparse authored cells.
//!
//! Operators place waypoints, not every cell, so plain 4-neighbour adjacency
//! over authored cells is almost always disconnected. Two authored cells on
//! the same row or column whose distance is in `2..=max_gap` get every cell
//! between them added. Longer gaps stay open.

use std::collections::HashSet;

use crate::geometry::GridCell;

/// Return `authored` plus the cells that bridge its short straight gaps.
///
/// Pairs are taken from `authored` only; inserted cells never seed further
/// filling. O(n²) over the authored set.
pub fn fill_gaps(authored: &HashSet<GridCell>, max_gap: i32) -> HashSet<GridCell> {
    let mut passable = authored.clone();
    if max_gap < 2 {
        return passable;
    }

    let mut cells: Vec<GridCell> = authored.iter().copied().collect();
    cells.sort_unstable();

    let before = passable.len();
    for (i, &a) in cells.iter().enumerate() {
        for &b in &cells[i + 1..] {
            if a.x == b.x {
                fill_column(&mut passable, a.x, a.y, b.y, max_gap);
            } else if a.y == b.y {
                fill_row(&mut passable, a.y, a.x, b.x, max_gap);
            }
        }
    }

    log::trace!(
        "Gap fill added {} cells to {} authored",
        passable.len() - before,
        before
    );
    passable
}

fn gap_in_range(from: i32, to: i32, max_gap: i32) -> bool {
    let dist = (i64::from(to) - i64::from(from)).abs();
    dist > 1 && dist <= i64::from(max_gap)
}

fn fill_column(passable: &mut HashSet<GridCell>, x: i32, y1: i32, y2: i32, max_gap: i32) {
    if !gap_in_range(y1, y2, max_gap) {
        return;
    }
    let (lo, hi) = (y1.min(y2), y1.max(y2));
    for y in (lo + 1)..hi {
        passable.insert(GridCell::new(x, y));
    }
}

fn fill_row(passable: &mut HashSet<GridCell>, y: i32, x1: i32, x2: i32, max_gap: i32) {
    if !gap_in_range(x1, x2, max_gap) {
        return;
    }
    let (lo, hi) = (x1.min(x2), x1.max(x2));
    for x in (lo + 1)..hi {
        passable.insert(GridCell::new(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cells: &[(i32, i32)]) -> HashSet<GridCell> {
        cells.iter().map(|&c| GridCell::from(c)).collect()
    }

    #[test]
    fn test_adjacent_cells_unchanged() {
        let authored = set(&[(0, 0), (1, 0)]);
        assert_eq!(fill_gaps(&authored, 3), authored);
    }

    #[test]
    fn test_gap_of_two_filled() {
        let filled = fill_gaps(&set(&[(0, 0), (2, 0)]), 3);
        assert_eq!(filled, set(&[(0, 0), (1, 0), (2, 0)]));
    }

    #[test]
    fn test_gap_of_three_filled_vertically() {
        let filled = fill_gaps(&set(&[(4, 1), (4, 4)]), 3);
        assert_eq!(filled, set(&[(4, 1), (4, 2), (4, 3), (4, 4)]));
    }

    #[test]
    fn test_gap_of_four_left_open() {
        let authored = set(&[(0, 0), (4, 0)]);
        assert_eq!(fill_gaps(&authored, 3), authored);
    }

    #[test]
    fn test_configurable_bound() {
        let filled = fill_gaps(&set(&[(0, 0), (4, 0)]), 4);
        assert_eq!(filled.len(), 5);
        let authored = set(&[(0, 0), (2, 0)]);
        assert_eq!(fill_gaps(&authored, 1), authored);
    }

    #[test]
    fn test_off_axis_pairs_ignored() {
        let authored = set(&[(0, 0), (2, 2)]);
        assert_eq!(fill_gaps(&authored, 3), authored);
    }

    #[test]
    fn test_inserted_cells_do_not_chain() {
        // (0,0)-(0,2) fills (0,1); (0,1) must not then bridge to (3,1)
        let filled = fill_gaps(&set(&[(0, 0), (0, 2), (3, 1)]), 3);
        assert!(filled.contains(&GridCell::new(0, 1)));
        assert!(!filled.contains(&GridCell::new(1, 1)));
        assert!(!filled.contains(&GridCell::new(2, 1)));
    }

    #[test]
    fn test_empty_input() {
        assert!(fill_gaps(&HashSet::new(), 3).is_empty());
    }
}
