//! Integer grid geometry for fence checks.
//!
//! Pure functions over `GridCell` endpoints. Cross products are computed in
//! `i128` so results are exact for the full `i32` range — no epsilon handling.

use serde::{Deserialize, Serialize};

/// A cell on the scene's discrete grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell shifted by `(dx, dy)`, or `None` on coordinate overflow.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    pub fn manhattan(self, other: GridCell) -> u64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).unsigned_abs();
        dx + dy
    }
}

impl From<(i32, i32)> for GridCell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Turn direction of the ordered triple `(p, q, r)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Collinear,
    Clockwise,
    CounterClockwise,
}

/// Sign of the cross product `(q - p) × (r - p)`.
pub fn orientation(p: GridCell, q: GridCell, r: GridCell) -> Orientation {
    let (px, py) = (i128::from(p.x), i128::from(p.y));
    let (qx, qy) = (i128::from(q.x), i128::from(q.y));
    let (rx, ry) = (i128::from(r.x), i128::from(r.y));
    let cross = (qx - px) * (ry - py) - (qy - py) * (rx - px);
    match cross.signum() {
        0 => Orientation::Collinear,
        1 => Orientation::CounterClockwise,
        _ => Orientation::Clockwise,
    }
}

/// Whether `q` lies inside the bounding box of `p1`–`p2`.
///
/// Only meaningful once `q` is known to be collinear with the segment.
pub fn on_segment(p1: GridCell, p2: GridCell, q: GridCell) -> bool {
    q.x >= p1.x.min(p2.x) && q.x <= p1.x.max(p2.x) && q.y >= p1.y.min(p2.y) && q.y <= p1.y.max(p2.y)
}

/// Closed-segment intersection test.
///
/// Returns true for proper crossings, touching endpoints and collinear
/// overlaps. A move that grazes a fence endpoint counts as blocked.
pub fn segments_intersect(a1: GridCell, a2: GridCell, b1: GridCell, b2: GridCell) -> bool {
    let o1 = orientation(a1, a2, b1);
    let o2 = orientation(a1, a2, b2);
    let o3 = orientation(b1, b2, a1);
    let o4 = orientation(b1, b2, a2);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == Orientation::Collinear && on_segment(a1, a2, b1))
        || (o2 == Orientation::Collinear && on_segment(a1, a2, b2))
        || (o3 == Orientation::Collinear && on_segment(b1, b2, a1))
        || (o4 == Orientation::Collinear && on_segment(b1, b2, a2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> GridCell {
        GridCell::new(x, y)
    }

    #[test]
    fn test_orientation_signs() {
        assert_eq!(orientation(c(0, 0), c(1, 0), c(2, 0)), Orientation::Collinear);
        assert_eq!(
            orientation(c(0, 0), c(1, 0), c(1, 1)),
            Orientation::CounterClockwise
        );
        assert_eq!(orientation(c(0, 0), c(1, 0), c(1, -1)), Orientation::Clockwise);
    }

    #[test]
    fn test_proper_crossing() {
        // Plus sign centered at (1, 1)
        assert!(segments_intersect(c(0, 1), c(2, 1), c(1, 0), c(1, 2)));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        assert!(!segments_intersect(c(0, 0), c(2, 0), c(0, 1), c(2, 1)));
    }

    #[test]
    fn test_touching_endpoint_is_blocked() {
        // Move (0,0)->(1,0) ends exactly on the fence endpoint (1,0)
        assert!(segments_intersect(c(0, 0), c(1, 0), c(1, 0), c(1, 5)));
        // T-junction: fence end sits in the middle of the move
        assert!(segments_intersect(c(0, 0), c(2, 0), c(1, 0), c(1, 3)));
    }

    #[test]
    fn test_collinear_overlap() {
        assert!(segments_intersect(c(0, 0), c(3, 0), c(2, 0), c(5, 0)));
    }

    #[test]
    fn test_collinear_disjoint() {
        assert!(!segments_intersect(c(0, 0), c(1, 0), c(2, 0), c(5, 0)));
    }

    #[test]
    fn test_diagonal_fence() {
        assert!(segments_intersect(c(0, 0), c(0, 2), c(-1, 0), c(1, 2)));
        assert!(!segments_intersect(c(3, 0), c(3, 1), c(-1, 0), c(1, 2)));
    }

    #[test]
    fn test_point_fence() {
        assert!(segments_intersect(c(0, 0), c(2, 0), c(1, 0), c(1, 0)));
        assert!(!segments_intersect(c(0, 0), c(2, 0), c(1, 1), c(1, 1)));
    }

    #[test]
    fn test_large_coordinates_do_not_overflow() {
        let big = i32::MAX;
        assert!(segments_intersect(
            c(-big, 0),
            c(big, 0),
            c(0, -big),
            c(0, big)
        ));
    }

    #[test]
    fn test_on_segment_bounding_box() {
        assert!(on_segment(c(0, 0), c(4, 0), c(2, 0)));
        assert!(on_segment(c(4, 0), c(0, 0), c(4, 0)));
        assert!(!on_segment(c(0, 0), c(4, 0), c(5, 0)));
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(c(0, 0).manhattan(c(3, -4)), 7);
        assert_eq!(c(2, 2).manhattan(c(2, 2)), 0);
    }
}
