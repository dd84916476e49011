//! Turn headings for a planned cell sequence.
//!
//! Each step carries the heading the device should take to reach the next
//! cell. The mapping is fixed by the downstream motion controller:
//!
//! | Next cell      | Heading |
//! |----------------|---------|
//! | `x` increases  | +90     |
//! | `x` decreases  | -90     |
//! | `y` increases  | 180     |
//! | otherwise      | 0       |
//!
//! The final cell always gets 0.

use serde::{Deserialize, Serialize};

use crate::geometry::GridCell;

/// Discrete heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heading {
    Forward,
    Right,
    Left,
    Back,
}

impl Heading {
    pub fn degrees(self) -> i16 {
        match self {
            Heading::Forward => 0,
            Heading::Right => 90,
            Heading::Left => -90,
            Heading::Back => 180,
        }
    }

    pub fn from_degrees(angle: i16) -> Option<Self> {
        match angle {
            0 => Some(Heading::Forward),
            90 => Some(Heading::Right),
            -90 => Some(Heading::Left),
            180 => Some(Heading::Back),
            _ => None,
        }
    }

    /// Heading for a single move from `from` to `to`.
    pub fn between(from: GridCell, to: GridCell) -> Self {
        if to.x > from.x {
            Heading::Right
        } else if to.x < from.x {
            Heading::Left
        } else if to.y > from.y {
            Heading::Back
        } else {
            Heading::Forward
        }
    }
}

/// One annotated cell of a planned path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub cell: GridCell,
    pub heading: Heading,
}

/// Wire record handed to transport adapters: `{grid_x, grid_y, angle}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    pub grid_x: i32,
    pub grid_y: i32,
    pub angle: i16,
}

impl From<PathStep> for PathRecord {
    fn from(step: PathStep) -> Self {
        Self {
            grid_x: step.cell.x,
            grid_y: step.cell.y,
            angle: step.heading.degrees(),
        }
    }
}

/// Attach headings to an ordered cell sequence.
pub fn annotate(cells: &[GridCell]) -> Vec<PathStep> {
    let mut steps: Vec<PathStep> = cells
        .windows(2)
        .map(|w| PathStep {
            cell: w[0],
            heading: Heading::between(w[0], w[1]),
        })
        .collect();
    if let Some(&last) = cells.last() {
        steps.push(PathStep {
            cell: last,
            heading: Heading::Forward,
        });
    }
    steps
}

pub fn to_records(steps: &[PathStep]) -> Vec<PathRecord> {
    steps.iter().map(|&s| PathRecord::from(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pts: &[(i32, i32)]) -> Vec<GridCell> {
        pts.iter().map(|&p| GridCell::from(p)).collect()
    }

    fn angles(steps: &[PathStep]) -> Vec<i16> {
        steps.iter().map(|s| s.heading.degrees()).collect()
    }

    #[test]
    fn test_straight_plus_x() {
        let steps = annotate(&cells(&[(0, 0), (1, 0), (2, 0)]));
        assert_eq!(angles(&steps), vec![90, 90, 0]);
    }

    #[test]
    fn test_straight_minus_y_is_forward() {
        let steps = annotate(&cells(&[(0, 2), (0, 1), (0, 0)]));
        assert_eq!(angles(&steps), vec![0, 0, 0]);
    }

    #[test]
    fn test_minus_x_and_plus_y() {
        let steps = annotate(&cells(&[(2, 0), (1, 0), (1, 1)]));
        assert_eq!(angles(&steps), vec![-90, 180, 0]);
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(angles(&annotate(&cells(&[(5, 5)]))), vec![0]);
        assert!(annotate(&[]).is_empty());
    }

    #[test]
    fn test_records() {
        let steps = annotate(&cells(&[(3, 4), (4, 4)]));
        let records = to_records(&steps);
        assert_eq!(
            records,
            vec![
                PathRecord {
                    grid_x: 3,
                    grid_y: 4,
                    angle: 90
                },
                PathRecord {
                    grid_x: 4,
                    grid_y: 4,
                    angle: 0
                },
            ]
        );
        let json = serde_json::to_string(&records[0]).unwrap();
        assert_eq!(json, r#"{"grid_x":3,"grid_y":4,"angle":90}"#);
    }

    #[test]
    fn test_degrees_roundtrip() {
        for h in [Heading::Forward, Heading::Right, Heading::Left, Heading::Back] {
            assert_eq!(Heading::from_degrees(h.degrees()), Some(h));
        }
        assert_eq!(Heading::from_degrees(45), None);
    }
}
