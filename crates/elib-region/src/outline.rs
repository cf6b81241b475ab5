//! Outline tracing for 2D masks
//!
//! Moore-neighbour contour following: starting from the top-left-most point
//! of a region, walk clockwise around the boundary, at each step scanning the
//! 8 neighbours of the current boundary point starting just after the
//! backtrack position.

use std::collections::HashSet;

use elib_core::Point;

/// Direction to one of the 8 neighbours, in clockwise order (y grows down)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// West (-1, 0)
    West = 0,
    /// Northwest (-1, -1)
    NorthWest = 1,
    /// North (0, -1)
    North = 2,
    /// Northeast (1, -1)
    NorthEast = 3,
    /// East (1, 0)
    East = 4,
    /// Southeast (1, 1)
    SouthEast = 5,
    /// South (0, 1)
    South = 6,
    /// Southwest (-1, 1)
    SouthWest = 7,
}

/// X offset for each direction
const XPOSTAB: [i32; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];

/// Y offset for each direction
const YPOSTAB: [i32; 8] = [0, -1, -1, -1, 0, 1, 1, 1];

/// Direction lookup table: DIRTAB[1+dy][1+dx] gives direction index
const DIRTAB: [[i32; 3]; 3] = [[1, 2, 3], [0, -1, 4], [7, 6, 5]];

impl Direction {
    #[inline]
    pub fn dx(self) -> i32 {
        XPOSTAB[self as usize]
    }

    #[inline]
    pub fn dy(self) -> i32 {
        YPOSTAB[self as usize]
    }

    /// Direction of a unit offset, or `None` for the origin or a longer step.
    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        if dx.abs() > 1 || dy.abs() > 1 {
            return None;
        }
        let idx = DIRTAB[(1 + dy) as usize][(1 + dx) as usize];
        (idx >= 0).then(|| Self::from_index(idx as usize))
    }

    #[inline]
    fn from_index(idx: usize) -> Self {
        match idx % 8 {
            0 => Direction::West,
            1 => Direction::NorthWest,
            2 => Direction::North,
            3 => Direction::NorthEast,
            4 => Direction::East,
            5 => Direction::SouthEast,
            6 => Direction::South,
            _ => Direction::SouthWest,
        }
    }

    /// The direction `steps` positions further clockwise.
    #[inline]
    pub fn clockwise(self, steps: usize) -> Self {
        Self::from_index(self as usize + steps)
    }

    /// Neighbour of `p` in this direction.
    #[inline]
    pub fn step(self, p: Point) -> Point {
        p.offset(self.dx(), self.dy(), 0)
    }
}

/// Closed boundary polygon of a 2D region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    /// Boundary points in clockwise order; the closing edge back to the
    /// first point is implicit
    pub polygon: Vec<Point>,
}

impl Outline {
    pub fn len(&self) -> usize {
        self.polygon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygon.is_empty()
    }

    /// Mean of the polygon points as `(x, y)`.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.polygon.is_empty() {
            return None;
        }
        let n = self.polygon.len() as f64;
        let (sx, sy) = self
            .polygon
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
        Some((sx / n, sy / n))
    }
}

/// Next boundary point clockwise from `b`, scanning after `backtrack`.
///
/// Returns the point found and the new backtrack direction, relative to the
/// point found.
fn next_boundary(
    members: &HashSet<Point>,
    b: Point,
    backtrack: Direction,
) -> Option<(Point, Direction)> {
    let mut previous = backtrack.step(b);
    for i in 1..8 {
        let candidate = backtrack.clockwise(i).step(b);
        if members.contains(&candidate) {
            let back = Direction::from_offset(previous.x - candidate.x, previous.y - candidate.y)?;
            return Some((candidate, back));
        }
        previous = candidate;
    }
    None
}

/// Trace the outer contour of the region containing the top-left-most point.
pub(crate) fn trace_outline(points: &[Point], members: &HashSet<Point>) -> Outline {
    let Some(start) = points.iter().copied().min_by_key(|p| (p.y, p.x)) else {
        return Outline::default();
    };
    let mut polygon = vec![start];

    // Nothing lies west of or above the start, so West is background
    let Some((second, back)) = next_boundary(members, start, Direction::West) else {
        return Outline { polygon };
    };

    // Each boundary point is entered at most once per side
    let limit = 4 * members.len() + 4;
    let (mut b, mut backtrack) = (second, back);
    polygon.push(b);
    for _ in 0..limit {
        let Some((next, back)) = next_boundary(members, b, backtrack) else {
            break;
        };
        if b == start && next == second {
            break;
        }
        b = next;
        backtrack = back;
        polygon.push(b);
    }

    // Drop the repeated start point
    if polygon.len() > 2 && polygon.last() == Some(&start) {
        polygon.pop();
    }
    Outline { polygon }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mask;

    #[test]
    fn test_direction_tables() {
        for (i, dir) in (0..8).map(|i| (i, Direction::from_index(i))) {
            assert_eq!(dir as usize, i);
            assert_eq!(Direction::from_offset(dir.dx(), dir.dy()), Some(dir));
        }
        assert_eq!(Direction::from_offset(0, 0), None);
        assert_eq!(Direction::West.clockwise(2), Direction::North);
        assert_eq!(Direction::SouthWest.clockwise(1), Direction::West);
    }

    #[test]
    fn test_single_point() {
        let mask = Mask::from_points(&[5, 5], vec![Point::new2(2, 2)]);
        let outline = mask.outline().unwrap();
        assert_eq!(outline.polygon, vec![Point::new2(2, 2)]);
        assert_eq!(outline.centroid(), Some((2.0, 2.0)));
    }

    #[test]
    fn test_square_outline() {
        let mut mask = Mask::new(&[6, 6]);
        for y in 1..4 {
            for x in 1..4 {
                mask.add_point(Point::new2(x, y));
            }
        }
        let outline = mask.outline().unwrap();
        // 8 boundary points of a 3x3 square, interior excluded
        assert_eq!(outline.len(), 8);
        assert!(!outline.polygon.contains(&Point::new2(2, 2)));
        assert_eq!(outline.polygon[0], Point::new2(1, 1));
        assert_eq!(outline.polygon[1], Point::new2(2, 1));
        assert_eq!(outline.centroid(), Some((2.0, 2.0)));
    }

    #[test]
    fn test_two_points() {
        let mask = Mask::from_points(&[4, 4], vec![Point::new2(1, 0), Point::new2(0, 1)]);
        let outline = mask.outline().unwrap();
        assert_eq!(outline.polygon, vec![Point::new2(1, 0), Point::new2(0, 1)]);
    }

    #[test]
    fn test_empty_mask() {
        let outline = Mask::new(&[3, 3]).outline().unwrap();
        assert!(outline.is_empty());
        assert_eq!(outline.centroid(), None);
    }
}
