//! Integer voxel coordinates
//!
//! A [`Point`] always carries three coordinates; 2D volumes simply keep
//! `z == 0`. The owning volume or mask decides how many axes are meaningful,
//! so rank-dependent code switches on the rank at runtime instead of on the
//! point type.

use std::fmt;
use std::ops::{Add, AddAssign, Index, Neg, Sub};

/// A voxel coordinate `(x, y, z)`.
///
/// Ordering is lexicographic on `(z, y, x)`, which is the scan order used by
/// every volume traversal in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
    /// Slice (0 for 2D data)
    pub z: i32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0, y: 0, z: 0 };

    /// Create a 3D point.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Create a 2D point (`z = 0`).
    #[inline]
    pub const fn new2(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    /// Coordinate along `axis` (0 = x, 1 = y, 2 = z), or `None` for any
    /// other axis.
    #[inline]
    pub fn get(&self, axis: usize) -> Option<i32> {
        match axis {
            0 => Some(self.x),
            1 => Some(self.y),
            2 => Some(self.z),
            _ => None,
        }
    }

    /// Offset by `(dx, dy, dz)`.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Chebyshev distance to `other`.
    pub fn chebyshev(&self, other: &Point) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

impl Index<usize> for Point {
    type Output = i32;

    /// # Panics
    ///
    /// Panics if `axis > 2`.
    fn index(&self, axis: usize) -> &i32 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("point axis out of range: {axis}"),
        }
    }
}

impl Add for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Point) -> Point {
        self.offset(rhs.x, rhs.y, rhs.z)
    }
}

impl AddAssign for Point {
    #[inline]
    fn add_assign(&mut self, rhs: Point) {
        *self = *self + rhs;
    }
}

impl Sub for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Point) -> Point {
        self.offset(-rhs.x, -rhs.y, -rhs.z)
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline]
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y, -self.z)
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.z, self.y, self.x).cmp(&(other.z, other.y, other.x))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new2(x, y)
    }
}

impl From<(i32, i32, i32)> for Point {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_arithmetic() {
        let p = Point::new(1, 2, 3);
        let q = Point::new(-1, 1, 0);
        assert_eq!(p + q, Point::new(0, 3, 3));
        assert_eq!(p - q, Point::new(2, 1, 3));
        assert_eq!(-q, Point::new(1, -1, 0));
        assert_eq!(p[2], 3);
        assert_eq!(p.get(3), None);
    }

    #[test]
    fn test_scan_order() {
        let mut pts = vec![
            Point::new(0, 0, 1),
            Point::new(1, 0, 0),
            Point::new(0, 1, 0),
            Point::new(0, 0, 0),
        ];
        pts.sort();
        assert_eq!(
            pts,
            vec![
                Point::new(0, 0, 0),
                Point::new(1, 0, 0),
                Point::new(0, 1, 0),
                Point::new(0, 0, 1),
            ]
        );
    }

    #[test]
    fn test_hash_key() {
        let set: HashSet<Point> = [Point::new2(1, 1), Point::new2(1, 1), Point::new2(2, 1)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Point::from((2, 1))));
    }
}
