//! BoundingBox - axis-aligned voxel regions
//!
//! Unlike a pixel rectangle stored as origin + size, a bounding box here keeps
//! both corners inclusively, so a single voxel has `min == max`.

use crate::point::Point;

/// Axis-aligned bounding box with inclusive corners.
///
/// This is a small `Copy` type; it is recomputed or cached by its owners
/// rather than shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Upper-left(-front) corner
    pub min: Point,
    /// Bottom-right(-back) corner
    pub max: Point,
}

impl BoundingBox {
    /// Create a box from two corners; the corners are normalized so that
    /// `min <= max` on every axis.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box containing every point, or `None` for an empty set.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bbox.expand_to_contain(*p);
        }
        Some(bbox)
    }

    /// Grow the box so that it contains `p`.
    pub fn expand_to_contain(&mut self, p: Point) {
        self.min = Point::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Extent along each axis (`max - min + 1`).
    #[inline]
    pub fn extent(&self) -> [usize; 3] {
        [
            (self.max.x - self.min.x + 1) as usize,
            (self.max.y - self.min.y + 1) as usize,
            (self.max.z - self.min.z + 1) as usize,
        ]
    }

    /// Number of voxels covered.
    #[inline]
    pub fn volume(&self) -> usize {
        self.extent().iter().product()
    }

    /// Check if a point is inside the box (inclusive on both corners).
    #[inline]
    pub fn contains(&self, p: &Point) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Check if this box overlaps with another.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        !(self.min.x > other.max.x
            || other.min.x > self.max.x
            || self.min.y > other.max.y
            || other.min.y > self.max.y
            || self.min.z > other.max.z
            || other.min.z > self.max.z)
    }

    /// Intersection of two boxes, or `None` if they do not overlap.
    pub fn intersect(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.overlaps(other) {
            return None;
        }
        Some(BoundingBox {
            min: Point::new(
                self.min.x.max(other.min.x),
                self.min.y.max(other.min.y),
                self.min.z.max(other.min.z),
            ),
            max: Point::new(
                self.max.x.min(other.max.x),
                self.max.y.min(other.max.y),
                self.max.z.min(other.max.z),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing() {
        let pts = [Point::new2(3, 1), Point::new2(1, 4), Point::new2(2, 2)];
        let b = BoundingBox::enclosing(&pts).unwrap();
        assert_eq!(b.min, Point::new2(1, 1));
        assert_eq!(b.max, Point::new2(3, 4));
        assert_eq!(b.extent(), [3, 4, 1]);
        assert_eq!(b.volume(), 12);
        assert!(BoundingBox::enclosing(&[]).is_none());
    }

    #[test]
    fn test_overlap_touching_corner() {
        let a = BoundingBox::from_corners(Point::new2(0, 0), Point::new2(2, 2));
        let b = BoundingBox::from_corners(Point::new2(2, 2), Point::new2(4, 4));
        let c = BoundingBox::from_corners(Point::new2(3, 0), Point::new2(4, 1));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        let i = a.intersect(&b).unwrap();
        assert_eq!(i.min, i.max);
    }

    #[test]
    fn test_overlap_respects_depth() {
        let a = BoundingBox::from_corners(Point::new(0, 0, 0), Point::new(2, 2, 0));
        let b = BoundingBox::from_corners(Point::new(0, 0, 1), Point::new(2, 2, 3));
        assert!(!a.overlaps(&b));
        assert!(!a.contains(&Point::new(1, 1, 1)));
    }
}
