//! Mask - the point-set form of one labelled region
//!
//! A [`Mask`] owns its points in insertion order together with the rank and
//! dimensions of the volume it was taken from. The bounding box and the
//! membership set are computed lazily and dropped on every mutation.
//!
//! Points are not deduplicated; code that builds masks by scanning must not
//! add a coordinate twice.

use std::cell::OnceCell;
use std::collections::HashSet;

use crate::error::{RegionError, RegionResult};
use crate::outline::{Outline, trace_outline};
use elib_core::{BoundingBox, Point, Sample, ScanPoints, Volume, contains_point};

/// Ordered set of voxel coordinates sharing one label.
#[derive(Debug, Clone, Default)]
pub struct Mask {
    dimensions: Vec<usize>,
    points: Vec<Point>,
    bounding_box: OnceCell<Option<BoundingBox>>,
    members: OnceCell<HashSet<Point>>,
}

impl PartialEq for Mask {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions == other.dimensions && self.points == other.points
    }
}

impl Mask {
    /// Create an empty mask over a volume with extents `dimensions`.
    pub fn new(dimensions: &[usize]) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
            ..Self::default()
        }
    }

    /// Create an empty mask with the shape of `volume`.
    pub fn for_volume<T: Sample>(volume: &Volume<T>) -> Self {
        Self::new(volume.dimensions())
    }

    /// Create a mask holding `points` in the given order.
    pub fn from_points(dimensions: &[usize], points: Vec<Point>) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
            points,
            ..Self::default()
        }
    }

    fn invalidate(&mut self) {
        self.bounding_box.take();
        self.members.take();
    }

    /// Append a point.
    pub fn add_point(&mut self, p: Point) {
        self.points.push(p);
        self.invalidate();
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Change the rank. Added axes get extent 1.
    pub fn set_rank(&mut self, rank: usize) {
        self.dimensions.resize(rank, 1);
    }

    pub fn set_dimensions(&mut self, dimensions: &[usize]) {
        self.dimensions = dimensions.to_vec();
    }

    fn members(&self) -> &HashSet<Point> {
        self.members
            .get_or_init(|| self.points.iter().copied().collect())
    }

    /// Check whether `p` belongs to the mask.
    pub fn contains(&self, p: &Point) -> bool {
        self.members().contains(p)
    }

    /// Smallest box around all points, or `None` for an empty mask.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        *self
            .bounding_box
            .get_or_init(|| BoundingBox::enclosing(&self.points))
    }

    /// Check whether the two masks share at least one point.
    pub fn overlap(&self, other: &Mask) -> bool {
        match (self.bounding_box(), other.bounding_box()) {
            (Some(a), Some(b)) if a.overlaps(&b) => {
                let (small, large) = if self.len() <= other.len() {
                    (self, other)
                } else {
                    (other, self)
                };
                small.points.iter().any(|p| large.contains(p))
            }
            _ => false,
        }
    }

    /// Points of `self` that are also in `other`, in the order of `self`.
    pub fn intersection(&self, other: &Mask) -> Mask {
        let points = self
            .points
            .iter()
            .copied()
            .filter(|p| other.contains(p))
            .collect();
        Mask::from_points(&self.dimensions, points)
    }

    /// Rasterize into a binary volume: 1 on mask points, 0 elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::PointOutOfBounds`] if any point lies outside
    /// the mask dimensions; no partial volume is produced.
    pub fn to_volume(&self) -> RegionResult<Volume<i32>> {
        let mut volume = Volume::new(&self.dimensions, 1, 1)?;
        self.check_bounds()?;
        for p in &self.points {
            volume.set(p, 1)?;
        }
        Ok(volume)
    }

    pub(crate) fn check_bounds(&self) -> RegionResult<()> {
        match self
            .points
            .iter()
            .find(|p| !contains_point(&self.dimensions, p))
        {
            Some(p) => Err(RegionError::PointOutOfBounds {
                point: *p,
                dimensions: self.dimensions.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Complement within the mask dimensions, in scan order.
    pub fn negate(&self) -> Mask {
        let members = self.members();
        let points = ScanPoints::new(&self.dimensions)
            .filter(|p| !members.contains(p))
            .collect();
        Mask::from_points(&self.dimensions, points)
    }

    /// Trace the outer contour of a 2D mask.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::UnsupportedRank`] for 3D masks.
    pub fn outline(&self) -> RegionResult<Outline> {
        if self.rank() != 2 {
            return Err(RegionError::UnsupportedRank {
                operation: "outline",
                expected: 2,
                actual: self.rank(),
            });
        }
        Ok(trace_outline(&self.points, self.members()))
    }

    /// Shift every point by `offset`.
    pub fn translate(&mut self, offset: Point) {
        for p in &mut self.points {
            *p += offset;
        }
        self.invalidate();
    }

    /// The mask cropped to its bounding box.
    ///
    /// Returns the box and a 0/1 buffer over it in scan order, or `None` for
    /// an empty mask.
    pub fn box_mask(&self) -> Option<(BoundingBox, Vec<u8>)> {
        let bbox = self.bounding_box()?;
        let extent = bbox.extent();
        let mut cells = vec![0u8; bbox.volume()];
        for p in &self.points {
            let d = *p - bbox.min;
            let i = d.x as usize + d.y as usize * extent[0] + d.z as usize * extent[0] * extent[1];
            cells[i] = 1;
        }
        Some((bbox, cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(dims: &[usize], x0: i32, y0: i32, size: i32) -> Mask {
        let mut mask = Mask::new(dims);
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                mask.add_point(Point::new2(x, y));
            }
        }
        mask
    }

    #[test]
    fn test_cache_invalidation() {
        let mut mask = square(&[8, 8], 1, 1, 2);
        assert_eq!(mask.bounding_box().unwrap().max, Point::new2(2, 2));
        assert!(!mask.contains(&Point::new2(5, 5)));
        mask.add_point(Point::new2(5, 5));
        assert_eq!(mask.bounding_box().unwrap().max, Point::new2(5, 5));
        assert!(mask.contains(&Point::new2(5, 5)));
    }

    #[test]
    fn test_overlap_and_intersection() {
        let a = square(&[8, 8], 0, 0, 3);
        let b = square(&[8, 8], 2, 2, 3);
        let c = square(&[8, 8], 5, 5, 2);
        assert!(a.overlap(&b));
        assert!(!a.overlap(&c));
        assert_eq!(a.intersection(&b).points(), &[Point::new2(2, 2)]);
        assert!(!Mask::new(&[8, 8]).overlap(&a));
    }

    #[test]
    fn test_to_volume_rejects_outside_points() {
        let mut mask = square(&[3, 3], 0, 0, 2);
        let vol = mask.to_volume().unwrap();
        assert_eq!(vol.data(), &[1, 1, 0, 1, 1, 0, 0, 0, 0]);

        mask.add_point(Point::new2(3, 0));
        assert!(matches!(
            mask.to_volume(),
            Err(RegionError::PointOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_negate_involution() {
        let mask = Mask::from_points(
            &[4, 3, 2],
            vec![Point::new(3, 2, 1), Point::new(0, 0, 0), Point::new(1, 2, 0)],
        );
        let neg = mask.negate();
        assert_eq!(neg.len(), 24 - 3);
        assert!(!neg.overlap(&mask));
        let back = neg.negate();
        let a: HashSet<Point> = back.points().iter().copied().collect();
        let b: HashSet<Point> = mask.points().iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_translate_and_box_mask() {
        let mut mask = Mask::from_points(&[10, 10], vec![Point::new2(0, 0), Point::new2(1, 1)]);
        mask.translate(Point::new2(2, 3));
        assert_eq!(mask.points()[0], Point::new2(2, 3));
        let (bbox, cells) = mask.box_mask().unwrap();
        assert_eq!(bbox.min, Point::new2(2, 3));
        assert_eq!(cells, vec![1, 0, 0, 1]);
        assert!(Mask::new(&[2, 2]).box_mask().is_none());
    }

    #[test]
    fn test_outline_requires_2d() {
        let mask = Mask::from_points(&[2, 2, 2], vec![Point::ZERO]);
        assert!(matches!(
            mask.outline(),
            Err(RegionError::UnsupportedRank { actual: 3, .. })
        ));
    }

    #[test]
    fn test_set_rank() {
        let mut mask = Mask::new(&[4, 5]);
        mask.set_rank(3);
        assert_eq!(mask.dimensions(), &[4, 5, 1]);
        mask.set_dimensions(&[2, 2]);
        assert_eq!(mask.rank(), 2);
    }
}
