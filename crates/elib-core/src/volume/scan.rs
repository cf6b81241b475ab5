//! Scan-order traversal of volume coordinates

use crate::point::Point;

/// Iterator over every coordinate of a volume in scan order: x fastest, then
/// y, then z. This matches the flattened sample layout, so the n-th item is
/// the coordinate of sample n.
#[derive(Debug, Clone)]
pub struct ScanPoints {
    width: i32,
    height: i32,
    depth: i32,
    next: Option<Point>,
}

impl ScanPoints {
    /// Scan the coordinates of a box with extents `dimensions`.
    ///
    /// Missing axes count as extent 1; any zero extent yields an empty scan.
    pub fn new(dimensions: &[usize]) -> Self {
        let width = dimensions.first().copied().unwrap_or(1) as i32;
        let height = dimensions.get(1).copied().unwrap_or(1) as i32;
        let depth = dimensions.get(2).copied().unwrap_or(1) as i32;
        let next = (width > 0 && height > 0 && depth > 0).then_some(Point::ZERO);
        Self {
            width,
            height,
            depth,
            next,
        }
    }
}

impl Iterator for ScanPoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let current = self.next?;
        let mut p = current;
        p.x += 1;
        if p.x == self.width {
            p.x = 0;
            p.y += 1;
            if p.y == self.height {
                p.y = 0;
                p.z += 1;
            }
        }
        self.next = (p.z < self.depth).then_some(p);
        Some(current)
    }
}
