//! Connected component analysis
//!
//! Labels maximal connected regions of positive voxels in 2D and 3D volumes
//! by breadth-first flood fill. Components are numbered in first-encounter
//! order of a z/y/x scan, starting at a configurable offset.
//!
//! # Example
//!
//! ```
//! use elib_core::Volume;
//! use elib_region::{ComponentOptions, Connectivity, label_components};
//!
//! // Two pixels touching only at a corner
//! let vol = Volume::from_vec(&[2, 2], 1, 1, vec![1, 0, 0, 1]).unwrap();
//!
//! let small = label_components(&vol, &ComponentOptions::new(Connectivity::Small)).unwrap();
//! assert_eq!(small.data(), &[1, 0, 0, 2]);
//!
//! let large = label_components(&vol, &ComponentOptions::default()).unwrap();
//! assert_eq!(large.data(), &[1, 0, 0, 1]);
//! ```

use std::collections::{BTreeMap, VecDeque};

use crate::error::{RegionError, RegionResult};
use elib_core::{BoundingBox, LABEL_BIT_DEPTH, Point, Sample, Volume, linear_index};

/// Neighbourhood used to decide which voxels touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Face adjacency only (4 neighbours in 2D, 6 in 3D)
    Small,
    /// Face, edge and corner adjacency (8 neighbours in 2D, 26 in 3D)
    #[default]
    Large,
}

/// 4-neighbourhood
pub const SMALL_2D: [Point; 4] = [
    Point::new(-1, 0, 0),
    Point::new(1, 0, 0),
    Point::new(0, -1, 0),
    Point::new(0, 1, 0),
];

/// 8-neighbourhood
pub const LARGE_2D: [Point; 8] = [
    Point::new(-1, -1, 0),
    Point::new(0, -1, 0),
    Point::new(1, -1, 0),
    Point::new(-1, 0, 0),
    Point::new(1, 0, 0),
    Point::new(-1, 1, 0),
    Point::new(0, 1, 0),
    Point::new(1, 1, 0),
];

/// 6-neighbourhood
pub const SMALL_3D: [Point; 6] = [
    Point::new(-1, 0, 0),
    Point::new(1, 0, 0),
    Point::new(0, -1, 0),
    Point::new(0, 1, 0),
    Point::new(0, 0, -1),
    Point::new(0, 0, 1),
];

/// 26-neighbourhood
pub const LARGE_3D: [Point; 26] = {
    let mut table = [Point::ZERO; 26];
    let mut n = 0;
    let mut z = -1;
    while z <= 1 {
        let mut y = -1;
        while y <= 1 {
            let mut x = -1;
            while x <= 1 {
                if !(x == 0 && y == 0 && z == 0) {
                    table[n] = Point::new(x, y, z);
                    n += 1;
                }
                x += 1;
            }
            y += 1;
        }
        z += 1;
    }
    table
};

/// Offset table for a volume of the given rank.
///
/// Rank 2 selects the 2D tables, anything else the 3D tables.
pub fn neighbourhood(rank: usize, connectivity: Connectivity) -> &'static [Point] {
    match (rank, connectivity) {
        (2, Connectivity::Small) => &SMALL_2D,
        (2, Connectivity::Large) => &LARGE_2D,
        (_, Connectivity::Small) => &SMALL_3D,
        (_, Connectivity::Large) => &LARGE_3D,
    }
}

/// The offsets of `table` that come after the origin in scan order.
///
/// Visiting only these from every voxel reaches each unordered neighbour
/// pair exactly once.
pub fn forward_half(table: &[Point]) -> Vec<Point> {
    table.iter().copied().filter(|o| *o > Point::ZERO).collect()
}

/// Options for connected component labelling
#[derive(Debug, Clone)]
pub struct ComponentOptions {
    /// Connectivity type
    pub connectivity: Connectivity,
    /// Label given to the first component found
    pub label_offset: i32,
}

impl Default for ComponentOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Large,
            label_offset: 1,
        }
    }
}

impl ComponentOptions {
    /// Create new options with the specified connectivity
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            ..Self::default()
        }
    }

    /// Set the first label
    pub fn with_label_offset(mut self, offset: i32) -> Self {
        self.label_offset = offset;
        self
    }
}

/// A connected component of a label volume
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedComponent {
    /// Label of this component
    pub label: i32,
    /// Number of voxels in this component
    pub voxel_count: usize,
    /// Bounding box of this component
    pub bounds: BoundingBox,
}

/// Label all connected components of positive voxels.
///
/// Returns a new label volume of the same shape with bit depth
/// [`LABEL_BIT_DEPTH`]. Voxels with value ≤ 0 are 0 in the output; the k-th
/// component met in scan order gets `label_offset + k`.
///
/// # Errors
///
/// Returns [`RegionError::UnsupportedChannels`] for multi-channel input and
/// [`RegionError::InvalidParameters`] when a label would exceed `i32::MAX`.
pub fn label_components<T: Sample>(
    volume: &Volume<T>,
    options: &ComponentOptions,
) -> RegionResult<Volume<i32>> {
    if volume.channels() != 1 {
        return Err(RegionError::UnsupportedChannels(volume.channels()));
    }

    let dims = volume.dimensions();
    let offsets = neighbourhood(volume.rank(), options.connectivity);

    // Scratch copy; a voxel is cleared once it has been labelled
    let mut pending: Vec<bool> = volume.data().iter().map(|v| v.is_positive()).collect();
    let mut labels = vec![0i32; volume.len()];
    let mut next_label = Some(options.label_offset);
    let mut found = 0usize;
    let mut queue = VecDeque::new();

    for start in 0..pending.len() {
        if !pending[start] {
            continue;
        }
        let label = next_label.ok_or_else(|| {
            RegionError::InvalidParameters(format!(
                "label offset {} leaves no room for component {}",
                options.label_offset,
                found + 1
            ))
        })?;
        next_label = label.checked_add(1);
        found += 1;

        pending[start] = false;
        labels[start] = label;
        queue.push_back(volume.point_at(start));

        while let Some(p) = queue.pop_front() {
            for offset in offsets {
                let q = p + *offset;
                let Some(j) = linear_index(dims, &q) else {
                    continue;
                };
                if pending[j] {
                    pending[j] = false;
                    labels[j] = label;
                    queue.push_back(q);
                }
            }
        }
    }

    log::debug!(
        "labelled {} components in {:?} volume ({:?})",
        found,
        dims,
        options.connectivity
    );

    Ok(Volume::from_vec(dims, LABEL_BIT_DEPTH, 1, labels)?)
}

/// Count connected components of positive voxels.
pub fn count_components<T: Sample>(
    volume: &Volume<T>,
    connectivity: Connectivity,
) -> RegionResult<usize> {
    let labelled = label_components(volume, &ComponentOptions::new(connectivity))?;
    Ok(labelled.max().map_or(0, |m| m.max(0) as usize))
}

/// Find all connected components of positive voxels.
///
/// Returns one entry per component with its label, voxel count and bounding
/// box, sorted by label.
pub fn find_components<T: Sample>(
    volume: &Volume<T>,
    connectivity: Connectivity,
) -> RegionResult<Vec<ConnectedComponent>> {
    let labelled = label_components(volume, &ComponentOptions::new(connectivity))?;
    Ok(components_of(&labelled))
}

/// Voxel counts and bounding boxes of every positive label of a label volume.
pub fn components_of(labelled: &Volume<i32>) -> Vec<ConnectedComponent> {
    let mut found: BTreeMap<i32, ConnectedComponent> = BTreeMap::new();
    for (p, &label) in labelled.points().zip(labelled.data()) {
        if label <= 0 {
            continue;
        }
        found
            .entry(label)
            .and_modify(|c| {
                c.voxel_count += 1;
                c.bounds.expand_to_contain(p);
            })
            .or_insert_with(|| ConnectedComponent {
                label,
                voxel_count: 1,
                bounds: BoundingBox::from_corners(p, p),
            });
    }
    found.into_values().collect()
}
