//! Components measurements
//!
//! Turns a label volume into its region model: one [`Mask`](crate::Mask) per
//! distinct positive label, filled by a single scan.

use std::collections::BTreeSet;

use crate::error::{RegionError, RegionResult};
use crate::mask_list::MaskList;
use elib_core::{BoundingBox, Volume};

/// Distinct labels of a label volume and the mask of each.
#[derive(Debug, Clone)]
pub struct ComponentsMeasurements {
    labels: BTreeSet<i32>,
    masks: MaskList,
}

/// Summary statistics of one labelled object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectStats {
    /// Label of the object
    pub label: i32,
    /// Number of voxels
    pub size: usize,
    /// Bounding box
    pub bounds: BoundingBox,
    /// Mean voxel coordinate `[x, y, z]`
    pub centroid: [f64; 3],
}

impl ComponentsMeasurements {
    /// Bucket the voxels of `labels` by label.
    ///
    /// Voxels with label ≤ 0 are not objects and are skipped. Points are
    /// added to their mask in scan order.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::UnsupportedChannels`] for multi-channel input.
    pub fn new(label_volume: &Volume<i32>) -> RegionResult<Self> {
        if label_volume.channels() != 1 {
            return Err(RegionError::UnsupportedChannels(label_volume.channels()));
        }
        let mut labels = BTreeSet::new();
        let mut masks = MaskList::for_volume(label_volume);
        for (p, &label) in label_volume.points().zip(label_volume.data()) {
            if label > 0 {
                labels.insert(label);
                masks.add_mask(label).add_point(p);
            }
        }
        log::debug!(
            "measured {} objects in {:?} label volume",
            labels.len(),
            label_volume.dimensions()
        );
        Ok(Self { labels, masks })
    }

    /// Distinct positive labels, ascending.
    pub fn labels(&self) -> &BTreeSet<i32> {
        &self.labels
    }

    pub fn masks(&self) -> &MaskList {
        &self.masks
    }

    pub fn into_masks(self) -> MaskList {
        self.masks
    }

    pub fn num_objects(&self) -> usize {
        self.masks.len()
    }

    /// Size, bounding box and centroid of every object, by ascending label.
    pub fn object_stats(&self) -> Vec<ObjectStats> {
        self.masks
            .iter()
            .filter_map(|(label, mask)| {
                let bounds = mask.bounding_box()?;
                let n = mask.len() as f64;
                let mut sum = [0.0f64; 3];
                for p in mask.points() {
                    sum[0] += p.x as f64;
                    sum[1] += p.y as f64;
                    sum[2] += p.z as f64;
                }
                Some(ObjectStats {
                    label,
                    size: mask.len(),
                    bounds,
                    centroid: sum.map(|s| s / n),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elib_core::Point;

    #[test]
    fn test_bucketing() {
        let vol = Volume::from_vec(&[3, 2], 16, 1, vec![0, 5, 5, 2, -1, 5]).unwrap();
        let cm = ComponentsMeasurements::new(&vol).unwrap();
        assert_eq!(cm.labels().iter().copied().collect::<Vec<_>>(), vec![2, 5]);
        assert_eq!(cm.num_objects(), 2);
        assert_eq!(
            cm.masks().get(5).unwrap().points(),
            &[Point::new2(1, 0), Point::new2(2, 0), Point::new2(2, 1)]
        );
    }

    #[test]
    fn test_object_stats() {
        let vol = Volume::from_vec(&[2, 2], 16, 1, vec![1, 1, 0, 1]).unwrap();
        let stats = ComponentsMeasurements::new(&vol).unwrap().object_stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].size, 3);
        assert_eq!(stats[0].bounds.extent(), [2, 2, 1]);
        assert!((stats[0].centroid[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((stats[0].centroid[1] - 1.0 / 3.0).abs() < 1e-12);
    }
}
