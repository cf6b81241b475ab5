//! MaskList - a labelled collection of masks
//!
//! The list owns its masks by value in a label-ordered map, so the set of
//! known labels is always exactly the key set. All member masks share the
//! rank and dimensions of the list.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{RegionError, RegionResult};
use crate::mask::Mask;
use elib_core::{LABEL_BIT_DEPTH, Point, Sample, Volume};

/// Label → [`Mask`] mapping with shared dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskList {
    dimensions: Vec<usize>,
    masks: BTreeMap<i32, Mask>,
}

impl MaskList {
    pub fn new(dimensions: &[usize]) -> Self {
        Self {
            dimensions: dimensions.to_vec(),
            masks: BTreeMap::new(),
        }
    }

    /// Create an empty list with the shape of `volume`.
    pub fn for_volume<T: Sample>(volume: &Volume<T>) -> Self {
        Self::new(volume.dimensions())
    }

    /// Mask for `label`, created empty if the label is new.
    pub fn add_mask(&mut self, label: i32) -> &mut Mask {
        let dims = &self.dimensions;
        self.masks
            .entry(label)
            .or_insert_with(|| Mask::new(dims))
    }

    /// Insert `mask` under `label` unless the label is already present.
    ///
    /// Returns `false` (and drops `mask`) if the label exists.
    pub fn insert_mask(&mut self, label: i32, mut mask: Mask) -> bool {
        if self.masks.contains_key(&label) {
            return false;
        }
        mask.set_dimensions(&self.dimensions);
        self.masks.insert(label, mask);
        true
    }

    /// Move every mask of `other` into this list.
    ///
    /// Points of a label present in both lists are appended to the existing
    /// mask.
    pub fn merge(&mut self, other: MaskList) {
        for (label, mask) in other.masks {
            match self.masks.get_mut(&label) {
                Some(existing) => {
                    for p in mask.points() {
                        existing.add_point(*p);
                    }
                }
                None => {
                    self.insert_mask(label, mask);
                }
            }
        }
    }

    pub fn get(&self, label: i32) -> Option<&Mask> {
        self.masks.get(&label)
    }

    pub fn get_mut(&mut self, label: i32) -> Option<&mut Mask> {
        self.masks.get_mut(&label)
    }

    /// Remove and return the mask for `label`.
    pub fn remove(&mut self, label: i32) -> Option<Mask> {
        self.masks.remove(&label)
    }

    /// Remove every listed label.
    pub fn remove_all<I: IntoIterator<Item = i32>>(&mut self, labels: I) {
        for label in labels {
            self.masks.remove(&label);
        }
    }

    pub fn clear(&mut self) {
        self.masks.clear();
    }

    /// Labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = i32> + '_ {
        self.masks.keys().copied()
    }

    /// `(label, mask)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &Mask)> {
        self.masks.iter().map(|(l, m)| (*l, m))
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Change the rank of the list and every member mask.
    pub fn set_rank(&mut self, rank: usize) {
        self.dimensions.resize(rank, 1);
        for mask in self.masks.values_mut() {
            mask.set_rank(rank);
        }
    }

    /// Change the dimensions of the list and every member mask.
    pub fn set_dimensions(&mut self, dimensions: &[usize]) {
        self.dimensions = dimensions.to_vec();
        for mask in self.masks.values_mut() {
            mask.set_dimensions(dimensions);
        }
    }

    /// Shift every point of every mask by `offset`.
    pub fn translate(&mut self, offset: Point) {
        for mask in self.masks.values_mut() {
            mask.translate(offset);
        }
    }

    /// Union of all masks as one mask.
    ///
    /// Points are kept in order of first appearance (ascending label, then
    /// mask order); a coordinate shared by several masks appears once.
    pub fn fuse(&self) -> Mask {
        let mut seen = HashSet::new();
        let mut fused = Mask::new(&self.dimensions);
        for mask in self.masks.values() {
            for p in mask.points() {
                if seen.insert(*p) {
                    fused.add_point(*p);
                }
            }
        }
        fused
    }

    /// Rasterize into a label volume.
    ///
    /// Each point gets the label of its mask; where masks overlap the larger
    /// label wins.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegionError::PointOutOfBounds`] if any point lies
    /// outside the list dimensions; no partial volume is produced.
    pub fn to_volume(&self) -> RegionResult<Volume<i32>> {
        let mut volume = Volume::new(&self.dimensions, LABEL_BIT_DEPTH, 1)?;
        for mask in self.masks.values() {
            mask.check_bounds()?;
        }
        for (&label, mask) in &self.masks {
            for p in mask.points() {
                volume.set(p, label)?;
            }
        }
        Ok(volume)
    }

    /// Renumber the masks `1 + offset`, `2 + offset`, … in ascending order of
    /// their current labels.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::InvalidParameters`] and leaves the list
    /// unchanged if the last new label would exceed `i32::MAX`.
    pub fn relabel(&mut self, offset: i32) -> RegionResult<()> {
        let fits = i32::try_from(self.masks.len())
            .ok()
            .and_then(|n| n.checked_add(offset));
        if fits.is_none() {
            return Err(RegionError::InvalidParameters(format!(
                "relabelling {} masks from {} overflows",
                self.masks.len(),
                offset
            )));
        }
        let masks = std::mem::take(&mut self.masks);
        self.masks = masks
            .into_values()
            .zip((1..).map(|id| id + offset))
            .map(|(mask, id)| (id, mask))
            .collect();
        Ok(())
    }
}

impl fmt::Display for MaskList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size of list: {}", self.len())?;
        writeln!(f, "Rank: {}", self.rank())?;
        writeln!(f, "Dimensions: {:?}", self.dimensions)?;
        for (label, mask) in self.iter() {
            writeln!(f, "\tlabel: {} size: {}", label, mask.len())?;
        }
        Ok(())
    }
}
