//! Volume - the dense sample container
//!
//! A [`Volume`] is a rank-2 or rank-3 array of scalar samples together with
//! the bit depth that defines the nominal sample range and a channel count.
//!
//! # Memory layout
//!
//! - Dimensions are `[width, height]` or `[width, height, depth]`
//! - Samples are stored with x fastest, then y, then z:
//!   `index = x + y * width + z * width * height`
//! - With more than one channel, each channel occupies its own contiguous
//!   block of `width * height * depth` samples
//!
//! # Ownership model
//!
//! A volume is exclusively owned by whichever stage created it. Algorithms
//! take `&Volume` and always allocate a new output volume; nothing in the
//! workspace mutates an input volume in place.

mod sample;
mod scan;

pub use sample::Sample;
pub use scan::ScanPoints;

use crate::error::{Error, Result};
use crate::point::Point;

/// Bit depth given to label volumes produced by the workspace.
pub const LABEL_BIT_DEPTH: u32 = 16;

/// Dense rank-2/3 sample array.
///
/// # Examples
///
/// ```
/// use elib_core::{Point, Volume};
///
/// let vol = Volume::from_vec(&[3, 2], 8, 1, vec![0, 1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(vol.rank(), 2);
/// assert_eq!(vol.get(&Point::new2(1, 1)), Some(4));
/// assert_eq!(vol.max_intensity(), 255.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Volume<T: Sample = i32> {
    dimensions: Vec<usize>,
    bit_depth: u32,
    channels: usize,
    data: Vec<T>,
}

impl<T: Sample> Volume<T> {
    /// Create a zero-filled volume.
    ///
    /// # Arguments
    ///
    /// * `dimensions` - `[width, height]` or `[width, height, depth]`, all > 0
    /// * `bit_depth` - Nominal sample range is `0..2^bit_depth`
    /// * `channels` - Number of channels (> 0)
    ///
    /// # Errors
    ///
    /// Returns an error if the rank, a dimension, the bit depth or the
    /// channel count is invalid.
    pub fn new(dimensions: &[usize], bit_depth: u32, channels: usize) -> Result<Self> {
        let len = Self::validate_shape(dimensions, bit_depth, channels)?;
        Ok(Self {
            dimensions: dimensions.to_vec(),
            bit_depth,
            channels,
            data: vec![T::default(); len],
        })
    }

    /// Create a volume from an existing sample buffer.
    ///
    /// # Errors
    ///
    /// In addition to the checks of [`Volume::new`], returns
    /// [`Error::LengthMismatch`] if `data.len() != channels × Π(dimensions)`.
    pub fn from_vec(
        dimensions: &[usize],
        bit_depth: u32,
        channels: usize,
        data: Vec<T>,
    ) -> Result<Self> {
        let len = Self::validate_shape(dimensions, bit_depth, channels)?;
        if data.len() != len {
            return Err(Error::LengthMismatch {
                expected: len,
                actual: data.len(),
            });
        }
        Ok(Self {
            dimensions: dimensions.to_vec(),
            bit_depth,
            channels,
            data,
        })
    }

    fn validate_shape(dimensions: &[usize], bit_depth: u32, channels: usize) -> Result<usize> {
        if !(2..=3).contains(&dimensions.len()) {
            return Err(Error::InvalidRank(dimensions.len()));
        }
        if dimensions.contains(&0) {
            return Err(Error::InvalidDimension(dimensions.to_vec()));
        }
        if !(1..=32).contains(&bit_depth) {
            return Err(Error::InvalidBitDepth(bit_depth));
        }
        if channels == 0 {
            return Err(Error::InvalidChannels(channels));
        }
        dimensions
            .iter()
            .try_fold(channels, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::InvalidDimension(dimensions.to_vec()))
    }

    /// Create a zero-filled single-channel volume of another sample type with
    /// the same dimensions.
    pub fn create_template<U: Sample>(&self, bit_depth: u32) -> Result<Volume<U>> {
        Volume::<U>::new(&self.dimensions, bit_depth, 1)
    }

    /// Number of axes (2 or 3).
    #[inline]
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    /// Per-axis extents.
    #[inline]
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Extent along x.
    #[inline]
    pub fn width(&self) -> usize {
        self.dimensions[0]
    }

    /// Extent along y.
    #[inline]
    pub fn height(&self) -> usize {
        self.dimensions[1]
    }

    /// Extent along z (1 for 2D volumes).
    #[inline]
    pub fn depth(&self) -> usize {
        self.dimensions.get(2).copied().unwrap_or(1)
    }

    /// Nominal bits per sample.
    #[inline]
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of voxels per channel.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Flattened length (`channels × voxel_count`).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false` for a validly constructed volume.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Largest nominal sample value, `2^bit_depth - 1`.
    #[inline]
    pub fn max_intensity(&self) -> f64 {
        ((1u64 << self.bit_depth) - 1) as f64
    }

    /// Number of distinct nominal sample values, `2^bit_depth`.
    #[inline]
    pub fn intensity_levels(&self) -> usize {
        1usize << self.bit_depth
    }

    /// Raw sample buffer.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw sample buffer.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the volume and return its sample buffer.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Check whether `p` lies inside the volume on every axis of its rank.
    ///
    /// For 2D volumes a point with `z != 0` is outside.
    #[inline]
    pub fn contains(&self, p: &Point) -> bool {
        contains_point(&self.dimensions, p)
    }

    /// Flattened index of `p` in the first channel.
    #[inline]
    pub fn index_of(&self, p: &Point) -> Option<usize> {
        linear_index(&self.dimensions, p)
    }

    /// Coordinate of the flattened index `index` (first channel).
    pub fn point_at(&self, index: usize) -> Point {
        let w = self.width();
        let h = self.height();
        Point::new(
            (index % w) as i32,
            ((index / w) % h) as i32,
            (index / (w * h)) as i32,
        )
    }

    /// Sample at `p`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, p: &Point) -> Option<T> {
        self.index_of(p).map(|i| self.data[i])
    }

    /// Set the sample at `p`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointOutOfBounds`] if `p` is outside the volume.
    pub fn set(&mut self, p: &Point, value: T) -> Result<()> {
        let i = self.index_of(p).ok_or(Error::PointOutOfBounds(*p))?;
        self.data[i] = value;
        Ok(())
    }

    /// Iterate all voxel coordinates in scan order (z, then y, then x).
    pub fn points(&self) -> ScanPoints {
        ScanPoints::new(&self.dimensions)
    }

    /// Check that `other` has the same dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] otherwise.
    pub fn check_same_shape<U: Sample>(&self, other: &Volume<U>) -> Result<()> {
        if self.dimensions != other.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions.clone(),
                actual: other.dimensions.clone(),
            });
        }
        Ok(())
    }

    /// Apply `f` to every sample, producing a new volume with the given bit
    /// depth and the same channel count.
    pub fn map<U: Sample, F>(&self, bit_depth: u32, f: F) -> Result<Volume<U>>
    where
        F: FnMut(T) -> U,
    {
        Volume::from_vec(
            &self.dimensions,
            bit_depth,
            self.channels,
            self.data.iter().copied().map(f).collect(),
        )
    }

    /// Smallest sample.
    pub fn min(&self) -> Option<T> {
        self.data
            .iter()
            .copied()
            .reduce(|a, b| if b < a { b } else { a })
    }

    /// Largest sample.
    pub fn max(&self) -> Option<T> {
        self.data
            .iter()
            .copied()
            .reduce(|a, b| if b > a { b } else { a })
    }
}

/// Bounds check of `p` against `dimensions` (rank taken from its length).
#[inline]
pub fn contains_point(dimensions: &[usize], p: &Point) -> bool {
    let rank = dimensions.len();
    (0..3).all(|axis| {
        let c = p[axis];
        if axis < rank {
            c >= 0 && (c as usize) < dimensions[axis]
        } else {
            c == 0
        }
    })
}

/// Flattened index of `p` for a volume with `dimensions`, or `None` if out
/// of bounds.
#[inline]
pub fn linear_index(dimensions: &[usize], p: &Point) -> Option<usize> {
    if !contains_point(dimensions, p) {
        return None;
    }
    let w = dimensions[0];
    let h = dimensions[1];
    Some(p.x as usize + p.y as usize * w + p.z as usize * w * h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_shape() {
        assert!(matches!(
            Volume::<i32>::new(&[4], 8, 1),
            Err(Error::InvalidRank(1))
        ));
        assert!(matches!(
            Volume::<i32>::new(&[4, 0], 8, 1),
            Err(Error::InvalidDimension(_))
        ));
        assert!(matches!(
            Volume::<i32>::new(&[4, 4], 0, 1),
            Err(Error::InvalidBitDepth(0))
        ));
        assert!(matches!(
            Volume::<i32>::new(&[4, 4], 8, 0),
            Err(Error::InvalidChannels(0))
        ));
    }

    #[test]
    fn test_flattened_length() {
        let v = Volume::<f64>::new(&[3, 4, 5], 16, 2).unwrap();
        assert_eq!(v.len(), 2 * 3 * 4 * 5);
        assert_eq!(v.voxel_count(), 60);
        assert_eq!(v.depth(), 5);
        let err = Volume::from_vec(&[2, 2], 8, 1, vec![1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_indexing_3d() {
        let mut v = Volume::<i32>::new(&[3, 2, 2], 8, 1).unwrap();
        let p = Point::new(2, 1, 1);
        v.set(&p, 7).unwrap();
        assert_eq!(v.index_of(&p), Some(2 + 3 + 6));
        assert_eq!(v.point_at(11), p);
        assert_eq!(v.get(&p), Some(7));
        assert!(v.set(&Point::new(3, 0, 0), 1).is_err());
    }

    #[test]
    fn test_2d_rejects_nonzero_z() {
        let v = Volume::<i32>::new(&[2, 2], 8, 1).unwrap();
        assert!(v.contains(&Point::new2(1, 1)));
        assert!(!v.contains(&Point::new(1, 1, 1)));
        assert!(!v.contains(&Point::new2(-1, 0)));
    }

    #[test]
    fn test_min_max_and_map() {
        let v = Volume::from_vec(&[2, 2], 8, 1, vec![4, -1, 9, 0]).unwrap();
        assert_eq!(v.min(), Some(-1));
        assert_eq!(v.max(), Some(9));
        let f: Volume<f64> = v.map(8, |s| s as f64 / 2.0).unwrap();
        assert_eq!(f.data()[2], 4.5);
        assert_eq!(v.max_intensity(), 255.0);
        assert_eq!(v.intensity_levels(), 256);
    }
}
