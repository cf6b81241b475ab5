//! Empirical intensity distributions
//!
//! Histograms of the intensity values found under a set of points,
//! normalized to probabilities. The adaptive segmenters use one table for
//! the foreground (union of all prior objects) and one for the background
//! (its complement).

use crate::error::{RegionError, RegionResult};
use crate::measurements::ComponentsMeasurements;
use elib_core::{Point, Sample, Volume};

/// Largest bit depth for which a dense table is built.
pub const MAX_HISTOGRAM_BITS: u32 = 16;

/// Probability of each intensity value among the samples at `points`.
///
/// The table has `2^bit_depth` entries. Samples outside `0..2^bit_depth` are
/// clamped to the nearest end of the range; floating samples are truncated.
/// An empty point set gives a table of zeros.
///
/// # Errors
///
/// Returns [`RegionError::InvalidParameters`] if the bit depth exceeds
/// [`MAX_HISTOGRAM_BITS`], and [`RegionError::PointOutOfBounds`] for a point
/// outside the volume.
pub fn intensity_distribution<T: Sample>(
    volume: &Volume<T>,
    points: &[Point],
) -> RegionResult<Vec<f64>> {
    if volume.bit_depth() > MAX_HISTOGRAM_BITS {
        return Err(RegionError::InvalidParameters(format!(
            "histogram of {}-bit data (at most {} bits)",
            volume.bit_depth(),
            MAX_HISTOGRAM_BITS
        )));
    }
    let levels = volume.intensity_levels();
    let top = (levels - 1) as f64;
    let mut table = vec![0.0; levels];
    let mut clamped = 0usize;

    for p in points {
        let value = volume
            .get(p)
            .ok_or_else(|| RegionError::PointOutOfBounds {
                point: *p,
                dimensions: volume.dimensions().to_vec(),
            })?
            .to_f64();
        if !(0.0..=top).contains(&value) {
            clamped += 1;
        }
        // NaN lands in bin 0
        let bin = value.clamp(0.0, top) as usize;
        table[bin] += 1.0;
    }

    if clamped > 0 {
        log::warn!("{clamped} samples outside 0..={top} clamped into the histogram");
    }
    if !points.is_empty() {
        let n = points.len() as f64;
        table.iter_mut().for_each(|c| *c /= n);
    }
    Ok(table)
}

/// Foreground and background intensity tables derived from a prior.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityDistributions {
    /// Distribution outside every prior object
    pub background: Vec<f64>,
    /// Distribution inside the union of all prior objects
    pub foreground: Vec<f64>,
}

impl IntensityDistributions {
    /// Histogram `intensity` inside and outside the objects of `prior`.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::ShapeMismatch`] if the two volumes differ in
    /// dimensions, or any error of [`intensity_distribution`].
    pub fn from_prior<T: Sample>(
        intensity: &Volume<T>,
        prior: &Volume<i32>,
    ) -> RegionResult<Self> {
        if intensity.dimensions() != prior.dimensions() {
            return Err(RegionError::ShapeMismatch {
                expected: intensity.dimensions().to_vec(),
                actual: prior.dimensions().to_vec(),
            });
        }
        let measurements = ComponentsMeasurements::new(prior)?;
        let foreground_mask = measurements.masks().fuse();
        let background_mask = foreground_mask.negate();
        log::debug!(
            "intensity tables from {} foreground / {} background voxels",
            foreground_mask.len(),
            background_mask.len()
        );
        Ok(Self {
            background: intensity_distribution(intensity, background_mask.points())?,
            foreground: intensity_distribution(intensity, foreground_mask.points())?,
        })
    }
}
