//! Entry points for a host numeric environment
//!
//! A host hands over flat arrays ([`HostArray`]) and string-keyed parameter
//! bags ([`Parameters`]) and expects either a result or a readable message.
//! Every entry point here therefore returns `Option`: on failure the error
//! text goes to the caller's [`MessageChannel`] and `None` comes back.
//!
//! ```
//! use elib::Parameters;
//! use elib::host::{self, HostArray, HostData};
//!
//! let image = HostArray::new(&[2, 2], 8, 1, HostData::Integer(vec![0, 255, 0, 255]));
//! let params = Parameters::new()
//!     .with_double("C0", 0.0)
//!     .with_double("C1", 1.0)
//!     .with_double("Lambda", 0.5);
//!
//! let mut messages: Vec<String> = Vec::new();
//! assert!(host::graphcut(&image, &params, &mut messages).is_none());
//! assert_eq!(messages, ["missing parameter: Sigma"]);
//! ```

use crate::error::{HostError, HostResult};
use elib_core::{Parameters, Point, Sample, Volume};
use elib_graphcut::{BinaryOptions, MultiLabelOptions, Smoothness};
use elib_region::{ComponentOptions, ComponentsMeasurements, Connectivity};

/// Sample buffer of a [`HostArray`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostData {
    Integer(Vec<i64>),
    Double(Vec<f64>),
}

impl HostData {
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A flat array as exchanged with the host: x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct HostArray {
    pub rank: usize,
    pub dimensions: Vec<usize>,
    pub bit_depth: u32,
    pub channels: usize,
    pub data: HostData,
}

impl HostArray {
    pub fn new(dimensions: &[usize], bit_depth: u32, channels: usize, data: HostData) -> Self {
        Self {
            rank: dimensions.len(),
            dimensions: dimensions.to_vec(),
            bit_depth,
            channels,
            data,
        }
    }

    fn check_rank(&self) -> HostResult<()> {
        if self.rank != self.dimensions.len() {
            return Err(HostError::RankMismatch {
                rank: self.rank,
                dimensions: self.dimensions.len(),
            });
        }
        Ok(())
    }

    /// Convert to a 32-bit integer volume. Doubles are truncated towards
    /// zero.
    ///
    /// # Errors
    ///
    /// Returns an error for an inconsistent rank, an invalid shape or an
    /// integer outside the `i32` range.
    pub fn to_integer_volume(&self) -> HostResult<Volume<i32>> {
        self.check_rank()?;
        let data = match &self.data {
            HostData::Integer(values) => values
                .iter()
                .map(|&v| i32::try_from(v).map_err(|_| HostError::ValueOutOfRange(v)))
                .collect::<HostResult<Vec<_>>>()?,
            HostData::Double(values) => values.iter().map(|&v| v as i32).collect(),
        };
        Ok(Volume::from_vec(
            &self.dimensions,
            self.bit_depth,
            self.channels,
            data,
        )?)
    }

    /// Convert to a floating point volume.
    ///
    /// # Errors
    ///
    /// Returns an error for an inconsistent rank or an invalid shape.
    pub fn to_double_volume(&self) -> HostResult<Volume<f64>> {
        self.check_rank()?;
        let data = match &self.data {
            HostData::Integer(values) => values.iter().map(|&v| v as f64).collect(),
            HostData::Double(values) => values.clone(),
        };
        Ok(Volume::from_vec(
            &self.dimensions,
            self.bit_depth,
            self.channels,
            data,
        )?)
    }

    /// Copy a volume into host form; floating volumes give double data.
    pub fn from_volume<T: Sample>(volume: &Volume<T>) -> Self {
        let data = if T::FLOATING {
            HostData::Double(volume.data().iter().map(|v| v.to_f64()).collect())
        } else {
            HostData::Integer(volume.data().iter().map(|v| v.to_f64() as i64).collect())
        };
        Self::new(
            volume.dimensions(),
            volume.bit_depth(),
            volume.channels(),
            data,
        )
    }
}

/// Where entry points send the text of their failures.
pub trait MessageChannel {
    fn report(&mut self, message: &str);
}

impl MessageChannel for Vec<String> {
    fn report(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Forwards messages to the `log` facade at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogChannel;

impl MessageChannel for LogChannel {
    fn report(&mut self, message: &str) {
        log::error!("{message}");
    }
}

fn deliver<T>(result: HostResult<T>, channel: &mut dyn MessageChannel) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            channel.report(&e.to_string());
            None
        }
    }
}

/// Binary segmentation of `image` with parameters `C0`, `C1`, `Lambda` and
/// `Sigma`.
pub fn graphcut(
    image: &HostArray,
    params: &Parameters,
    channel: &mut dyn MessageChannel,
) -> Option<HostArray> {
    let run = || -> HostResult<HostArray> {
        let options = BinaryOptions::from_params(params)?;
        let volume = image.to_double_volume()?;
        let labels = elib_graphcut::graphcut(&volume, &options)?;
        Ok(HostArray::from_volume(&labels))
    };
    deliver(run(), channel)
}

/// Binary segmentation with background and foreground intensity tables and
/// parameters `Lambda` and `Sigma`.
pub fn graphcut_with_histograms(
    image: &HostArray,
    background: &[f64],
    foreground: &[f64],
    params: &Parameters,
    channel: &mut dyn MessageChannel,
) -> Option<HostArray> {
    let run = || -> HostResult<HostArray> {
        let smoothness = Smoothness::from_params(params)?;
        let volume = image.to_double_volume()?;
        let labels =
            elib_graphcut::graphcut_with_histograms(&volume, background, foreground, &smoothness)?;
        Ok(HostArray::from_volume(&labels))
    };
    deliver(run(), channel)
}

/// Multi-label refinement of `prior` with parameters `NumberLabels`, `C0`,
/// `C1`, `Lambda`, `Sigma` and `Mu` (optionally `Cycles`, `Strategy`,
/// `Seed`).
pub fn multilabel_graphcut(
    image: &HostArray,
    prior: &HostArray,
    params: &Parameters,
    channel: &mut dyn MessageChannel,
) -> Option<HostArray> {
    let run = || -> HostResult<HostArray> {
        let options = MultiLabelOptions::from_params(params)?;
        let volume = image.to_double_volume()?;
        let prior = prior.to_integer_volume()?;
        let labels = elib_graphcut::multilabel_graphcut(&volume, &prior, &options)?;
        Ok(HostArray::from_volume(&labels))
    };
    deliver(run(), channel)
}

/// Multi-label refinement with intensity tables learned from `prior`;
/// `C0` and `C1` are not read.
pub fn adaptive_multilabel_graphcut(
    image: &HostArray,
    prior: &HostArray,
    params: &Parameters,
    channel: &mut dyn MessageChannel,
) -> Option<HostArray> {
    let run = || -> HostResult<HostArray> {
        let options = MultiLabelOptions::adaptive_from_params(params)?;
        let volume = image.to_double_volume()?;
        let prior = prior.to_integer_volume()?;
        let labels = elib_graphcut::adaptive_multilabel_graphcut(&volume, &prior, &options)?;
        Ok(HostArray::from_volume(&labels))
    };
    deliver(run(), channel)
}

/// Read `Connectivity` (0 small, 1 large, default large) and `LabelOffset`
/// (default 1).
fn component_options(params: &Parameters) -> HostResult<ComponentOptions> {
    let connectivity = match params.get_integer("Connectivity") {
        None | Some(1) => Connectivity::Large,
        Some(0) => Connectivity::Small,
        Some(other) => {
            return Err(HostError::InvalidParameter(format!(
                "Connectivity must be 0 (small) or 1 (large), got {other}"
            )));
        }
    };
    let offset = match params.get_integer("LabelOffset") {
        None => 1,
        Some(v) => i32::try_from(v).map_err(|_| HostError::ValueOutOfRange(v))?,
    };
    Ok(ComponentOptions::new(connectivity).with_label_offset(offset))
}

/// Label the connected components of the positive voxels of `image`.
pub fn connected_components(
    image: &HostArray,
    params: &Parameters,
    channel: &mut dyn MessageChannel,
) -> Option<HostArray> {
    let run = || -> HostResult<HostArray> {
        let options = component_options(params)?;
        let volume = image.to_integer_volume()?;
        let labels = elib_region::label_components(&volume, &options)?;
        log::debug!(
            "host connected components: {:?} connectivity, first label {}",
            options.connectivity,
            options.label_offset
        );
        Ok(HostArray::from_volume(&labels))
    };
    deliver(run(), channel)
}

/// Objects of a label volume in host form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostMeasurements {
    /// Object labels, ascending
    pub labels: Vec<i32>,
    /// Per object, its voxel coordinates in scan order, 1-based and
    /// interleaved (`x y` or `x y z` per voxel)
    pub masks: Vec<Vec<i64>>,
}

impl HostMeasurements {
    pub fn num_objects(&self) -> usize {
        self.labels.len()
    }
}

fn one_based(p: &Point, rank: usize) -> impl Iterator<Item = i64> {
    [p.x, p.y, p.z]
        .into_iter()
        .take(rank)
        .map(|c| i64::from(c) + 1)
}

/// Bucket the voxels of a label volume by label.
pub fn components_measurements(
    labels: &HostArray,
    channel: &mut dyn MessageChannel,
) -> Option<HostMeasurements> {
    let run = || -> HostResult<HostMeasurements> {
        let volume = labels.to_integer_volume()?;
        let measurements = ComponentsMeasurements::new(&volume)?;
        let rank = volume.rank();
        let (labels, masks) = measurements
            .masks()
            .iter()
            .map(|(label, mask)| {
                let coords: Vec<i64> =
                    mask.points().iter().flat_map(|p| one_based(p, rank)).collect();
                (label, coords)
            })
            .unzip();
        Ok(HostMeasurements { labels, masks })
    };
    deliver(run(), channel)
}
