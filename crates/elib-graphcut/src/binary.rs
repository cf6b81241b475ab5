//! Binary graph-cut segmentation
//!
//! Every voxel becomes one variable of a binary [`Energy`]. The data term
//! pulls a voxel towards background (0) or foreground (1) according to its
//! intensity, either by distance to two reference constants or by two
//! intensity probability tables. The pairwise term charges
//! `λ·exp(−((v_i − v_j)/max)²/σ)` for every neighbouring pair (8- or
//! 26-neighbourhood) that ends up with different labels, so cuts prefer to
//! run along intensity edges.
//!
//! # Example
//!
//! ```
//! use elib_core::Volume;
//! use elib_graphcut::{BinaryOptions, graphcut};
//!
//! let image = Volume::<u8>::from_vec(&[2, 2], 8, 1, vec![0, 255, 0, 255]).unwrap();
//! let labels = graphcut(&image, &BinaryOptions::default()).unwrap();
//! assert_eq!(labels.data(), &[0, 1, 0, 1]);
//! ```

use crate::config::{Smoothness, max_intensity, required_double};
use crate::energy::Energy;
use crate::error::{GraphCutError, GraphCutResult};
use elib_core::{Parameters, Point, Sample, Volume};
use elib_region::{Connectivity, RegionError, forward_half, neighbourhood};

/// Options of the fixed-constant binary segmenter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryOptions {
    /// Background reference intensity as a fraction of the maximum (`C0`)
    pub c0: f64,
    /// Foreground reference intensity as a fraction of the maximum (`C1`)
    pub c1: f64,
    /// Pairwise weight and scale
    pub smoothness: Smoothness,
}

impl Default for BinaryOptions {
    fn default() -> Self {
        Self {
            c0: 0.0,
            c1: 1.0,
            smoothness: Smoothness::new(0.5, 1.0),
        }
    }
}

impl BinaryOptions {
    pub fn new(c0: f64, c1: f64, lambda: f64, sigma: f64) -> Self {
        Self {
            c0,
            c1,
            smoothness: Smoothness::new(lambda, sigma),
        }
    }

    /// Read the required `C0`, `C1`, `Lambda` and `Sigma`.
    pub fn from_params(params: &Parameters) -> GraphCutResult<Self> {
        let c0 = required_double(params, "C0")?;
        let c1 = required_double(params, "C1")?;
        let smoothness = Smoothness::from_params(params)?;
        Ok(Self { c0, c1, smoothness })
    }
}

#[derive(Debug, Clone, Copy)]
enum DataTerm<'a> {
    Constants { c0: f64, c1: f64 },
    Histograms { background: &'a [f64], foreground: &'a [f64] },
}

/// Unary and pairwise costs of the binary segmentation energy.
#[derive(Debug, Clone, Copy)]
pub struct BinaryEnergyModel<'a> {
    data: DataTerm<'a>,
    smoothness: Smoothness,
    max: f64,
}

impl<'a> BinaryEnergyModel<'a> {
    /// Model with reference constants for `bit_depth`-bit intensities.
    pub fn with_constants(options: &BinaryOptions, bit_depth: u32) -> GraphCutResult<Self> {
        options.smoothness.validate()?;
        Ok(Self {
            data: DataTerm::Constants {
                c0: options.c0,
                c1: options.c1,
            },
            smoothness: options.smoothness,
            max: max_intensity(bit_depth),
        })
    }

    /// Model with background/foreground probability tables.
    ///
    /// # Errors
    ///
    /// Returns [`GraphCutError::HistogramLength`] unless both tables have
    /// exactly `2^bit_depth` entries.
    pub fn with_histograms(
        background: &'a [f64],
        foreground: &'a [f64],
        smoothness: Smoothness,
        bit_depth: u32,
    ) -> GraphCutResult<Self> {
        smoothness.validate()?;
        let expected = 1usize
            .checked_shl(bit_depth)
            .ok_or_else(|| GraphCutError::InvalidParameter(format!("bit depth {bit_depth}")))?;
        for (table, entries) in [("background", background), ("foreground", foreground)] {
            if entries.len() != expected {
                return Err(GraphCutError::HistogramLength {
                    table,
                    expected,
                    actual: entries.len(),
                });
            }
        }
        Ok(Self {
            data: DataTerm::Histograms {
                background,
                foreground,
            },
            smoothness,
            max: max_intensity(bit_depth),
        })
    }

    /// Cost of labelling a voxel of intensity `v` as `[background, foreground]`.
    pub fn unary(&self, v: f64) -> [f64; 2] {
        let weight = 1.0 - self.smoothness.lambda;
        match self.data {
            DataTerm::Constants { c0, c1 } => {
                let x = v / self.max;
                [weight * (x - c0).abs(), weight * (x - c1).abs()]
            }
            DataTerm::Histograms {
                background,
                foreground,
            } => {
                let bin = v.clamp(0.0, self.max) as usize;
                [weight * (1.0 - background[bin]), weight * (1.0 - foreground[bin])]
            }
        }
    }

    /// Cost of giving neighbours of intensities `vi`, `vj` different labels.
    /// Equal labels cost nothing.
    pub fn pairwise(&self, vi: f64, vj: f64) -> f64 {
        self.smoothness.lambda * self.smoothness.similarity(vi, vj, self.max)
    }

    /// Total energy of a 0/1 labelling of `image`.
    pub(crate) fn evaluate<T: Sample>(&self, image: &Volume<T>, labels: &[i32]) -> f64 {
        let data = image.data();
        let mut total: f64 = data
            .iter()
            .zip(labels)
            .map(|(&v, &l)| self.unary(v.to_f64())[usize::from(l != 0)])
            .sum();
        let offsets = pair_offsets(image.rank());
        for (i, j) in neighbour_pairs(image, &offsets) {
            if (labels[i] != 0) != (labels[j] != 0) {
                total += self.pairwise(data[i].to_f64(), data[j].to_f64());
            }
        }
        total
    }
}

/// Forward half of the 8- or 26-neighbourhood.
fn pair_offsets(rank: usize) -> Vec<Point> {
    forward_half(neighbourhood(rank, Connectivity::Large))
}

/// Every unordered pair of neighbouring voxels, once, as flat indices.
fn neighbour_pairs<'a, T: Sample>(
    image: &'a Volume<T>,
    offsets: &'a [Point],
) -> impl Iterator<Item = (usize, usize)> + 'a {
    image.points().enumerate().flat_map(move |(i, p)| {
        offsets
            .iter()
            .filter_map(move |off| image.index_of(&(p + *off)).map(|j| (i, j)))
    })
}

pub(crate) fn check_single_channel<T: Sample>(image: &Volume<T>) -> GraphCutResult<()> {
    if image.channels() != 1 {
        return Err(RegionError::UnsupportedChannels(image.channels()).into());
    }
    Ok(())
}

/// Build the energy of `image` under `model`, minimize it and read the cut.
fn segment<T: Sample>(
    image: &Volume<T>,
    model: &BinaryEnergyModel,
) -> GraphCutResult<Volume<i32>> {
    check_single_channel(image)?;
    let n = image.voxel_count();
    let data = image.data();
    let offsets = pair_offsets(image.rank());
    let mut energy = Energy::with_capacity(n, n * offsets.len());

    for &v in data {
        let x = energy.add_variable();
        let [e0, e1] = model.unary(v.to_f64());
        energy.add_term1(x, e0, e1);
    }
    for (i, j) in neighbour_pairs(image, &offsets) {
        let w = model.pairwise(data[i].to_f64(), data[j].to_f64());
        energy.add_term2(i, j, 0.0, w, w, 0.0)?;
    }

    let minimum = energy.minimize();
    let labels: Vec<i32> = (0..n).map(|i| i32::from(energy.value(i))).collect();
    log::info!(
        "binary graph cut of {:?}: energy {:.6}, {} foreground voxels",
        image.dimensions(),
        minimum,
        labels.iter().filter(|&&l| l == 1).count()
    );
    Ok(Volume::from_vec(
        image.dimensions(),
        image.bit_depth(),
        1,
        labels,
    )?)
}

/// Binary segmentation with fixed reference intensities.
///
/// Returns a 0/1 label volume with the shape and bit depth of `image`.
///
/// # Errors
///
/// Invalid options, or a multi-channel image.
pub fn graphcut<T: Sample>(
    image: &Volume<T>,
    options: &BinaryOptions,
) -> GraphCutResult<Volume<i32>> {
    let model = BinaryEnergyModel::with_constants(options, image.bit_depth())?;
    segment(image, &model)
}

/// Binary segmentation with intensity probability tables.
///
/// `background[v]` and `foreground[v]` are the probabilities of intensity
/// `v` in each class; both must have `2^bit_depth` entries.
pub fn graphcut_with_histograms<T: Sample>(
    image: &Volume<T>,
    background: &[f64],
    foreground: &[f64],
    smoothness: &Smoothness,
) -> GraphCutResult<Volume<i32>> {
    let model =
        BinaryEnergyModel::with_histograms(background, foreground, *smoothness, image.bit_depth())?;
    segment(image, &model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Volume<u8> {
        Volume::from_vec(&[2, 2], 8, 1, vec![0, 255, 0, 255]).unwrap()
    }

    #[test]
    fn test_pairwise_is_submodular() {
        let model =
            BinaryEnergyModel::with_constants(&BinaryOptions::new(0.0, 1.0, 0.7, 0.3), 8).unwrap();
        for (a, b) in [(0.0, 0.0), (0.0, 255.0), (17.0, 90.0)] {
            let w = model.pairwise(a, b);
            assert!(w >= 0.0 && w <= 0.7);
        }
    }

    #[test]
    fn test_unary_constants() {
        let model = BinaryEnergyModel::with_constants(&BinaryOptions::default(), 8).unwrap();
        assert_eq!(model.unary(0.0), [0.0, 0.5]);
        assert_eq!(model.unary(255.0), [0.5, 0.0]);
    }

    #[test]
    fn test_two_columns() {
        let labels = graphcut(&two_by_two(), &BinaryOptions::default()).unwrap();
        assert_eq!(labels.data(), &[0, 1, 0, 1]);
        assert_eq!(labels.bit_depth(), 8);
        assert_eq!(labels.channels(), 1);
    }

    #[test]
    fn test_strong_smoothing_merges() {
        // Dominant pairwise weight: one uniform label beats splitting
        let image = Volume::<u8>::from_vec(&[3, 1], 8, 1, vec![0, 0, 200]).unwrap();
        let labels = graphcut(&image, &BinaryOptions::new(0.0, 1.0, 0.99, 100.0)).unwrap();
        assert_eq!(labels.data(), &[0, 0, 0]);
    }

    #[test]
    fn test_histograms() {
        let mut background = vec![0.0; 4];
        let mut foreground = vec![0.0; 4];
        background[0] = 1.0;
        foreground[3] = 1.0;
        let image = Volume::<u8>::from_vec(&[2, 2], 2, 1, vec![3, 0, 3, 0]).unwrap();
        let labels = graphcut_with_histograms(
            &image,
            &background,
            &foreground,
            &Smoothness::new(0.2, 1.0),
        )
        .unwrap();
        assert_eq!(labels.data(), &[1, 0, 1, 0]);

        let short = vec![0.0; 3];
        assert!(matches!(
            graphcut_with_histograms(&image, &short, &foreground, &Smoothness::default()),
            Err(GraphCutError::HistogramLength {
                table: "background",
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_multichannel_rejected() {
        let image = Volume::<u8>::new(&[2, 2], 8, 3).unwrap();
        assert!(matches!(
            graphcut(&image, &BinaryOptions::default()),
            Err(GraphCutError::Region(RegionError::UnsupportedChannels(3)))
        ));
    }

    #[test]
    fn test_evaluate_matches_minimum() {
        let image = two_by_two();
        let model = BinaryEnergyModel::with_constants(&BinaryOptions::default(), 8).unwrap();
        let cut = (-1.0f64).exp() * 0.5;
        assert!((model.evaluate(&image, &[0, 1, 0, 1]) - 4.0 * cut).abs() < 1e-12);
        assert!((model.evaluate(&image, &[0, 0, 0, 0]) - 1.0).abs() < 1e-12);
    }
}
