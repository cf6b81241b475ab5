//! Multi-label graph-cut segmentation
//!
//! Refines a prior label volume against an intensity image. The label space
//! has fixed meaning:
//!
//! - index 0: background (prior values ≤ 0),
//! - index 1: a newly appearing object, only allowed where the prior
//!   already says 1,
//! - index 2 and up: the known objects of the prior, one per distinct
//!   value > 1, in ascending order.
//!
//! The data term charges `μ` for disagreeing with the prior plus an
//! intensity fidelity term; the smoothness term forbids label 1 next to a
//! known object. The energy is minimized with [`GridOptimizer`] starting from
//! the prior labelling.

pub mod optimizer;

use std::collections::BTreeSet;

use crate::GC_INFINITY;
use crate::binary::check_single_channel;
use crate::config::{Smoothness, max_intensity, required_double, required_integer};
use crate::error::{GraphCutError, GraphCutResult};
use elib_core::{Parameters, Sample, Volume};
use elib_region::IntensityDistributions;

pub use optimizer::{GridOptimizer, LabelOrder, MAX_TABLE_ENTRIES, MoveStrategy, SmoothCost};

/// Largest number of distinct labels a prior may carry.
pub const MAX_LABELS: usize = 4096;

/// Dense relabelling of the values of a prior label volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    /// Label value of each index, ascending
    values: Vec<i32>,
}

impl LabelMap {
    /// Collect `{0, 1}` and every prior value > 1.
    ///
    /// # Errors
    ///
    /// Returns [`GraphCutError::TooManyLabels`] if there are more than
    /// [`MAX_LABELS`] values.
    pub fn from_prior(prior: &Volume<i32>) -> GraphCutResult<Self> {
        let mut values: BTreeSet<i32> = [0, 1].into_iter().collect();
        values.extend(prior.data().iter().copied().filter(|&v| v > 1));
        if values.len() > MAX_LABELS {
            return Err(GraphCutError::TooManyLabels {
                count: values.len(),
                max: MAX_LABELS,
            });
        }
        Ok(Self {
            values: values.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Index of a label value; values ≤ 0 are background.
    pub fn index_of(&self, value: i32) -> Option<usize> {
        if value <= 0 {
            return Some(0);
        }
        self.values.binary_search(&value).ok()
    }

    /// Label value of an index.
    pub fn value(&self, index: usize) -> Option<i32> {
        self.values.get(index).copied()
    }
}

/// Options of the multi-label segmenters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiLabelOptions {
    /// Upper bound on the number of labels optimized over (`NumberLabels`)
    pub num_labels: usize,
    /// Background reference intensity, fraction of the maximum (`C0`)
    pub c0: f64,
    /// Object reference intensity, fraction of the maximum (`C1`)
    pub c1: f64,
    pub smoothness: Smoothness,
    /// Penalty for disagreeing with the prior (`Mu`)
    pub mu: f64,
    /// Optimization cycles; `None` runs to convergence (`Cycles`)
    pub cycles: Option<usize>,
    /// Move type (`Strategy`: 0 swap, 1 expansion)
    pub strategy: MoveStrategy,
    /// Label visiting order (`Seed` selects a random order)
    pub order: LabelOrder,
}

impl Default for MultiLabelOptions {
    fn default() -> Self {
        Self {
            num_labels: MAX_LABELS,
            c0: 0.1,
            c1: 0.9,
            smoothness: Smoothness::new(1.0, 1.0),
            mu: 1.0,
            cycles: None,
            strategy: MoveStrategy::Swap,
            order: LabelOrder::Sequential,
        }
    }
}

impl MultiLabelOptions {
    pub fn with_num_labels(mut self, num_labels: usize) -> Self {
        self.num_labels = num_labels;
        self
    }

    pub fn with_constants(mut self, c0: f64, c1: f64) -> Self {
        self.c0 = c0;
        self.c1 = c1;
        self
    }

    pub fn with_smoothness(mut self, lambda: f64, sigma: f64) -> Self {
        self.smoothness = Smoothness::new(lambda, sigma);
        self
    }

    pub fn with_mu(mut self, mu: f64) -> Self {
        self.mu = mu;
        self
    }

    pub fn with_cycles(mut self, cycles: Option<usize>) -> Self {
        self.cycles = cycles;
        self
    }

    pub fn with_strategy(mut self, strategy: MoveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_order(mut self, order: LabelOrder) -> Self {
        self.order = order;
        self
    }

    /// Read the fixed-constant options: required `NumberLabels`, `C0`,
    /// `C1`, `Lambda`, `Sigma`, `Mu`; optional `Cycles`, `Strategy`, `Seed`.
    pub fn from_params(params: &Parameters) -> GraphCutResult<Self> {
        let mut options = Self::adaptive_from_params(params)?;
        options.c0 = required_double(params, "C0")?;
        options.c1 = required_double(params, "C1")?;
        Ok(options)
    }

    /// Read the adaptive options: as [`MultiLabelOptions::from_params`]
    /// without `C0` and `C1`.
    pub fn adaptive_from_params(params: &Parameters) -> GraphCutResult<Self> {
        let num_labels = required_integer(params, "NumberLabels")?;
        let num_labels = usize::try_from(num_labels).map_err(|_| {
            GraphCutError::InvalidParameter(format!("NumberLabels must be >= 2, got {num_labels}"))
        })?;
        let smoothness = Smoothness::from_params(params)?;
        let mu = required_double(params, "Mu")?;

        let cycles = params
            .get_integer("Cycles")
            .and_then(|c| usize::try_from(c).ok());
        let strategy = match params.get_integer("Strategy") {
            None | Some(0) => MoveStrategy::Swap,
            Some(1) => MoveStrategy::Expansion,
            Some(other) => {
                return Err(GraphCutError::InvalidParameter(format!(
                    "Strategy must be 0 (swap) or 1 (expansion), got {other}"
                )));
            }
        };
        let order = match params.get_integer("Seed") {
            Some(seed) => LabelOrder::Random(seed as u64),
            None => LabelOrder::Sequential,
        };

        let options = Self {
            num_labels,
            smoothness,
            mu,
            cycles,
            strategy,
            order,
            ..Self::default()
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the label count, `μ ≥ 0` and the smoothness parameters.
    pub fn validate(&self) -> GraphCutResult<()> {
        if self.num_labels < 2 {
            return Err(GraphCutError::InvalidParameter(format!(
                "NumberLabels must be >= 2, got {}",
                self.num_labels
            )));
        }
        if !(self.mu.is_finite() && self.mu >= 0.0) {
            return Err(GraphCutError::InvalidParameter(format!(
                "Mu must be finite and >= 0, got {}",
                self.mu
            )));
        }
        self.smoothness.validate()
    }
}

/// Smoothness cost between neighbouring label indices `l1`, `l2` whose
/// intensities have similarity `s`.
pub fn pair_cost(l1: usize, l2: usize, s: f64, lambda: f64, mu: f64) -> f64 {
    if l1 == l2 {
        lambda * s
    } else if (l1 == 1 && l2 > 1) || (l1 > 1 && l2 == 1) {
        GC_INFINITY
    } else if (l1 == 0 && l2 > 1) || (l1 > 1 && l2 == 0) {
        lambda * s
    } else {
        lambda * (mu + s)
    }
}

#[derive(Clone, Copy)]
enum Fidelity<'a> {
    Constants { c0: f64, c1: f64 },
    Histograms(&'a IntensityDistributions),
}

impl Fidelity<'_> {
    fn cost(&self, v: f64, label: usize, max: f64) -> f64 {
        match self {
            Self::Constants { c0, c1 } => {
                let target = if label == 0 { *c0 } else { *c1 };
                (v / max - target).abs()
            }
            Self::Histograms(tables) => {
                let table = if label == 0 {
                    &tables.background
                } else {
                    &tables.foreground
                };
                let bin = v.clamp(0.0, max) as usize;
                1.0 - table.get(bin).copied().unwrap_or(0.0)
            }
        }
    }
}

fn segment<T: Sample>(
    image: &Volume<T>,
    prior: &Volume<i32>,
    options: &MultiLabelOptions,
    fidelity: Fidelity,
) -> GraphCutResult<Volume<i32>> {
    let map = LabelMap::from_prior(prior)?;
    let k = options.num_labels.min(map.len());
    if k < map.len() {
        log::warn!(
            "prior has {} labels, optimizing over the first {k}; the rest start as background",
            map.len()
        );
    }

    let max = max_intensity(image.bit_depth());
    let intensity: Vec<f64> = image.data().iter().map(|v| v.to_f64()).collect();
    let prior_index: Vec<usize> = prior
        .data()
        .iter()
        .map(|&v| map.index_of(v).unwrap_or(0))
        .collect();

    let (lambda, mu) = (options.smoothness.lambda, options.mu);
    let smoothness = options.smoothness;
    let smooth = |p: usize, q: usize, l1: usize, l2: usize| {
        let s = smoothness.similarity(intensity[p], intensity[q], max);
        pair_cost(l1, l2, s, lambda, mu)
    };
    let mut optimizer = GridOptimizer::new(image.dimensions(), k, smooth)?;
    optimizer.set_label_order(options.order);

    for (site, &from_prior) in prior_index.iter().enumerate() {
        let v = intensity[site];
        for label in 0..k {
            let cost = if label == 1 && from_prior != 1 {
                GC_INFINITY
            } else {
                let mismatch = if label == from_prior { 0.0 } else { mu };
                mismatch + fidelity.cost(v, label, max)
            };
            optimizer.set_data_cost(site, label, cost)?;
        }
        optimizer.set_label(site, if from_prior < k { from_prior } else { 0 })?;
    }

    let energy = optimizer.optimize(options.strategy, options.cycles)?;
    log::info!(
        "multi-label graph cut of {:?}: {k} labels, energy {energy:.6}",
        image.dimensions()
    );

    let labels: Vec<i32> = optimizer
        .labels()
        .iter()
        .map(|&l| map.value(l).unwrap_or(0))
        .collect();
    Ok(Volume::from_vec(
        prior.dimensions(),
        prior.bit_depth(),
        1,
        labels,
    )?)
}

fn check_inputs<T: Sample>(
    image: &Volume<T>,
    prior: &Volume<i32>,
    options: &MultiLabelOptions,
) -> GraphCutResult<()> {
    options.validate()?;
    check_single_channel(image)?;
    check_single_channel(prior)?;
    if image.dimensions() != prior.dimensions() {
        return Err(GraphCutError::ShapeMismatch {
            expected: image.dimensions().to_vec(),
            actual: prior.dimensions().to_vec(),
        });
    }
    Ok(())
}

/// Multi-label segmentation with fixed reference intensities.
///
/// Returns a label volume with the shape and bit depth of `prior`, holding
/// prior label values (0, 1 or a value of the prior).
///
/// # Errors
///
/// Invalid options, mismatched or multi-channel inputs, too many prior
/// labels, or an optimizer failure.
pub fn multilabel_graphcut<T: Sample>(
    image: &Volume<T>,
    prior: &Volume<i32>,
    options: &MultiLabelOptions,
) -> GraphCutResult<Volume<i32>> {
    check_inputs(image, prior, options)?;
    let fidelity = Fidelity::Constants {
        c0: options.c0,
        c1: options.c1,
    };
    segment(image, prior, options, fidelity)
}

/// Multi-label segmentation with intensity tables learned from the prior.
///
/// The foreground table is the intensity distribution inside all prior
/// objects, the background table the distribution outside them. `C0` and
/// `C1` are not used.
pub fn adaptive_multilabel_graphcut<T: Sample>(
    image: &Volume<T>,
    prior: &Volume<i32>,
    options: &MultiLabelOptions,
) -> GraphCutResult<Volume<i32>> {
    check_inputs(image, prior, options)?;
    let tables = IntensityDistributions::from_prior(image, prior)?;
    segment(image, prior, options, Fidelity::Histograms(&tables))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_map() {
        let prior = Volume::from_vec(&[3, 2], 16, 1, vec![7, -2, 0, 3, 7, 1]).unwrap();
        let map = LabelMap::from_prior(&prior).unwrap();
        assert_eq!(map.values(), &[0, 1, 3, 7]);
        assert_eq!(map.index_of(-2), Some(0));
        assert_eq!(map.index_of(7), Some(3));
        assert_eq!(map.index_of(5), None);
        assert_eq!(map.value(2), Some(3));
    }

    #[test]
    fn test_label_map_always_has_background_and_new() {
        let prior = Volume::from_vec(&[2, 1], 16, 1, vec![4, 4]).unwrap();
        assert_eq!(LabelMap::from_prior(&prior).unwrap().values(), &[0, 1, 4]);
    }

    #[test]
    fn test_too_many_labels() {
        let data: Vec<i32> = (0..MAX_LABELS as i32 + 2).collect();
        let n = data.len();
        let prior = Volume::from_vec(&[n, 1], 16, 1, data).unwrap();
        assert!(matches!(
            LabelMap::from_prior(&prior),
            Err(GraphCutError::TooManyLabels { .. })
        ));
    }

    #[test]
    fn test_pair_cost_cases() {
        let (s, lambda, mu) = (0.5, 2.0, 3.0);
        assert_eq!(pair_cost(2, 2, s, lambda, mu), 1.0);
        assert_eq!(pair_cost(1, 4, s, lambda, mu), GC_INFINITY);
        assert_eq!(pair_cost(4, 1, s, lambda, mu), GC_INFINITY);
        assert_eq!(pair_cost(0, 3, s, lambda, mu), 1.0);
        assert_eq!(pair_cost(0, 1, s, lambda, mu), 7.0);
        assert_eq!(pair_cost(2, 3, s, lambda, mu), 7.0);
    }

    #[test]
    fn test_options_from_params() {
        let params = Parameters::new()
            .with_integer("NumberLabels", 5)
            .with_double("C0", 0.2)
            .with_double("C1", 0.8)
            .with_double("Lambda", 0.5)
            .with_double("Sigma", 1.0)
            .with_double("Mu", 2.0)
            .with_integer("Cycles", -1)
            .with_integer("Strategy", 1)
            .with_integer("Seed", 42);
        let options = MultiLabelOptions::from_params(&params).unwrap();
        assert_eq!(options.num_labels, 5);
        assert_eq!((options.c0, options.c1, options.mu), (0.2, 0.8, 2.0));
        assert_eq!(options.cycles, None);
        assert_eq!(options.strategy, MoveStrategy::Expansion);
        assert_eq!(options.order, LabelOrder::Random(42));

        let adaptive = Parameters::new()
            .with_integer("NumberLabels", 1)
            .with_double("Lambda", 0.5)
            .with_double("Sigma", 1.0)
            .with_double("Mu", 2.0);
        assert!(matches!(
            MultiLabelOptions::adaptive_from_params(&adaptive),
            Err(GraphCutError::InvalidParameter(_))
        ));
        assert_eq!(
            MultiLabelOptions::from_params(&adaptive).unwrap_err(),
            GraphCutError::InvalidParameter("NumberLabels must be >= 2, got 1".into())
        );
    }

    #[test]
    fn test_prior_is_kept_when_it_fits() {
        // Dark background, bright object 5 matching the prior
        let image = Volume::<u8>::from_vec(&[4, 1], 8, 1, vec![0, 0, 250, 250]).unwrap();
        let prior = Volume::from_vec(&[4, 1], 16, 1, vec![0, 0, 5, 5]).unwrap();
        let labels = multilabel_graphcut(&image, &prior, &MultiLabelOptions::default()).unwrap();
        assert_eq!(labels.data(), &[0, 0, 5, 5]);
        assert_eq!(labels.bit_depth(), 16);
    }

    #[test]
    fn test_shape_mismatch() {
        let image = Volume::<u8>::new(&[4, 1], 8, 1).unwrap();
        let prior = Volume::<i32>::new(&[1, 4], 16, 1).unwrap();
        assert!(matches!(
            multilabel_graphcut(&image, &prior, &MultiLabelOptions::default()),
            Err(GraphCutError::ShapeMismatch { .. })
        ));
    }
}
