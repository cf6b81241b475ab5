//! Move-making optimizer for multi-label grid energies
//!
//! Minimizes
//!
//! ```text
//! E(l) = Σ_p D(p, l_p) + Σ_(p,q) V(p, q, l_p, l_q)
//! ```
//!
//! over a 2D (4-neighbourhood) or 3D (6-neighbourhood) grid of sites, with a
//! dense data-cost table `D` and a smoothness callback `V`. Each move solves
//! a binary sub-problem exactly with one cut:
//!
//! - **alpha-beta swap**: sites labelled α or β may exchange labels.
//!   Requires `V(α,β) + V(β,α) ≥ V(α,α) + V(β,β)` for every pair.
//! - **alpha expansion**: any site may switch to α. A pair term violating
//!   `V(l_p,α) + V(α,l_q) ≥ V(l_p,l_q) + V(α,α)` is truncated: the excess is
//!   added to the two mixed entries, which leaves the cost of the current
//!   labelling unchanged and never undercuts the true energy, so the move
//!   still cannot raise it.
//!
//! A move is kept only if it lowers the total energy. A cycle visits every
//! label (pair); optimization stops after a cycle without improvement or
//! after the requested number of cycles.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::energy::{Energy, Var};
use crate::error::{GraphCutError, GraphCutResult};
use elib_core::{ScanPoints, linear_index};
use elib_region::{Connectivity, forward_half, neighbourhood};

/// Smoothness cost `V(p, q, l_p, l_q)` of neighbouring sites `p`, `q`.
pub trait SmoothCost {
    fn cost(&self, p: usize, q: usize, lp: usize, lq: usize) -> f64;
}

impl<F> SmoothCost for F
where
    F: Fn(usize, usize, usize, usize) -> f64,
{
    #[inline]
    fn cost(&self, p: usize, q: usize, lp: usize, lq: usize) -> f64 {
        self(p, q, lp, lq)
    }
}

/// Order in which labels are visited within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelOrder {
    /// 0, 1, …, K−1
    #[default]
    Sequential,
    /// A fresh permutation every cycle, from an RNG seeded once per run
    Random(u64),
}

/// Move type used by [`GridOptimizer::optimize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveStrategy {
    #[default]
    Swap,
    Expansion,
}

const NO_VAR: usize = usize::MAX;

/// Relative tolerance for accepting a move.
const IMPROVEMENT_TOL: f64 = 1e-9;

/// Largest data-cost table (sites × labels) an optimizer allocates.
pub const MAX_TABLE_ENTRIES: usize = 1 << 28;

/// Multi-label optimizer over a regular grid.
pub struct GridOptimizer<S: SmoothCost> {
    num_labels: usize,
    labels: Vec<usize>,
    data_cost: Vec<f64>,
    edges: Vec<(usize, usize)>,
    smooth: S,
    order: LabelOrder,
}

impl<S: SmoothCost> GridOptimizer<S> {
    /// Create an optimizer for a grid of `dimensions` with `num_labels`
    /// labels. All sites start at label 0 with zero data cost.
    ///
    /// # Errors
    ///
    /// Returns [`GraphCutError::InvalidParameter`] for a rank other than 2
    /// or 3, an empty axis, or zero labels, and
    /// [`GraphCutError::TooManyLabels`] when the data-cost table would hold
    /// more than [`MAX_TABLE_ENTRIES`] entries.
    pub fn new(dimensions: &[usize], num_labels: usize, smooth: S) -> GraphCutResult<Self> {
        if !(2..=3).contains(&dimensions.len()) || dimensions.contains(&0) {
            return Err(GraphCutError::InvalidParameter(format!(
                "grid dimensions {dimensions:?}"
            )));
        }
        if num_labels == 0 {
            return Err(GraphCutError::InvalidParameter(
                "optimizer needs at least one label".to_string(),
            ));
        }
        let sites = dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| {
                GraphCutError::InvalidParameter(format!("grid dimensions {dimensions:?}"))
            })?;
        let entries = sites
            .checked_mul(num_labels)
            .filter(|&n| n <= MAX_TABLE_ENTRIES)
            .ok_or(GraphCutError::TooManyLabels {
                count: num_labels,
                max: (MAX_TABLE_ENTRIES / sites).max(1),
            })?;
        let offsets = forward_half(neighbourhood(dimensions.len(), Connectivity::Small));
        let mut edges = Vec::with_capacity(sites * offsets.len());
        for (p, point) in ScanPoints::new(dimensions).enumerate() {
            for off in &offsets {
                if let Some(q) = linear_index(dimensions, &(point + *off)) {
                    edges.push((p, q));
                }
            }
        }
        Ok(Self {
            num_labels,
            labels: vec![0; sites],
            data_cost: vec![0.0; entries],
            edges,
            smooth,
            order: LabelOrder::Sequential,
        })
    }

    pub fn num_sites(&self) -> usize {
        self.labels.len()
    }

    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Neighbouring site pairs, each once.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn set_label_order(&mut self, order: LabelOrder) {
        self.order = order;
    }

    fn check_site_label(&self, site: usize, label: usize) -> GraphCutResult<()> {
        if site >= self.num_sites() || label >= self.num_labels {
            return Err(GraphCutError::InvalidParameter(format!(
                "site {site} / label {label} outside {} sites × {} labels",
                self.num_sites(),
                self.num_labels
            )));
        }
        Ok(())
    }

    /// Set `D(site, label)`.
    ///
    /// # Errors
    ///
    /// Out-of-range site or label, or a non-finite cost
    /// ([`GraphCutError::Solver`]).
    pub fn set_data_cost(&mut self, site: usize, label: usize, cost: f64) -> GraphCutResult<()> {
        self.check_site_label(site, label)?;
        if !cost.is_finite() {
            return Err(GraphCutError::Solver(format!(
                "non-finite data cost {cost} at site {site}, label {label}"
            )));
        }
        self.data_cost[site * self.num_labels + label] = cost;
        Ok(())
    }

    #[inline]
    pub fn data_cost(&self, site: usize, label: usize) -> f64 {
        self.data_cost[site * self.num_labels + label]
    }

    /// Set the current label of `site` (the starting point of optimization).
    pub fn set_label(&mut self, site: usize, label: usize) -> GraphCutResult<()> {
        self.check_site_label(site, label)?;
        self.labels[site] = label;
        Ok(())
    }

    #[inline]
    pub fn label(&self, site: usize) -> usize {
        self.labels[site]
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    fn smooth_cost(&self, p: usize, q: usize, lp: usize, lq: usize) -> GraphCutResult<f64> {
        let v = self.smooth.cost(p, q, lp, lq);
        if !v.is_finite() {
            return Err(GraphCutError::Solver(format!(
                "non-finite smoothness cost {v} between sites {p} and {q}"
            )));
        }
        Ok(v)
    }

    fn data_energy_of(&self, labels: &[usize]) -> f64 {
        labels
            .iter()
            .enumerate()
            .map(|(site, &l)| self.data_cost(site, l))
            .sum()
    }

    fn smooth_energy_of(&self, labels: &[usize]) -> f64 {
        self.edges
            .iter()
            .map(|&(p, q)| self.smooth.cost(p, q, labels[p], labels[q]))
            .sum()
    }

    pub fn data_energy(&self) -> f64 {
        self.data_energy_of(&self.labels)
    }

    pub fn smooth_energy(&self) -> f64 {
        self.smooth_energy_of(&self.labels)
    }

    /// Total energy of the current labelling.
    pub fn energy(&self) -> f64 {
        self.data_energy() + self.smooth_energy()
    }

    /// Run alpha-beta swap. `None` runs to convergence.
    pub fn swap(&mut self, cycles: Option<usize>) -> GraphCutResult<f64> {
        self.optimize(MoveStrategy::Swap, cycles)
    }

    /// Run alpha expansion. `None` runs to convergence.
    pub fn expansion(&mut self, cycles: Option<usize>) -> GraphCutResult<f64> {
        self.optimize(MoveStrategy::Expansion, cycles)
    }

    /// Run moves of `strategy` for at most `cycles` cycles and return the
    /// final energy.
    ///
    /// # Errors
    ///
    /// [`GraphCutError::Solver`] if the energy is not finite,
    /// [`GraphCutError::NonSubmodular`] if a swap move cannot be
    /// represented by a cut. The labelling is left at the last accepted
    /// move.
    pub fn optimize(
        &mut self,
        strategy: MoveStrategy,
        cycles: Option<usize>,
    ) -> GraphCutResult<f64> {
        let mut energy = self.energy();
        if !energy.is_finite() {
            return Err(GraphCutError::Solver(format!(
                "initial energy is not finite ({energy})"
            )));
        }
        let mut rng = match self.order {
            LabelOrder::Random(seed) => Some(StdRng::seed_from_u64(seed)),
            LabelOrder::Sequential => None,
        };
        let max_cycles = cycles.unwrap_or(usize::MAX);
        let mut order: Vec<usize> = (0..self.num_labels).collect();

        let mut cycle = 0;
        while cycle < max_cycles {
            cycle += 1;
            if let Some(rng) = rng.as_mut() {
                order.shuffle(rng);
            }
            let start = energy;
            match strategy {
                MoveStrategy::Swap => {
                    for a in 0..order.len() {
                        for b in a + 1..order.len() {
                            energy = self.swap_move(order[a], order[b], energy)?;
                        }
                    }
                }
                MoveStrategy::Expansion => {
                    for &alpha in &order {
                        energy = self.expansion_move(alpha, energy)?;
                    }
                }
            }
            log::debug!("{strategy:?} cycle {cycle}: energy {start} -> {energy}");
            if energy >= start {
                break;
            }
        }
        log::info!(
            "{strategy:?} over {} sites, {} labels: energy {energy} after {cycle} cycles",
            self.num_sites(),
            self.num_labels
        );
        Ok(energy)
    }

    /// Keep `candidate` if it lowers `current`; return the resulting energy.
    fn accept(&mut self, candidate: Vec<usize>, current: f64) -> f64 {
        let energy = self.data_energy_of(&candidate) + self.smooth_energy_of(&candidate);
        if energy < current - IMPROVEMENT_TOL * current.abs().max(1.0) {
            self.labels = candidate;
            energy
        } else {
            current
        }
    }

    /// Sites labelled α take x = 0, sites labelled β take x = 1.
    fn swap_move(&mut self, alpha: usize, beta: usize, current: f64) -> GraphCutResult<f64> {
        let mut var = vec![NO_VAR; self.num_sites()];
        let mut e = Energy::new();
        for (site, &l) in self.labels.iter().enumerate() {
            if l == alpha || l == beta {
                let x = e.add_variable();
                var[site] = x;
                e.add_term1(x, self.data_cost(site, alpha), self.data_cost(site, beta));
            }
        }
        if e.variable_count() == 0 {
            return Ok(current);
        }

        for &(p, q) in &self.edges {
            let (lp, lq) = (self.labels[p], self.labels[q]);
            match (var[p], var[q]) {
                (NO_VAR, NO_VAR) => {}
                (xp, NO_VAR) => {
                    let e0 = self.smooth_cost(p, q, alpha, lq)?;
                    let e1 = self.smooth_cost(p, q, beta, lq)?;
                    e.add_term1(xp, e0, e1);
                }
                (NO_VAR, xq) => {
                    let e0 = self.smooth_cost(p, q, lp, alpha)?;
                    let e1 = self.smooth_cost(p, q, lp, beta)?;
                    e.add_term1(xq, e0, e1);
                }
                (xp, xq) => {
                    let terms = self.pair_terms((p, q), [alpha, beta], [alpha, beta])?;
                    add_pair(&mut e, (xp, xq), terms)?
                }
            }
        }
        e.minimize();
        let candidate = self.read_move(&e, &var, |_, x| if x == 0 { alpha } else { beta });
        Ok(self.accept(candidate, current))
    }

    /// Sites keep their label with x = 0 and switch to α with x = 1.
    fn expansion_move(&mut self, alpha: usize, current: f64) -> GraphCutResult<f64> {
        let mut var = vec![NO_VAR; self.num_sites()];
        let mut e = Energy::new();
        for (site, &l) in self.labels.iter().enumerate() {
            if l != alpha {
                let x = e.add_variable();
                var[site] = x;
                e.add_term1(x, self.data_cost(site, l), self.data_cost(site, alpha));
            }
        }
        if e.variable_count() == 0 {
            return Ok(current);
        }

        for &(p, q) in &self.edges {
            let (lp, lq) = (self.labels[p], self.labels[q]);
            match (var[p], var[q]) {
                (NO_VAR, NO_VAR) => {}
                (xp, NO_VAR) => {
                    let e0 = self.smooth_cost(p, q, lp, alpha)?;
                    let e1 = self.smooth_cost(p, q, alpha, alpha)?;
                    e.add_term1(xp, e0, e1);
                }
                (NO_VAR, xq) => {
                    let e0 = self.smooth_cost(p, q, alpha, lq)?;
                    let e1 = self.smooth_cost(p, q, alpha, alpha)?;
                    e.add_term1(xq, e0, e1);
                }
                (xp, xq) => {
                    let terms = self.pair_terms((p, q), [lp, alpha], [lq, alpha])?;
                    add_pair(&mut e, (xp, xq), truncate(terms))?
                }
            }
        }
        e.minimize();
        let candidate = self.read_move(&e, &var, |l, x| if x == 0 { l } else { alpha });
        Ok(self.accept(candidate, current))
    }

    /// `[E00, E01, E10, E11]` of the pair `(p, q)`; `lp[x]` / `lq[x]` is the
    /// label the site takes for variable value `x`.
    fn pair_terms(
        &self,
        (p, q): (usize, usize),
        lp: [usize; 2],
        lq: [usize; 2],
    ) -> GraphCutResult<[f64; 4]> {
        Ok([
            self.smooth_cost(p, q, lp[0], lq[0])?,
            self.smooth_cost(p, q, lp[0], lq[1])?,
            self.smooth_cost(p, q, lp[1], lq[0])?,
            self.smooth_cost(p, q, lp[1], lq[1])?,
        ])
    }

    /// Labelling after a move: `relabel(current, x)` for sites with a
    /// variable, the current label otherwise.
    fn read_move<F>(&self, e: &Energy, var: &[usize], relabel: F) -> Vec<usize>
    where
        F: Fn(usize, u8) -> usize,
    {
        self.labels
            .iter()
            .zip(var)
            .map(|(&l, &x)| if x == NO_VAR { l } else { relabel(l, e.value(x)) })
            .collect()
    }
}

fn add_pair(
    e: &mut Energy,
    (xp, xq): (Var, Var),
    [e00, e01, e10, e11]: [f64; 4],
) -> GraphCutResult<()> {
    e.add_term2(xp, xq, e00, e01, e10, e11)
}

/// Raise `E01` and `E10` until the term is submodular. `E00` (both sites
/// keep their label) is never changed.
fn truncate([e00, e01, e10, e11]: [f64; 4]) -> [f64; 4] {
    let excess = e00 + e11 - e01 - e10;
    if excess > 0.0 {
        [e00, e01 + excess / 2.0, e10 + excess / 2.0, e11]
    } else {
        [e00, e01, e10, e11]
    }
}
