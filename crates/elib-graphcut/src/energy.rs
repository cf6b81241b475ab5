//! Binary pairwise energies minimized by a single cut
//!
//! An [`Energy`] is a sum of constant, unary and pairwise terms over 0/1
//! variables:
//!
//! ```text
//! E(x) = const + Σ E_i(x_i) + Σ E_ij(x_i, x_j)
//! ```
//!
//! It is exactly minimizable when every pairwise term is submodular,
//! `E(0,1) + E(1,0) >= E(0,0) + E(1,1)`. Variables with value 0 end on the
//! source side of the cut, variables with value 1 on the sink side.
//!
//! # Example
//!
//! ```
//! use elib_graphcut::Energy;
//!
//! let mut e = Energy::new();
//! let x = e.add_variable();
//! let y = e.add_variable();
//! e.add_term1(x, 0.0, 5.0); // x prefers 0
//! e.add_term1(y, 4.0, 0.0); // y prefers 1
//! e.add_term2(x, y, 0.0, 1.0, 1.0, 0.0).unwrap();
//! assert_eq!(e.minimize(), 1.0);
//! assert_eq!((e.value(x), e.value(y)), (0, 1));
//! ```

use crate::error::{GraphCutError, GraphCutResult};
use crate::maxflow::{EPS, FlowGraph, NodeId, Segment};

/// Variable handle
pub type Var = NodeId;

/// Binary energy with a cut-based minimizer.
#[derive(Debug, Clone, Default)]
pub struct Energy {
    graph: FlowGraph,
    constant: f64,
}

impl Energy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an energy with room for `variables` variables and `terms`
    /// pairwise terms.
    pub fn with_capacity(variables: usize, terms: usize) -> Self {
        Self {
            graph: FlowGraph::with_capacity(variables, terms),
            constant: 0.0,
        }
    }

    pub fn add_variable(&mut self) -> Var {
        self.graph.add_node()
    }

    pub fn variable_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn add_constant(&mut self, e: f64) {
        self.constant += e;
    }

    /// Add `E(x = 0) = e0`, `E(x = 1) = e1`.
    pub fn add_term1(&mut self, x: Var, e0: f64, e1: f64) {
        self.graph.add_tweights(x, e1, e0);
    }

    /// Add a pairwise term with `E(x, y)` given by `e00`, `e01`, `e10`, `e11`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphCutError::NonSubmodular`] if
    /// `e01 + e10 < e00 + e11` (beyond rounding).
    pub fn add_term2(
        &mut self,
        x: Var,
        y: Var,
        e00: f64,
        e01: f64,
        e10: f64,
        e11: f64,
    ) -> GraphCutResult<()> {
        // E = [e00 e00; e11 e11] + [0, e01-e00; e10-e11, 0]
        let b = e01 - e00;
        let c = e10 - e11;
        if b + c < -EPS * (1.0 + e00.abs() + e11.abs()) {
            return Err(GraphCutError::NonSubmodular { e00, e01, e10, e11 });
        }
        self.graph.add_tweights(x, e11, e00);

        if b < 0.0 {
            // [b b; 0 0] + [-b 0; -b 0] + [0 0; b+c 0]
            self.graph.add_tweights(x, 0.0, b);
            self.graph.add_tweights(y, 0.0, -b);
            self.graph.add_edge(x, y, 0.0, (b + c).max(0.0));
        } else if c < 0.0 {
            self.graph.add_tweights(x, 0.0, -c);
            self.graph.add_tweights(y, 0.0, c);
            self.graph.add_edge(x, y, (b + c).max(0.0), 0.0);
        } else {
            self.graph.add_edge(x, y, b, c);
        }
        Ok(())
    }

    /// Minimize and return the minimum energy.
    pub fn minimize(&mut self) -> f64 {
        self.constant + self.graph.maxflow()
    }

    /// Value (0 or 1) of `x` in the minimizer found by
    /// [`Energy::minimize`].
    pub fn value(&self, x: Var) -> u8 {
        match self.graph.segment(x) {
            Segment::Source => 0,
            Segment::Sink => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exhaustive minimum of a small energy given as closures
    fn brute_force(n: usize, eval: impl Fn(&[u8]) -> f64) -> f64 {
        (0..1u32 << n)
            .map(|bits| {
                let x: Vec<u8> = (0..n).map(|i| ((bits >> i) & 1) as u8).collect();
                eval(&x)
            })
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_unary_only() {
        let mut e = Energy::new();
        let x = e.add_variable();
        e.add_term1(x, 2.0, 7.0);
        e.add_constant(1.0);
        assert!((e.minimize() - 3.0).abs() < 1e-9);
        assert_eq!(e.value(x), 0);
    }

    #[test]
    fn test_general_submodular_term() {
        // Non-symmetric term exercising both reparameterization branches
        let unary = [(1.0, 3.0), (2.5, 0.5), (0.0, 1.0)];
        let pairs = [(0, 1, 4.0, 1.0, 7.0, 2.0), (1, 2, 0.0, 5.0, -1.0, 1.0)];

        let mut e = Energy::new();
        let vars: Vec<Var> = (0..3).map(|_| e.add_variable()).collect();
        for (i, &(e0, e1)) in unary.iter().enumerate() {
            e.add_term1(vars[i], e0, e1);
        }
        for &(i, j, a, b, c, d) in &pairs {
            e.add_term2(vars[i], vars[j], a, b, c, d).unwrap();
        }
        let min = e.minimize();

        let eval = |x: &[u8]| {
            let mut total = 0.0;
            for (i, &(e0, e1)) in unary.iter().enumerate() {
                total += if x[i] == 0 { e0 } else { e1 };
            }
            for &(i, j, a, b, c, d) in &pairs {
                total += match (x[i], x[j]) {
                    (0, 0) => a,
                    (0, 1) => b,
                    (1, 0) => c,
                    _ => d,
                };
            }
            total
        };
        assert!((min - brute_force(3, eval)).abs() < 1e-9);

        let found: Vec<u8> = vars.iter().map(|&v| e.value(v)).collect();
        assert!((eval(&found) - min).abs() < 1e-9);
    }

    #[test]
    fn test_non_submodular_rejected() {
        let mut e = Energy::new();
        let x = e.add_variable();
        let y = e.add_variable();
        assert!(matches!(
            e.add_term2(x, y, 1.0, 0.0, 0.0, 1.0),
            Err(GraphCutError::NonSubmodular { .. })
        ));
    }
}
