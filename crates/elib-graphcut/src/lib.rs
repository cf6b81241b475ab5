//! elib-graphcut - Graph-cut segmentation
//!
//! This crate provides:
//!
//! - **Min-cut solver** ([`maxflow`], [`energy`]): Dinic max-flow and binary
//!   pairwise energies built on it
//! - **Binary segmentation** ([`binary`]): foreground/background graph cut
//!   with reference intensities or intensity tables
//! - **Multi-label segmentation** ([`multilabel`]): refinement of a prior
//!   label volume by alpha-beta swap or alpha expansion
//! - **Evaluation** ([`evaluation`]): energies and object-level scores of
//!   existing labellings
//! - **Mesh graph cut** ([`mesh`]): binary cut over a vertex graph
//!
//! # Example
//!
//! ```
//! use elib_core::{Parameters, Volume};
//! use elib_graphcut::{BinaryOptions, ErrorKind, graphcut};
//!
//! let image = Volume::<u8>::from_vec(&[2, 2], 8, 1, vec![0, 255, 0, 255]).unwrap();
//!
//! let mut params = Parameters::new();
//! params.add_double("C0", 0.0);
//! params.add_double("C1", 1.0);
//! params.add_double("Lambda", 0.5);
//! let err = BinaryOptions::from_params(&params).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ConfigMissing);
//!
//! params.add_double("Sigma", 1.0);
//! let options = BinaryOptions::from_params(&params).unwrap();
//! assert_eq!(graphcut(&image, &options).unwrap().data(), &[0, 1, 0, 1]);
//! ```

pub mod binary;
mod config;
pub mod energy;
pub mod error;
pub mod evaluation;
pub mod maxflow;
pub mod mesh;
pub mod multilabel;

/// Cost standing in for "forbidden" in data and smoothness terms.
pub const GC_INFINITY: f64 = 300000.0;

pub use binary::{BinaryEnergyModel, BinaryOptions, graphcut, graphcut_with_histograms};
pub use config::Smoothness;
pub use energy::{Energy, Var};
pub use error::{ErrorKind, GraphCutError, GraphCutResult};
pub use evaluation::{binary_energy, segmentation_error};
pub use maxflow::{FlowGraph, NodeId, Segment};
pub use mesh::{Mesh, MeshOptions, mesh_graphcut};
pub use multilabel::{
    GridOptimizer, LabelMap, LabelOrder, MAX_LABELS, MoveStrategy, MultiLabelOptions, SmoothCost,
    adaptive_multilabel_graphcut, multilabel_graphcut, pair_cost,
};
