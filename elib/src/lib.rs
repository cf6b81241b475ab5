//! elib - Volume segmentation toolkit
//!
//! Graph-cut segmentation of 2D and 3D volumes plus the region model used
//! to inspect the result:
//!
//! - Binary and multi-label graph cuts ([`graphcut`])
//! - Connected components, masks and measurements ([`region`])
//! - Host-environment entry points taking flat arrays and parameter bags
//!   ([`host`])
//!
//! # Example
//!
//! ```
//! use elib::{Parameters, Volume};
//! use elib::graphcut::{BinaryOptions, graphcut};
//! use elib::region::{ComponentOptions, label_components};
//!
//! let image = Volume::<u8>::from_vec(&[4, 1], 8, 1, vec![250, 10, 240, 230]).unwrap();
//! let params = Parameters::new()
//!     .with_double("C0", 0.0)
//!     .with_double("C1", 1.0)
//!     .with_double("Lambda", 0.1)
//!     .with_double("Sigma", 1.0);
//! let binary = graphcut(&image, &BinaryOptions::from_params(&params).unwrap()).unwrap();
//! let labels = label_components(&binary, &ComponentOptions::default()).unwrap();
//! assert_eq!(labels.data(), &[1, 0, 2, 2]);
//! ```

pub mod error;
pub mod host;

pub use elib_core::*;

pub use elib_graphcut as graphcut;
pub use elib_region as region;

pub use error::{HostError, HostResult};
