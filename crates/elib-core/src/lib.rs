//! elib Core - Basic data structures for volume segmentation
//!
//! This crate provides the fundamental data structures used throughout the
//! elib workspace:
//!
//! - [`Volume`] - Dense 2D/3D sample container (integer or floating)
//! - [`Point`] - Integer voxel coordinate
//! - [`BoundingBox`] - Inclusive axis-aligned box
//! - [`Parameters`] / [`IntTensor`] - String-keyed configuration bag

pub mod bbox;
pub mod error;
pub mod params;
pub mod point;
pub mod volume;

pub use bbox::BoundingBox;
pub use error::{Error, Result};
pub use params::{IntTensor, Parameters};
pub use point::Point;
pub use volume::{LABEL_BIT_DEPTH, Sample, ScanPoints, Volume, contains_point, linear_index};
