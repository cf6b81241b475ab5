//! Error types for elib-core
//!
//! Provides a unified error type for the volume, point and parameter
//! containers. Each variant captures enough context for diagnostics without
//! exposing internal implementation details.

use thiserror::Error;

use crate::point::Point;

/// elib-core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Only 2D and 3D volumes are supported
    #[error("unsupported rank: {0} (expected 2 or 3)")]
    InvalidRank(usize),

    /// A dimension is zero or the dimension count does not match the rank
    #[error("invalid volume dimensions: {0:?}")]
    InvalidDimension(Vec<usize>),

    /// Invalid bit depth
    #[error("invalid bit depth: {0} (expected 1..=32)")]
    InvalidBitDepth(u32),

    /// Invalid channel count
    #[error("invalid channel count: {0}")]
    InvalidChannels(usize),

    /// Sample buffer does not match `channels × Π(dimensions)`
    #[error("data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Two volumes that must share a shape do not
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Point lies outside the volume
    #[error("point {0} is outside the volume")]
    PointOutOfBounds(Point),

    /// Required parameter absent (or NaN)
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for elib-core operations
pub type Result<T> = std::result::Result<T, Error>;
