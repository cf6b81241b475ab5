//! Error types for elib-region

use elib_core::Point;
use thiserror::Error;

/// Errors that can occur during region operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] elib_core::Error),

    /// A mask point lies outside the declared dimensions
    #[error("point {point} outside dimensions {dimensions:?}")]
    PointOutOfBounds {
        point: Point,
        dimensions: Vec<usize>,
    },

    /// Operation not available for this rank
    #[error("unsupported rank: {operation} requires rank {expected}, got {actual}")]
    UnsupportedRank {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Only single-channel volumes are accepted
    #[error("unsupported channel count: expected 1, got {0}")]
    UnsupportedChannels(usize),

    /// Two inputs that must share a shape do not
    #[error("shape mismatch: {expected:?} vs {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
