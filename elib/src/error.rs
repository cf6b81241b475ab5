//! Error types for the host layer

use elib_graphcut::GraphCutError;
use elib_region::RegionError;
use thiserror::Error;

/// Errors raised while converting host data or running an entry point
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    /// `rank` disagrees with the number of dimensions
    #[error("array of rank {rank} has {dimensions} dimensions")]
    RankMismatch { rank: usize, dimensions: usize },

    /// A host value does not fit the sample type of the volume
    #[error("value {0} out of range for a 32-bit integer volume")]
    ValueOutOfRange(i64),

    /// A parameter is present but out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Core library error
    #[error("{0}")]
    Core(#[from] elib_core::Error),

    /// Region library error
    #[error("{0}")]
    Region(#[from] RegionError),

    /// Segmentation error
    #[error("{0}")]
    GraphCut(#[from] GraphCutError),
}

/// Result type alias for host-layer operations
pub type HostResult<T> = std::result::Result<T, HostError>;
