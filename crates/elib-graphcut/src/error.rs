//! Error types for elib-graphcut

use elib_region::RegionError;
use thiserror::Error;

/// Coarse classification of a segmentation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required configuration is missing or invalid
    ConfigMissing,
    /// Inputs have incompatible or unsupported shapes
    ShapeMismatch,
    /// The optimizer could not produce a labelling
    SolverFailure,
}

/// Errors that can occur during graph-cut segmentation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphCutError {
    /// A required parameter is absent (or NaN)
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// A parameter is present but out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A probability table has the wrong number of entries
    #[error("{table} histogram has {actual} entries, expected {expected}")]
    HistogramLength {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Two inputs that must share a shape do not
    #[error("shape mismatch: {expected:?} vs {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The label space is larger than the optimizer supports
    #[error("too many labels: {count} (at most {max})")]
    TooManyLabels { count: usize, max: usize },

    /// A pairwise term cannot be represented by a cut
    #[error("non-submodular term: E00 {e00} + E11 {e11} > E01 {e01} + E10 {e10}")]
    NonSubmodular {
        e00: f64,
        e01: f64,
        e10: f64,
        e11: f64,
    },

    /// Optimizer failure
    #[error("solver failure: {0}")]
    Solver(String),

    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] elib_core::Error),

    /// Region library error
    #[error("region error: {0}")]
    Region(#[from] RegionError),
}

impl GraphCutError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter(_)
            | Self::InvalidParameter(_)
            | Self::HistogramLength { .. }
            | Self::TooManyLabels { .. } => ErrorKind::ConfigMissing,
            Self::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            Self::NonSubmodular { .. } | Self::Solver(_) => ErrorKind::SolverFailure,
            Self::Core(e) => core_kind(e),
            Self::Region(e) => region_kind(e),
        }
    }
}

fn core_kind(e: &elib_core::Error) -> ErrorKind {
    match e {
        elib_core::Error::MissingParameter(_) | elib_core::Error::InvalidParameter(_) => {
            ErrorKind::ConfigMissing
        }
        _ => ErrorKind::ShapeMismatch,
    }
}

fn region_kind(e: &RegionError) -> ErrorKind {
    match e {
        RegionError::Core(inner) => core_kind(inner),
        RegionError::InvalidParameters(_) => ErrorKind::ConfigMissing,
        _ => ErrorKind::ShapeMismatch,
    }
}

/// Result type for graph-cut operations
pub type GraphCutResult<T> = Result<T, GraphCutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            GraphCutError::MissingParameter("Sigma".into()).kind(),
            ErrorKind::ConfigMissing
        );
        assert_eq!(
            GraphCutError::Solver("x".into()).kind(),
            ErrorKind::SolverFailure
        );
        let shape: GraphCutError = elib_core::Error::InvalidRank(4).into();
        assert_eq!(shape.kind(), ErrorKind::ShapeMismatch);
        let region: GraphCutError = RegionError::UnsupportedChannels(3).into();
        assert_eq!(region.kind(), ErrorKind::ShapeMismatch);
    }
}
