//! Failures recorded by the regression harness

use thiserror::Error;

/// One failed check, or an I/O problem with golden files
#[derive(Debug, Error)]
pub enum TestError {
    /// A boolean check was false
    #[error("check {index} failed: {what}")]
    Check { index: usize, what: String },

    /// Two numbers differ by more than the tolerance (NaN never matches)
    #[error("check {index}: expected {expected}, got {actual} (delta {delta})")]
    Value {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Two volumes differ in dimensions or channel count
    #[error("check {index}: volume shape {expected:?} vs {actual:?}")]
    VolumeShape {
        index: usize,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Two volumes of the same shape differ at a voxel
    #[error("check {index}: first differing sample at {at}: {expected} vs {actual}")]
    VolumeSample {
        index: usize,
        at: String,
        expected: String,
        actual: String,
    },

    /// Two byte strings differ
    #[error("check {index}: strings differ ({expected:?} vs {actual:?})")]
    Text {
        index: usize,
        expected: String,
        actual: String,
    },

    /// Regression output differs from its golden file
    #[error("check {index}: {output} differs from {golden}")]
    Golden {
        index: usize,
        output: String,
        golden: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for harness operations
pub type TestResult<T> = Result<T, TestError>;
