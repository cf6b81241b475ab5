//! Parameter-bag lookups shared by the segmenters

use crate::error::{GraphCutError, GraphCutResult};
use elib_core::Parameters;

/// Required double; missing and NaN values are both reported as missing.
pub(crate) fn required_double(params: &Parameters, name: &str) -> GraphCutResult<f64> {
    params
        .get_double(name)
        .ok_or_else(|| GraphCutError::MissingParameter(name.to_string()))
}

pub(crate) fn required_integer(params: &Parameters, name: &str) -> GraphCutResult<i64> {
    params
        .get_integer(name)
        .ok_or_else(|| GraphCutError::MissingParameter(name.to_string()))
}

/// Pairwise smoothness weight and intensity scale.
///
/// The similarity of two intensities `a`, `b` is
/// `exp(−((a − b)/max)² / σ)`, 1 for equal intensities and falling towards
/// 0 as they differ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoothness {
    /// Weight of the pairwise term (`Lambda`)
    pub lambda: f64,
    /// Intensity scale of the similarity (`Sigma`), must be > 0
    pub sigma: f64,
}

impl Default for Smoothness {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            sigma: 1.0,
        }
    }
}

impl Smoothness {
    pub fn new(lambda: f64, sigma: f64) -> Self {
        Self { lambda, sigma }
    }

    /// Read `Lambda` and `Sigma`.
    ///
    /// # Errors
    ///
    /// [`GraphCutError::MissingParameter`] if either is absent or NaN,
    /// [`GraphCutError::InvalidParameter`] if out of range.
    pub fn from_params(params: &Parameters) -> GraphCutResult<Self> {
        let smoothness = Self {
            lambda: required_double(params, "Lambda")?,
            sigma: required_double(params, "Sigma")?,
        };
        smoothness.validate()?;
        Ok(smoothness)
    }

    /// Check `λ ≥ 0` and `σ > 0`, both finite.
    pub fn validate(&self) -> GraphCutResult<()> {
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(GraphCutError::InvalidParameter(format!(
                "Lambda must be finite and >= 0, got {}",
                self.lambda
            )));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(GraphCutError::InvalidParameter(format!(
                "Sigma must be finite and > 0, got {}",
                self.sigma
            )));
        }
        Ok(())
    }

    /// Intensity similarity of `a` and `b` on a `0..=max` scale.
    #[inline]
    pub fn similarity(&self, a: f64, b: f64, max: f64) -> f64 {
        let d = (a - b) / max;
        (-(d * d) / self.sigma).exp()
    }
}

/// Largest sample value of a `bit_depth`-bit volume.
#[inline]
pub(crate) fn max_intensity(bit_depth: u32) -> f64 {
    ((1u64 << bit_depth) - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_nan() {
        let params = Parameters::new()
            .with_double("Lambda", 0.5)
            .with_double("Sigma", f64::NAN);
        assert_eq!(
            Smoothness::from_params(&params),
            Err(GraphCutError::MissingParameter("Sigma".into()))
        );
    }

    #[test]
    fn test_zero_is_present() {
        let params = Parameters::new()
            .with_double("Lambda", 0.0)
            .with_double("Sigma", 2.0);
        assert_eq!(
            Smoothness::from_params(&params).unwrap(),
            Smoothness::new(0.0, 2.0)
        );
        let bad = Parameters::new()
            .with_double("Lambda", 0.0)
            .with_double("Sigma", 0.0);
        assert!(matches!(
            Smoothness::from_params(&bad),
            Err(GraphCutError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_similarity() {
        let s = Smoothness::new(1.0, 1.0);
        assert_eq!(s.similarity(7.0, 7.0, 255.0), 1.0);
        assert!((s.similarity(0.0, 255.0, 255.0) - (-1.0f64).exp()).abs() < 1e-12);
        assert_eq!(max_intensity(8), 255.0);
        assert_eq!(max_intensity(1), 1.0);
    }
}
