//! Parameters - string-keyed configuration bag
//!
//! Host environments hand configuration to the algorithms as a bag of named
//! integers, doubles and integer tensors. A lookup that fails (missing key,
//! or a double that is NaN) yields `None`, which is never confused with a
//! stored zero.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Dense integer tensor stored in a [`Parameters`] bag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntTensor {
    dimensions: Vec<usize>,
    data: Vec<i64>,
}

impl IntTensor {
    /// Create a tensor from its dimensions and row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `data.len()` differs from the
    /// product of `dimensions`.
    pub fn new(dimensions: Vec<usize>, data: Vec<i64>) -> Result<Self> {
        let expected: usize = dimensions.iter().product();
        if expected != data.len() {
            return Err(Error::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dimensions, data })
    }

    /// Rank-1 tensor holding `data`.
    pub fn from_slice(data: &[i64]) -> Self {
        Self {
            dimensions: vec![data.len()],
            data: data.to_vec(),
        }
    }

    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    pub fn data(&self) -> &[i64] {
        &self.data
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }
}

/// String-keyed bag of scalar and tensor parameters.
///
/// Adding a key that already exists keeps the first value and reports
/// `false`, so a parameter cannot be silently overwritten.
///
/// # Examples
///
/// ```
/// use elib_core::Parameters;
///
/// let mut params = Parameters::new();
/// params.add_double("C0", 0.0);
/// params.add_double("Sigma", f64::NAN);
/// assert_eq!(params.get_double("C0"), Some(0.0));
/// assert_eq!(params.get_double("Sigma"), None);
/// assert!(params.require_double("Lambda").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    integers: HashMap<String, i64>,
    doubles: HashMap<String, f64>,
    tensors: HashMap<String, IntTensor>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an integer parameter. Returns `false` if the key already exists.
    pub fn add_integer(&mut self, name: &str, value: i64) -> bool {
        insert_new(&mut self.integers, name, value)
    }

    /// Add a double parameter. Returns `false` if the key already exists.
    pub fn add_double(&mut self, name: &str, value: f64) -> bool {
        insert_new(&mut self.doubles, name, value)
    }

    /// Add an integer tensor. Returns `false` if the key already exists.
    pub fn add_tensor(&mut self, name: &str, tensor: IntTensor) -> bool {
        insert_new(&mut self.tensors, name, tensor)
    }

    /// Builder form of [`Parameters::add_integer`].
    pub fn with_integer(mut self, name: &str, value: i64) -> Self {
        self.add_integer(name, value);
        self
    }

    /// Builder form of [`Parameters::add_double`].
    pub fn with_double(mut self, name: &str, value: f64) -> Self {
        self.add_double(name, value);
        self
    }

    pub fn get_integer(&self, name: &str) -> Option<i64> {
        self.integers.get(name).copied()
    }

    /// Double lookup; NaN values read as absent.
    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.doubles.get(name).copied().filter(|v| !v.is_nan())
    }

    pub fn get_tensor(&self, name: &str) -> Option<&IntTensor> {
        self.tensors.get(name)
    }

    /// Required integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] if the key is absent.
    pub fn require_integer(&self, name: &str) -> Result<i64> {
        self.get_integer(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    /// Required double parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] if the key is absent or NaN.
    pub fn require_double(&self, name: &str) -> Result<f64> {
        self.get_double(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))
    }

    /// Total number of stored parameters of all kinds.
    pub fn len(&self) -> usize {
        self.integers.len() + self.doubles.len() + self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn insert_new<V>(map: &mut HashMap<String, V>, name: &str, value: V) -> bool {
    if map.contains_key(name) {
        return false;
    }
    map.insert(name.to_string(), value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_is_not_zero() {
        let params = Parameters::new().with_integer("NumberLabels", 0);
        assert_eq!(params.get_integer("NumberLabels"), Some(0));
        assert_eq!(params.get_integer("Cycles"), None);
        assert_eq!(
            params.require_integer("Cycles"),
            Err(Error::MissingParameter("Cycles".into()))
        );
    }

    #[test]
    fn test_no_overwrite() {
        let mut params = Parameters::new();
        assert!(params.add_double("Mu", 1.0));
        assert!(!params.add_double("Mu", 2.0));
        assert_eq!(params.get_double("Mu"), Some(1.0));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_nan_reads_as_missing() {
        let params = Parameters::new().with_double("Sigma", f64::NAN);
        assert!(params.require_double("Sigma").is_err());
    }

    #[test]
    fn test_tensor() {
        let mut params = Parameters::new();
        let t = IntTensor::new(vec![2, 2], vec![1, 2, 3, 4]).unwrap();
        assert!(params.add_tensor("Seeds", t));
        assert_eq!(params.get_tensor("Seeds").unwrap().rank(), 2);
        assert!(IntTensor::new(vec![3], vec![1]).is_err());
    }
}
