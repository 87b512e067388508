// crates/nacre-core/src/math/vector.rs
//
// Fixed-length column vector of f64 values.

use serde::{Deserialize, Serialize};

/// A dense column vector with a length fixed at construction.
///
/// Trust vectors are aligned 1:1 with a node slice of the same length,
/// so every operation that combines two vectors requires equal lengths
/// and panics otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnVector {
    values: Vec<f64>,
}

impl ColumnVector {
    /// Create a zero-initialized vector of the given length.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    /// Create a vector from existing values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the value at `index`. Panics when out of range.
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Set the value at `index`. Panics when out of range.
    pub fn set(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    /// Set every element to `value`.
    pub fn set_all(&mut self, value: f64) {
        for v in &mut self.values {
            *v = value;
        }
    }

    /// Sum of all elements.
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sum of the absolute values of all elements.
    pub fn abs_sum(&self) -> f64 {
        self.values.iter().map(|v| v.abs()).sum()
    }

    /// Scale the vector so the absolute values sum to 1.
    ///
    /// A zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let sum = self.abs_sum();
        if sum > 0.0 {
            for v in &mut self.values {
                *v /= sum;
            }
        }
    }

    /// Clamp negative and non-finite entries to zero.
    ///
    /// Numerical defense applied between power-iteration steps so that
    /// rounding noise cannot push trust mass below zero or poison the
    /// normalization with NaN.
    pub fn align(&mut self) {
        for v in &mut self.values {
            if !v.is_finite() || *v < 0.0 {
                *v = 0.0;
            }
        }
    }

    /// Euclidean distance to `other`. Panics on length mismatch.
    pub fn distance(&self, other: &ColumnVector) -> f64 {
        assert_eq!(
            self.len(),
            other.len(),
            "distance requires vectors of equal length"
        );
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Element-wise sum with `other`. Panics on length mismatch.
    pub fn add(&self, other: &ColumnVector) -> ColumnVector {
        assert_eq!(
            self.len(),
            other.len(),
            "add requires vectors of equal length"
        );
        ColumnVector::from_values(
            self.values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| a + b)
                .collect(),
        )
    }

    /// Multiply every element by `factor`.
    pub fn scale(&self, factor: f64) -> ColumnVector {
        ColumnVector::from_values(self.values.iter().map(|v| v * factor).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
