// crates/nacre-core/src/math/matrix.rs
//
// Dense rows x cols matrix stored column-major as an array of column
// vectors, matching how the trust pipeline consumes it: one column per
// reporting node, normalized independently.

use serde::{Deserialize, Serialize};

use super::vector::ColumnVector;

/// A dense `rows x cols` matrix of `f64` values.
///
/// Dimensions are fixed at construction. Stored column-major so that
/// per-column normalization and column scaling are cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    columns: Vec<ColumnVector>,
}

impl Matrix {
    /// Create a zero-initialized matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            columns: (0..cols).map(|_| ColumnVector::new(rows)).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the value at (`row`, `col`). Panics when out of range.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.columns[col].get(row)
    }

    /// Set the value at (`row`, `col`). Panics when out of range.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.columns[col].set(row, value);
    }

    /// Borrow a column.
    pub fn column(&self, col: usize) -> &ColumnVector {
        &self.columns[col]
    }

    /// Sum of the absolute values of all entries.
    pub fn abs_sum(&self) -> f64 {
        self.columns.iter().map(|c| c.abs_sum()).sum()
    }

    /// Normalize each column independently so its absolute values sum
    /// to 1. All-zero columns are left unchanged.
    pub fn normalize_columns(&mut self) {
        for column in &mut self.columns {
            column.normalize();
        }
    }

    /// Multiply every entry of column `col` by `factor`.
    pub fn scale_column(&mut self, col: usize, factor: f64) {
        let scaled = self.columns[col].scale(factor);
        self.columns[col] = scaled;
    }

    /// Return a new matrix that is the transpose of this one.
    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::new(self.column_count(), self.rows);
        for col in 0..self.column_count() {
            for row in 0..self.rows {
                result.set(col, row, self.get(row, col));
            }
        }
        result
    }

    /// Matrix-vector product. Panics when `vector.len() != cols`.
    pub fn multiply(&self, vector: &ColumnVector) -> ColumnVector {
        assert_eq!(
            self.column_count(),
            vector.len(),
            "multiply requires vector length to equal the column count"
        );
        let mut result = ColumnVector::new(self.rows);
        for (col, column) in self.columns.iter().enumerate() {
            let weight = vector.get(col);
            if weight == 0.0 {
                continue;
            }
            for row in 0..self.rows {
                result.set(row, result.get(row) + column.get(row) * weight);
            }
        }
        result
    }
}
