//! CSR storage for the assembled cloth system, plus the solver seam.

use drape_types::DrapeResult;
use serde::{Deserialize, Serialize};

/// Row-compressed `f64` matrix; column indices are sorted and unique per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    pub rows: usize,
    pub cols: usize,
    /// Row `i` occupies `row_ptr[i]..row_ptr[i + 1]` of `col_idx`/`values`.
    pub row_ptr: Vec<usize>,
    pub col_idx: Vec<usize>,
    pub values: Vec<f64>,
}

impl CsrMatrix {
    /// All-zero `rows × cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Returns the number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Creates a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries are summed.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut row_counts = vec![0usize; rows];
        for &(r, _, _) in triplets {
            row_counts[r] += 1;
        }

        let mut row_ptr = vec![0usize; rows + 1];
        for i in 0..rows {
            row_ptr[i + 1] = row_ptr[i] + row_counts[i];
        }

        let total = row_ptr[rows];
        let mut scratch: Vec<(usize, f64)> = vec![(0, 0.0); total];

        // Bucket by row, row_ptr doubles as the write cursor
        let mut cursor = row_ptr[..rows].to_vec();
        for &(r, c, v) in triplets {
            scratch[cursor[r]] = (c, v);
            cursor[r] += 1;
        }

        // Sort each row by column and merge duplicates
        let mut merged_ptr = vec![0usize; rows + 1];
        let mut col_idx = Vec::with_capacity(total);
        let mut values = Vec::with_capacity(total);
        for i in 0..rows {
            let row = &mut scratch[row_ptr[i]..row_ptr[i + 1]];
            row.sort_unstable_by_key(|&(c, _)| c);
            for &(c, v) in row.iter() {
                if col_idx.len() > merged_ptr[i] && col_idx.last() == Some(&c) {
                    if let Some(last) = values.last_mut() {
                        *last += v;
                    }
                } else {
                    col_idx.push(c);
                    values.push(v);
                }
            }
            merged_ptr[i + 1] = col_idx.len();
        }

        Self {
            rows,
            cols,
            row_ptr: merged_ptr,
            col_idx,
            values,
        }
    }

    /// Returns entry `(row, col)`, zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let start = self.row_ptr[row];
        let end = self.row_ptr[row + 1];
        match self.col_idx[start..end].binary_search(&col) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0.0,
        }
    }

    /// Computes `y = A x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        debug_assert_eq!(x.len(), self.cols);
        (0..self.rows)
            .map(|r| {
                (self.row_ptr[r]..self.row_ptr[r + 1])
                    .map(|idx| self.values[idx] * x[self.col_idx[idx]])
                    .sum()
            })
            .collect()
    }

    /// Returns true if `|A[i,j] - A[j,i]| <= tolerance` for every stored entry.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        if self.rows != self.cols {
            return false;
        }
        (0..self.rows).all(|r| {
            (self.row_ptr[r]..self.row_ptr[r + 1]).all(|idx| {
                let c = self.col_idx[idx];
                (self.values[idx] - self.get(c, r)).abs() <= tolerance
            })
        })
    }
}

/// Factorize-then-solve interface for `M - h² K`.
pub trait SparseSolver {
    /// Factorize the matrix. Fails if it is not positive definite.
    fn factorize(&mut self, matrix: &CsrMatrix) -> DrapeResult<()>;

    /// Writes `A⁻¹ rhs` into `solution`.
    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> DrapeResult<()>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;
}
