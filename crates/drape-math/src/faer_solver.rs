//! [`SparseSolver`] over faer's sparse LLᵀ.
//!
//! `M - h² K` changes every step, so each step builds a fresh factorization
//! and solves one right-hand side ([`FaerSolver::solve_once`]).

use drape_types::{DrapeError, DrapeResult};
use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};

use crate::sparse::{CsrMatrix, SparseSolver};

/// Sparse Cholesky (LLᵀ) solver using `faer`.
pub struct FaerSolver {
    factorization: Option<Llt<usize, f64>>,
    dimension: usize,
}

impl FaerSolver {
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    fn singular(&self, reason: String) -> DrapeError {
        DrapeError::SingularSystem {
            dofs: self.dimension,
            reason,
        }
    }

    fn to_csc(matrix: &CsrMatrix) -> Result<SparseColMat<usize, f64>, String> {
        let triplets: Vec<Triplet<usize, usize, f64>> = (0..matrix.rows)
            .flat_map(|row| {
                (matrix.row_ptr[row]..matrix.row_ptr[row + 1]).map(move |idx| Triplet {
                    row,
                    col: matrix.col_idx[idx],
                    val: matrix.values[idx],
                })
            })
            .collect();
        SparseColMat::try_new_from_triplets(matrix.rows, matrix.cols, &triplets)
            .map_err(|e| format!("CSC conversion failed: {e:?}"))
    }

    /// Factorizes `matrix` and solves for a single right-hand side.
    pub fn solve_once(matrix: &CsrMatrix, rhs: &[f64]) -> DrapeResult<Vec<f64>> {
        let mut solver = Self::new();
        solver.factorize(matrix)?;
        let mut solution = vec![0.0; rhs.len()];
        solver.solve(rhs, &mut solution)?;
        Ok(solution)
    }
}

impl Default for FaerSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseSolver for FaerSolver {
    fn factorize(&mut self, matrix: &CsrMatrix) -> DrapeResult<()> {
        self.factorization = None;
        self.dimension = matrix.rows;

        if matrix.rows != matrix.cols {
            return Err(self.singular(format!(
                "matrix must be square, got {}×{}",
                matrix.rows, matrix.cols
            )));
        }
        if matrix.rows == 0 {
            return Err(self.singular("cannot factorize empty matrix".into()));
        }
        if matrix.values.iter().any(|v| !v.is_finite()) {
            return Err(self.singular("matrix has non-finite entries".into()));
        }

        let csc = Self::to_csc(matrix).map_err(|e| self.singular(e))?;

        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| self.singular(format!("symbolic analysis failed: {e:?}")))?;

        // Fails here when the matrix is not positive definite.
        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper)
            .map_err(|e| self.singular(format!("Cholesky factorization failed: {e:?}")))?;

        self.factorization = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> DrapeResult<()> {
        let llt = self
            .factorization
            .as_ref()
            .ok_or_else(|| self.singular("solver not factorized".into()))?;

        if rhs.len() != self.dimension || solution.len() != self.dimension {
            return Err(self.singular(format!(
                "RHS length ({}) / solution length ({}) != matrix dimension ({})",
                rhs.len(),
                solution.len(),
                self.dimension
            )));
        }

        let rhs_col: faer::Mat<f64> = faer::Mat::from_fn(self.dimension, 1, |i, _| rhs[i]);

        let sol = llt.solve(&rhs_col);

        for (i, out) in solution.iter_mut().enumerate() {
            *out = sol[(i, 0)];
        }

        if solution.iter().any(|v| !v.is_finite()) {
            return Err(self.singular("solution has non-finite entries".into()));
        }
        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }
}
