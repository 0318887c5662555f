//! # drape-math
//!
//! Linear algebra primitives for the drape cloth simulator.
//!
//! Provides:
//! - Re-exports of double-precision `glam` types (`DVec3`, `DMat3`)
//! - 3×3 block accumulation into a global triplet list
//! - Sparse matrix representation (CSR) and a Cholesky solver interface
//! - A `faer`-backed sparse LLᵀ solver

pub mod block;
pub mod faer_solver;
pub mod sparse;

pub use block::BlockTriplets;
pub use faer_solver::FaerSolver;
pub use sparse::{CsrMatrix, SparseSolver};

// Re-export glam's f64 types as the canonical math types for drape.
pub use glam::{DMat3, DVec3};
