//! Accumulation of 3×3 blocks into a global sparse system.
//!
//! Each free particle owns a 3-wide block of rows and columns starting at
//! its degree-of-freedom offset. Force Jacobians are scattered here as
//! dense 3×3 blocks and later compressed into a [`CsrMatrix`].

use glam::DMat3;

use crate::sparse::CsrMatrix;

/// Triplet list for an `n × n` matrix built from 3×3 blocks.
///
/// Duplicate `(row, col)` entries are summed when the list is compressed,
/// so two springs sharing a particle can write the same block independently.
#[derive(Debug, Clone)]
pub struct BlockTriplets {
    dimension: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl BlockTriplets {
    /// Creates an empty accumulator for an `n × n` system.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Creates an accumulator with room for `blocks` 3×3 blocks.
    pub fn with_block_capacity(dimension: usize, blocks: usize) -> Self {
        Self {
            dimension,
            entries: Vec::with_capacity(blocks * 9),
        }
    }

    /// Dimension of the square system.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of raw (uncompressed) entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `scale * block` at block offset `(row, col)`.
    ///
    /// `row` and `col` are scalar offsets (multiples of 3).
    pub fn add_block(&mut self, row: usize, col: usize, block: &DMat3, scale: f64) {
        debug_assert!(row + 3 <= self.dimension && col + 3 <= self.dimension);
        // glam is column-major: block.col(c)[r] is entry (r, c).
        for c in 0..3 {
            let column = block.col(c);
            for r in 0..3 {
                let val = scale * column[r];
                if val != 0.0 {
                    self.entries.push((row + r, col + c, val));
                }
            }
        }
    }

    /// Adds `value` on the three diagonal entries of the block at `offset`.
    pub fn add_diagonal(&mut self, offset: usize, value: f64) {
        debug_assert!(offset + 3 <= self.dimension);
        if value == 0.0 {
            return;
        }
        for d in 0..3 {
            self.entries.push((offset + d, offset + d, value));
        }
    }

    /// Appends every entry of `other`, multiplied by `scale`.
    pub fn extend_scaled(&mut self, other: &BlockTriplets, scale: f64) {
        debug_assert_eq!(self.dimension, other.dimension);
        self.entries.extend(
            other
                .entries
                .iter()
                .map(|&(r, c, v)| (r, c, scale * v)),
        );
    }

    /// Compresses the triplets into CSR, summing duplicates.
    pub fn to_csr(&self) -> CsrMatrix {
        CsrMatrix::from_triplets(self.dimension, self.dimension, &self.entries)
    }
}
