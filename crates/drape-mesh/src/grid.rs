//! Row-major grid layout and bilinear particle placement.

use drape_math::DVec3;
use drape_types::{DrapeError, DrapeResult, ParticleId};
use serde::{Deserialize, Serialize};

/// Dimensions of a `rows × cols` particle grid.
///
/// Particle `(i, j)` lives at flattened index `i * cols + j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    rows: usize,
    cols: usize,
}

impl GridLayout {
    /// Creates a layout. Both dimensions must be at least 2.
    pub fn new(rows: usize, cols: usize) -> DrapeResult<Self> {
        if rows <= 1 {
            return Err(DrapeError::InvalidConfig(format!(
                "rows must be > 1 (got {rows})"
            )));
        }
        if cols <= 1 {
            return Err(DrapeError::InvalidConfig(format!(
                "cols must be > 1 (got {cols})"
            )));
        }
        if rows.checked_mul(cols).is_none_or(|n| n > u32::MAX as usize) {
            return Err(DrapeError::InvalidConfig(format!(
                "grid {rows}×{cols} is too large"
            )));
        }
        Ok(Self { rows, cols })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of particles.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Flattened index of `(row, col)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Particle id of `(row, col)`.
    #[inline]
    pub fn id(&self, row: usize, col: usize) -> ParticleId {
        ParticleId(self.index(row, col) as u32)
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Returns true if `(row, col)` is inside the grid.
    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Bilinear placement of every particle on the patch spanned by
    /// `x00` (row 0, col 0), `x01` (row 0, last col), `x10` (last row, col 0)
    /// and `x11` (last row, last col).
    ///
    /// When `x11 == x01 + x10 - x00` the patch is a parallelogram and
    /// placement is `x00 + (x01 - x00) * u + (x10 - x00) * v`.
    pub fn positions(&self, corners: &[DVec3; 4]) -> Vec<DVec3> {
        let [x00, x01, x10, x11] = *corners;
        let scale_col = 1.0 / (self.cols - 1) as f64;
        let scale_row = 1.0 / (self.rows - 1) as f64;

        let mut out = Vec::with_capacity(self.particle_count());
        for i in 0..self.rows {
            let v = scale_row * i as f64;
            let left = x00.lerp(x10, v);
            let right = x01.lerp(x11, v);
            for j in 0..self.cols {
                let u = scale_col * j as f64;
                out.push(left.lerp(right, u));
            }
        }
        out
    }

    /// Texture coordinates `(i / (rows-1), j / (cols-1))`, two per particle.
    pub fn tex_coords(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.particle_count() * 2);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.push(i as f32 / (self.rows - 1) as f32);
                out.push(j as f32 / (self.cols - 1) as f32);
            }
        }
        out
    }

    /// Triangle-strip indices: one strip of `2 * cols` indices per row band.
    ///
    /// Strip `i` alternates `(i, j)` and `(i + 1, j)` for every column.
    pub fn strip_indices(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity((self.rows - 1) * self.cols * 2);
        for i in 0..self.rows - 1 {
            for j in 0..self.cols {
                let k0 = self.index(i, j);
                let k1 = k0 + self.cols;
                out.push(k0 as u32);
                out.push(k1 as u32);
            }
        }
        out
    }
}
