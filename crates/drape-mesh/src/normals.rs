//! Smoothed vertex normals for a regular grid.
//!
//! Each particle has up to four neighboring quadrant triangles:
//!
//! ```text
//!          down (k+cols)
//!            /|\
//!   left   /_|_\   right
//!   (k-1)  \ | /   (k+1)
//!            \|/
//!          up (k-cols)
//! ```
//!
//! The normal is the renormalized mean of the unit face normals of the
//! quadrants that lie inside the grid.

use drape_math::DVec3;

use crate::grid::GridLayout;

/// Normal of particle `(row, col)`.
///
/// Degenerate quadrants (zero-area) are skipped. Returns `DVec3::ZERO`
/// if no quadrant contributes a direction.
pub fn vertex_normal(layout: &GridLayout, positions: &[DVec3], row: usize, col: usize) -> DVec3 {
    let rows = layout.rows();
    let cols = layout.cols();
    let k = layout.index(row, col);
    let x = positions[k];

    let has_left = col != 0;
    let has_right = col != cols - 1;
    let has_up = row != 0;
    let has_down = row != rows - 1;

    // Edge pairs in counter-clockwise order around the particle.
    let mut quadrants: [Option<(usize, usize)>; 4] = [None; 4];
    if has_right && has_down {
        quadrants[0] = Some((k + 1, k + cols));
    }
    if has_left && has_down {
        quadrants[1] = Some((k + cols, k - 1));
    }
    if has_left && has_up {
        quadrants[2] = Some((k - 1, k - cols));
    }
    if has_right && has_up {
        quadrants[3] = Some((k - cols, k + 1));
    }

    let mut sum = DVec3::ZERO;
    let mut count = 0u32;
    for (a, b) in quadrants.into_iter().flatten() {
        let face = (positions[a] - x).cross(positions[b] - x);
        let unit = face.normalize_or_zero();
        if unit != DVec3::ZERO {
            sum += unit;
            count += 1;
        }
    }

    if count == 0 {
        return DVec3::ZERO;
    }
    (sum / count as f64).normalize_or_zero()
}

/// Writes the normal of every particle into `out`.
pub fn compute_normals(layout: &GridLayout, positions: &[DVec3], out: &mut [DVec3]) {
    debug_assert_eq!(positions.len(), layout.particle_count());
    debug_assert_eq!(out.len(), layout.particle_count());
    for i in 0..layout.rows() {
        for j in 0..layout.cols() {
            out[layout.index(i, j)] = vertex_normal(layout, positions, i, j);
        }
    }
}
