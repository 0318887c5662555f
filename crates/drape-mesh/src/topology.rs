//! Spring network of a regular cloth grid.
//!
//! For every cell `(i, j)` with top-left particle `k = i * cols + j`:
//!
//! ```text
//!   k ────── k+1 ── ─ ─ k+2      structural: k→k+1, k→k+cols
//!   │ ╲    ╱ │                   shear:      k+1→k+cols, k→k+cols+1
//!   │   ╳    │                   bend:       k→k+2, k→k+2·cols
//!   │ ╱    ╲ │
//!  k+cols ── k+cols+1
//!   ┆
//!  k+2·cols
//! ```
//!
//! Bend springs exist only when the two-apart neighbor is inside the grid.
//! Each row band also gets one closing structural spring down the last
//! column, `(i, cols-1) → (i+1, cols-1)`.

use drape_types::ParticleId;
use serde::{Deserialize, Serialize};

use crate::grid::GridLayout;

/// Role of a spring in the grid network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpringKind {
    /// Edge between horizontal or vertical neighbors.
    Structural,
    /// Cell diagonal, resists in-plane shearing.
    Shear,
    /// Two-apart connection, resists folding.
    Bend,
}

/// A connection between two grid particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpringEdge {
    pub a: ParticleId,
    pub b: ParticleId,
    pub kind: SpringKind,
}

impl SpringEdge {
    fn new(a: usize, b: usize, kind: SpringKind) -> Self {
        Self {
            a: ParticleId(a as u32),
            b: ParticleId(b as u32),
            kind,
        }
    }
}

/// Builds the spring network for `layout` in a deterministic order.
pub fn grid_springs(layout: &GridLayout) -> Vec<SpringEdge> {
    let rows = layout.rows();
    let cols = layout.cols();
    let mut edges = Vec::with_capacity((rows - 1) * (cols - 1) * 6 + rows);

    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let k = layout.index(i, j);
            edges.push(SpringEdge::new(k, k + 1, SpringKind::Structural));
            edges.push(SpringEdge::new(k, k + cols, SpringKind::Structural));
            edges.push(SpringEdge::new(k + 1, k + cols, SpringKind::Shear));
            edges.push(SpringEdge::new(k, k + cols + 1, SpringKind::Shear));
            if j + 2 < cols {
                edges.push(SpringEdge::new(k, k + 2, SpringKind::Bend));
            }
            if i + 2 < rows {
                edges.push(SpringEdge::new(k, k + 2 * cols, SpringKind::Bend));
            }
        }
        let k = layout.index(i, cols - 1);
        edges.push(SpringEdge::new(k, k + cols, SpringKind::Structural));
    }

    edges
}

/// Number of springs [`grid_springs`] produces for `layout`.
pub fn spring_count(layout: &GridLayout) -> usize {
    let rows = layout.rows();
    let cols = layout.cols();
    let cells = (rows - 1) * (cols - 1);
    let horizontal_bend = (rows - 1) * (cols - 2);
    let vertical_bend = (rows - 2) * (cols - 1);
    cells * 4 + horizontal_bend + vertical_bend + (rows - 1)
}
