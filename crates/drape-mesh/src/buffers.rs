//! Render-facing vertex buffers.
//!
//! Flat `f32` arrays in particle (row-major) order, ready for upload to a
//! vertex buffer. Positions and normals are refreshed after every change
//! to the particle state; texture coordinates and strip indices are fixed
//! at construction.

use drape_math::DVec3;
use serde::{Deserialize, Serialize};

use crate::grid::GridLayout;
use crate::normals::compute_normals;

/// Vertex data for drawing a cloth grid as triangle strips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderBuffers {
    /// Interleaved positions `[x0, y0, z0, x1, ...]`.
    pub positions: Vec<f32>,
    /// Interleaved unit normals, same layout as `positions`.
    pub normals: Vec<f32>,
    /// Interleaved texture coordinates `[s0, t0, s1, t1, ...]`.
    pub tex_coords: Vec<f32>,
    /// Triangle-strip indices, `2 * cols` per row band.
    pub indices: Vec<u32>,
    /// Number of indices in each strip.
    pub strip_len: usize,
    #[serde(skip)]
    normal_scratch: Vec<DVec3>,
}

impl RenderBuffers {
    /// Allocates buffers for `layout` and derives them from `positions`.
    pub fn new(layout: &GridLayout, positions: &[DVec3]) -> Self {
        let n = layout.particle_count();
        let mut buffers = Self {
            positions: vec![0.0; n * 3],
            normals: vec![0.0; n * 3],
            tex_coords: layout.tex_coords(),
            indices: layout.strip_indices(),
            strip_len: layout.cols() * 2,
            normal_scratch: vec![DVec3::ZERO; n],
        };
        buffers.update(layout, positions);
        buffers
    }

    /// Recomputes positions and normals from the current particle positions.
    pub fn update(&mut self, layout: &GridLayout, positions: &[DVec3]) {
        let n = layout.particle_count();
        debug_assert_eq!(positions.len(), n);
        self.normal_scratch.resize(n, DVec3::ZERO);

        compute_normals(layout, positions, &mut self.normal_scratch);

        for (k, (x, nor)) in positions.iter().zip(&self.normal_scratch).enumerate() {
            self.positions[3 * k] = x.x as f32;
            self.positions[3 * k + 1] = x.y as f32;
            self.positions[3 * k + 2] = x.z as f32;
            self.normals[3 * k] = nor.x as f32;
            self.normals[3 * k + 1] = nor.y as f32;
            self.normals[3 * k + 2] = nor.z as f32;
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangle strips.
    #[inline]
    pub fn strip_count(&self) -> usize {
        if self.strip_len == 0 {
            0
        } else {
            self.indices.len() / self.strip_len
        }
    }

    /// Index slice of strip `i`, or `None` past the last strip.
    pub fn strip(&self, i: usize) -> Option<&[u32]> {
        let start = i.checked_mul(self.strip_len)?;
        self.indices.get(start..start.checked_add(self.strip_len)?)
    }

    /// Position of vertex `k`.
    #[inline]
    pub fn position(&self, k: usize) -> [f32; 3] {
        [self.positions[3 * k], self.positions[3 * k + 1], self.positions[3 * k + 2]]
    }

    /// Normal of vertex `k`.
    #[inline]
    pub fn normal(&self, k: usize) -> [f32; 3] {
        [self.normals[3 * k], self.normals[3 * k + 1], self.normals[3 * k + 2]]
    }
}

// The normal scratch space is not part of the buffer contents.
impl PartialEq for RenderBuffers {
    fn eq(&self, other: &Self) -> bool {
        self.positions == other.positions
            && self.normals == other.normals
            && self.tex_coords == other.tex_coords
            && self.indices == other.indices
            && self.strip_len == other.strip_len
    }
}
