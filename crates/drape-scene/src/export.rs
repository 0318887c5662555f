//! JSON frame exporter: writes per-frame cloth positions for inspection.
//!
//! Captures the static strip indices and texture coordinates once, then the
//! `f32` particle positions of every submitted frame, and serializes the
//! whole animation to one JSON file on `finalize()`.

use std::path::PathBuf;

use drape_solver::ClothMesh;
use drape_types::{DrapeError, DrapeResult};
use serde::{Deserialize, Serialize};

/// A single captured frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    pub tick: u32,
    /// Interleaved `[x0, y0, z0, x1, y1, z1, ...]`.
    pub positions: Vec<f32>,
}

/// Complete animation document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    pub rows: usize,
    pub cols: usize,
    pub vertex_count: usize,
    /// Indices per triangle strip; `indices` holds `rows - 1` strips back to back.
    pub strip_len: usize,
    pub indices: Vec<u32>,
    pub tex_coords: Vec<f32>,
    pub frames: Vec<FrameData>,
}

/// Exports simulation frames to a JSON file.
///
/// Usage:
/// ```text
/// let mut exporter = JsonFrameExporter::new("frames.json");
/// SceneRunner::run(&scene, &mut bus, |tick, mesh| exporter.submit_frame(tick, mesh))?;
/// exporter.finalize()?; // Writes the JSON file
/// ```
pub struct JsonFrameExporter {
    output_path: PathBuf,
    data: AnimationData,
}

impl JsonFrameExporter {
    /// Creates a new exporter that will write to the given path.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            data: AnimationData::default(),
        }
    }

    /// Captures the mesh's static buffers. Clears any frames already held.
    pub fn init(&mut self, mesh: &ClothMesh) {
        let buffers = mesh.buffers();
        self.data = AnimationData {
            rows: mesh.rows(),
            cols: mesh.cols(),
            vertex_count: buffers.vertex_count(),
            strip_len: buffers.strip_len,
            indices: buffers.indices.clone(),
            tex_coords: buffers.tex_coords.clone(),
            frames: Vec::new(),
        };
    }

    /// Captures the mesh's current positions. The first frame also
    /// captures the static buffers if `init` was not called.
    pub fn submit_frame(&mut self, tick: u32, mesh: &ClothMesh) {
        if self.data.vertex_count == 0 {
            self.init(mesh);
        }
        self.data.frames.push(FrameData {
            tick,
            positions: mesh.buffers().positions.clone(),
        });
    }

    pub fn frame_count(&self) -> usize {
        self.data.frames.len()
    }

    pub fn data(&self) -> &AnimationData {
        &self.data
    }

    pub fn to_json(&self) -> DrapeResult<String> {
        serde_json::to_string(&self.data)
            .map_err(|e| DrapeError::Serialization(format!("JSON serialization failed: {e}")))
    }

    /// Writes every captured frame to the output path.
    pub fn finalize(&mut self) -> DrapeResult<()> {
        let json = self.to_json()?;
        std::fs::write(&self.output_path, json)?;
        tracing::debug!(
            path = %self.output_path.display(),
            frames = self.data.frames.len(),
            "frames written"
        );
        Ok(())
    }
}
