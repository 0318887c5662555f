//! Cloth configuration.
//!
//! Everything needed to build a [`ClothMesh`](crate::ClothMesh): grid
//! dimensions, the four corners of the patch, total mass, spring stiffness,
//! collision parameters, and which particles are pinned.

use drape_math::DVec3;
use drape_mesh::GridLayout;
use drape_types::constants::{DEFAULT_COLLISION_STIFFNESS, DEFAULT_PARTICLE_RADIUS};
use drape_types::{DrapeError, DrapeResult};
use serde::{Deserialize, Serialize};

/// Which particles are held fixed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PinPolicy {
    /// First and last particle of the last row: `(rows-1)*cols` and `rows*cols-1`.
    #[default]
    BottomCorners,
    /// First and last particle of the first row: `0` and `cols-1`.
    TopCorners,
    /// Every particle is free.
    None,
    /// Explicit `[row, col]` cells.
    Explicit { cells: Vec<[usize; 2]> },
}

impl PinPolicy {
    /// Flattened, sorted, de-duplicated indices of the pinned particles.
    pub fn pinned_indices(&self, layout: &GridLayout) -> DrapeResult<Vec<usize>> {
        let rows = layout.rows();
        let cols = layout.cols();
        let mut indices = match self {
            PinPolicy::BottomCorners => vec![(rows - 1) * cols, rows * cols - 1],
            PinPolicy::TopCorners => vec![0, cols - 1],
            PinPolicy::None => Vec::new(),
            PinPolicy::Explicit { cells } => {
                let mut out = Vec::with_capacity(cells.len());
                for &[row, col] in cells {
                    if !layout.contains(row, col) {
                        return Err(DrapeError::InvalidConfig(format!(
                            "pinned cell [{row}, {col}] is outside the {rows}×{cols} grid"
                        )));
                    }
                    out.push(layout.index(row, col));
                }
                out
            }
        };
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }
}

/// Configuration of a cloth patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothConfig {
    /// Particle rows (> 1).
    pub rows: usize,
    /// Particle columns (> 1).
    pub cols: usize,
    /// Patch corners `[x00, x01, x10, x11]`: row 0/col 0, row 0/last col,
    /// last row/col 0, last row/last col.
    pub corners: [[f64; 3]; 4],
    /// Total mass, split evenly over all `rows × cols` particles.
    pub mass: f64,
    /// Stiffness shared by every spring.
    pub stiffness: f64,
    /// Collision radius of each particle.
    #[serde(default = "default_particle_radius")]
    pub particle_radius: f64,
    /// Penalty constant `c` for particle-probe contact.
    #[serde(default = "default_collision_stiffness")]
    pub collision_stiffness: f64,
    #[serde(default)]
    pub pins: PinPolicy,
}

fn default_particle_radius() -> f64 {
    DEFAULT_PARTICLE_RADIUS
}

fn default_collision_stiffness() -> f64 {
    DEFAULT_COLLISION_STIFFNESS
}

impl ClothConfig {
    /// Creates a config with default radius, collision stiffness, and pins.
    pub fn new(rows: usize, cols: usize, corners: [[f64; 3]; 4], mass: f64, stiffness: f64) -> Self {
        Self {
            rows,
            cols,
            corners,
            mass,
            stiffness,
            particle_radius: DEFAULT_PARTICLE_RADIUS,
            collision_stiffness: DEFAULT_COLLISION_STIFFNESS,
            pins: PinPolicy::default(),
        }
    }

    /// Creates a config from `glam` corner points.
    #[allow(clippy::too_many_arguments)]
    pub fn from_corners(
        rows: usize,
        cols: usize,
        x00: DVec3,
        x01: DVec3,
        x10: DVec3,
        x11: DVec3,
        mass: f64,
        stiffness: f64,
    ) -> Self {
        Self::new(
            rows,
            cols,
            [x00.to_array(), x01.to_array(), x10.to_array(), x11.to_array()],
            mass,
            stiffness,
        )
    }

    pub fn with_pins(mut self, pins: PinPolicy) -> Self {
        self.pins = pins;
        self
    }

    pub fn with_particle_radius(mut self, radius: f64) -> Self {
        self.particle_radius = radius;
        self
    }

    pub fn with_collision_stiffness(mut self, stiffness: f64) -> Self {
        self.collision_stiffness = stiffness;
        self
    }

    /// Corner points as vectors.
    pub fn corner_points(&self) -> [DVec3; 4] {
        self.corners.map(DVec3::from_array)
    }

    /// Checks every construction constraint without building anything.
    ///
    /// Returns the validated grid layout.
    pub fn validate(&self) -> DrapeResult<GridLayout> {
        let layout = GridLayout::new(self.rows, self.cols)?;

        if !(self.mass > 0.0 && self.mass.is_finite()) {
            return Err(DrapeError::InvalidConfig(format!(
                "mass must be > 0 (got {})",
                self.mass
            )));
        }
        if !(self.stiffness > 0.0 && self.stiffness.is_finite()) {
            return Err(DrapeError::InvalidConfig(format!(
                "stiffness must be > 0 (got {})",
                self.stiffness
            )));
        }
        if !(self.particle_radius >= 0.0 && self.particle_radius.is_finite()) {
            return Err(DrapeError::InvalidConfig(format!(
                "particle_radius must be >= 0 (got {})",
                self.particle_radius
            )));
        }
        if !(self.collision_stiffness >= 0.0 && self.collision_stiffness.is_finite()) {
            return Err(DrapeError::InvalidConfig(format!(
                "collision_stiffness must be >= 0 (got {})",
                self.collision_stiffness
            )));
        }
        if self.corners.iter().flatten().any(|c| !c.is_finite()) {
            return Err(DrapeError::InvalidConfig(
                "corner coordinates must be finite".into(),
            ));
        }
        self.pins.pinned_indices(&layout)?;

        Ok(layout)
    }
}
