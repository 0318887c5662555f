//! The cloth mesh and its implicit time step.

use std::time::Instant;

use drape_math::DVec3;
use drape_mesh::topology::grid_springs;
use drape_mesh::{GridLayout, RenderBuffers};
use drape_types::{DrapeError, DrapeResult, ParticleId, SpringId};
use serde::{Deserialize, Serialize};

use crate::assembly::assemble;
use crate::config::ClothConfig;
use crate::particle::Particle;
use crate::probe::CollisionProbe;
use crate::spring::Spring;

/// Outcome of a successful [`ClothMesh::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Size of the solved system.
    pub free_dofs: usize,
    /// Penetrating particle-probe pairs at the start of the step.
    pub contact_count: usize,
    /// Deepest overlap at the start of the step.
    pub max_penetration: f64,
    /// Stored entries of `M - h² K`.
    pub nonzeros: usize,
    /// Wall-clock time of the step (seconds).
    pub wall_time: f64,
}

/// A rectangular cloth patch of particles joined by springs.
///
/// Particles are stored row-major and never added or removed after
/// construction, so spring indices stay valid for the mesh's lifetime.
#[derive(Debug, Clone)]
pub struct ClothMesh {
    layout: GridLayout,
    particles: Vec<Particle>,
    springs: Vec<Spring>,
    dofs: usize,
    collision_stiffness: f64,
    buffers: RenderBuffers,
}

impl ClothMesh {
    /// Builds the particle grid and spring network described by `config`.
    ///
    /// Fails on any invalid configuration value or if two connected
    /// particles coincide. No mesh is produced on failure.
    pub fn new(config: &ClothConfig) -> DrapeResult<Self> {
        let layout = config.validate()?;
        let pinned = config.pins.pinned_indices(&layout)?;

        let count = layout.particle_count();
        let particle_mass = config.mass / count as f64;
        let positions = layout.positions(&config.corner_points());

        let mut dofs = 0;
        let mut particles = Vec::with_capacity(count);
        for (k, x) in positions.iter().enumerate() {
            let mut p = Particle::new(*x, particle_mass, config.particle_radius);
            if pinned.binary_search(&k).is_ok() {
                p.pinned = true;
            } else {
                p.global_index = Some(dofs);
                dofs += 3;
            }
            particles.push(p);
        }

        let springs = grid_springs(&layout)
            .iter()
            .map(|edge| Spring::between(&particles, edge, config.stiffness))
            .collect::<DrapeResult<Vec<_>>>()?;

        let buffers = RenderBuffers::new(&layout, &positions);

        tracing::debug!(
            rows = layout.rows(),
            cols = layout.cols(),
            particles = count,
            springs = springs.len(),
            pinned = pinned.len(),
            dofs,
            "cloth constructed"
        );

        Ok(Self {
            layout,
            particles,
            springs,
            dofs,
            collision_stiffness: config.collision_stiffness,
            buffers,
        })
    }

    /// Builds a mesh with default radius, collision stiffness, and pins.
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
    ) -> DrapeResult<Self> {
        Self::new(&ClothConfig::from_corners(
            rows, cols, x00, x01, x10, x11, mass, stiffness,
        ))
    }

    /// Advances the cloth by one backward-Euler step of size `h`.
    ///
    /// Either every free particle is updated or, on error, nothing is:
    /// the system is assembled and solved before any particle is written,
    /// so a caller can retry the same state with a smaller `h`.
    pub fn step(
        &mut self,
        h: f64,
        gravity: DVec3,
        probes: &[CollisionProbe],
    ) -> DrapeResult<StepReport> {
        let start = Instant::now();

        if !(h > 0.0 && h.is_finite()) {
            return Err(DrapeError::InvalidInput(format!(
                "timestep must be > 0 (got {h})"
            )));
        }
        if !gravity.is_finite() {
            return Err(DrapeError::InvalidInput(format!(
                "gravity {gravity:?} is not finite"
            )));
        }
        for probe in probes {
            probe.validate()?;
        }

        let system = assemble(
            &self.particles,
            &self.springs,
            probes,
            gravity,
            self.collision_stiffness,
            self.dofs,
        )?;
        let solution = system.solve(h)?;
        let v = &solution.velocities;

        // Commit: the solve succeeded, so every free particle moves.
        for p in &mut self.particles {
            if let Some(i) = p.global_index {
                p.velocity = DVec3::new(v[i], v[i + 1], v[i + 2]);
                p.position += p.velocity * h;
            }
        }
        self.refresh_buffers();

        let report = StepReport {
            free_dofs: self.dofs,
            contact_count: system.contact_count(),
            max_penetration: system.max_penetration(),
            nonzeros: solution.nonzeros,
            wall_time: start.elapsed().as_secs_f64(),
        };
        tracing::trace!(
            dofs = report.free_dofs,
            contacts = report.contact_count,
            nnz = report.nonzeros,
            "cloth step"
        );
        Ok(report)
    }

    /// Snapshot the current particle state as the rest state.
    pub fn tare(&mut self) {
        for p in &mut self.particles {
            p.tare();
        }
    }

    /// Restore the last snapshot and recompute the render buffers.
    pub fn reset(&mut self) {
        for p in &mut self.particles {
            p.reset();
        }
        self.refresh_buffers();
    }

    /// Moves a free particle, e.g. when a user drags the cloth.
    ///
    /// Pinned particles cannot be moved. Spring rest lengths are unaffected.
    pub fn set_particle_state(
        &mut self,
        id: ParticleId,
        position: DVec3,
        velocity: DVec3,
    ) -> DrapeResult<()> {
        let count = self.particles.len();
        let p = self.particles.get_mut(id.index()).ok_or_else(|| {
            DrapeError::InvalidInput(format!("particle {} out of range ({count})", id.0))
        })?;
        if p.pinned {
            return Err(DrapeError::InvalidInput(format!(
                "particle {} is pinned",
                id.0
            )));
        }
        if !position.is_finite() || !velocity.is_finite() {
            return Err(DrapeError::InvalidInput(format!(
                "state of particle {} must be finite",
                id.0
            )));
        }
        p.position = position;
        p.velocity = velocity;
        self.refresh_buffers();
        Ok(())
    }

    fn refresh_buffers(&mut self) {
        let positions: Vec<DVec3> = self.particles.iter().map(|p| p.position).collect();
        self.buffers.update(&self.layout, &positions);
    }

    #[inline]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.layout.cols()
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id.index())
    }

    #[inline]
    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    #[inline]
    pub fn spring(&self, id: SpringId) -> Option<&Spring> {
        self.springs.get(id.index())
    }

    /// Number of free degrees of freedom (3 per free particle).
    #[inline]
    pub fn dofs(&self) -> usize {
        self.dofs
    }

    #[inline]
    pub fn collision_stiffness(&self) -> f64 {
        self.collision_stiffness
    }

    /// Derived positions, normals, texture coordinates, and strip indices.
    #[inline]
    pub fn buffers(&self) -> &RenderBuffers {
        &self.buffers
    }

    /// Positions of all particles in row-major order.
    pub fn positions(&self) -> Vec<DVec3> {
        self.particles.iter().map(|p| p.position).collect()
    }

    /// Total kinetic energy `Σ ½ m |v|²`.
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Total spring energy `Σ ½ k (l - L)²`.
    pub fn elastic_energy(&self) -> f64 {
        self.springs
            .iter()
            .map(|s| s.elastic_energy(&self.particles))
            .sum()
    }

    /// Total linear momentum of the free particles.
    pub fn momentum(&self) -> DVec3 {
        self.particles
            .iter()
            .filter(|p| !p.pinned)
            .map(Particle::momentum)
            .sum()
    }
}
