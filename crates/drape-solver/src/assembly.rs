//! Implicit system assembly.
//!
//! Builds, for one backward-Euler step of size `h`,
//!
//! ```text
//! (M - h² K) v_new = M v + h f
//! ```
//!
//! over the free degrees of freedom, where `M` is the lumped mass matrix,
//! `K` the force Jacobian, `v` the current velocities and `f` the total
//! force (springs, contacts, gravity). Pinned particles have no rows or
//! columns but still contribute spring forces to their free neighbors.
//!
//! Every buffer here is created fresh per step and dropped afterwards.

use drape_math::sparse::CsrMatrix;
use drape_math::{BlockTriplets, DMat3, DVec3, FaerSolver};
use drape_types::{DrapeError, DrapeResult};

use crate::particle::Particle;
use crate::probe::CollisionProbe;
use crate::spring::Spring;

/// Global mass/stiffness/velocity/force buffers for one step.
#[derive(Debug, Clone)]
pub struct ImplicitSystem {
    dofs: usize,
    mass: BlockTriplets,
    stiffness: BlockTriplets,
    velocity: Vec<f64>,
    force: Vec<f64>,
    contact_count: usize,
    max_penetration: f64,
}

impl ImplicitSystem {
    /// Zeroed system over `dofs` scalar unknowns.
    pub fn new(dofs: usize, spring_count: usize) -> Self {
        Self {
            dofs,
            mass: BlockTriplets::with_block_capacity(dofs, dofs / 3),
            // Four blocks per spring plus one diagonal per particle for contact.
            stiffness: BlockTriplets::with_block_capacity(dofs, spring_count * 4 + dofs / 3),
            velocity: vec![0.0; dofs],
            force: vec![0.0; dofs],
            contact_count: 0,
            max_penetration: 0.0,
        }
    }

    #[inline]
    pub fn dofs(&self) -> usize {
        self.dofs
    }

    /// Assembled force vector `f`.
    #[inline]
    pub fn force(&self) -> &[f64] {
        &self.force
    }

    /// Assembled velocity vector `v`.
    #[inline]
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Number of penetrating particle-probe pairs.
    #[inline]
    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    /// Deepest overlap among the contacts, zero if none.
    #[inline]
    pub fn max_penetration(&self) -> f64 {
        self.max_penetration
    }

    fn add_force(&mut self, offset: usize, force: DVec3) {
        self.force[offset] += force.x;
        self.force[offset + 1] += force.y;
        self.force[offset + 2] += force.z;
    }

    /// Penalty forces against every probe, for free particles only.
    pub fn add_collisions(
        &mut self,
        particles: &[Particle],
        probes: &[CollisionProbe],
        collision_stiffness: f64,
    ) -> DrapeResult<()> {
        if probes.is_empty() {
            return Ok(());
        }
        for p in particles {
            let Some(offset) = p.global_index else {
                continue;
            };
            for probe in probes {
                if let Some(contact) = probe.contact(p.position, p.radius, collision_stiffness)? {
                    self.add_force(offset, contact.force);
                    self.stiffness.add_diagonal(offset, contact.stiffness);
                    self.contact_count += 1;
                    self.max_penetration = self.max_penetration.max(contact.depth);
                }
            }
        }
        Ok(())
    }

    /// Hooke forces and Jacobians of every spring.
    ///
    /// Cross blocks are added only when both endpoints are free.
    pub fn add_springs(&mut self, particles: &[Particle], springs: &[Spring]) -> DrapeResult<()> {
        for spring in springs {
            let a = &particles[spring.p0.index()];
            let b = &particles[spring.p1.index()];
            let response = spring.evaluate(a.position, b.position)?;
            let ks: &DMat3 = &response.jacobian;

            if let Some(i) = a.global_index {
                self.add_force(i, response.force);
                self.stiffness.add_block(i, i, ks, -1.0);
            }
            if let Some(j) = b.global_index {
                self.add_force(j, -response.force);
                self.stiffness.add_block(j, j, ks, -1.0);
            }
            if let (Some(i), Some(j)) = (a.global_index, b.global_index) {
                self.stiffness.add_block(i, j, ks, 1.0);
                self.stiffness.add_block(j, i, ks, 1.0);
            }
        }
        Ok(())
    }

    /// Lumped mass, gravity, and current velocity of every free particle.
    pub fn add_inertia(&mut self, particles: &[Particle], gravity: DVec3) {
        for p in particles {
            let Some(offset) = p.global_index else {
                continue;
            };
            self.mass.add_diagonal(offset, p.mass);
            self.add_force(offset, gravity * p.mass);
            self.velocity[offset] = p.velocity.x;
            self.velocity[offset + 1] = p.velocity.y;
            self.velocity[offset + 2] = p.velocity.z;
        }
    }

    /// `M` in CSR form.
    pub fn mass_matrix(&self) -> CsrMatrix {
        self.mass.to_csr()
    }

    /// `K` in CSR form.
    pub fn stiffness_matrix(&self) -> CsrMatrix {
        self.stiffness.to_csr()
    }

    /// `M - h² K`.
    pub fn system_matrix(&self, h: f64) -> CsrMatrix {
        let mut lhs = self.mass.clone();
        lhs.extend_scaled(&self.stiffness, -h * h);
        lhs.to_csr()
    }

    /// `M v + h f`.
    pub fn rhs(&self, h: f64) -> Vec<f64> {
        let mv = self.mass_matrix().mul_vec(&self.velocity);
        mv.iter()
            .zip(&self.force)
            .map(|(m, f)| m + h * f)
            .collect()
    }

    /// Solves for the new velocities of all free DOFs.
    ///
    /// Fails with [`DrapeError::SingularSystem`] if `M - h² K` is not
    /// positive definite or the solution is not finite.
    pub fn solve(&self, h: f64) -> DrapeResult<Solution> {
        if self.dofs == 0 {
            return Ok(Solution {
                velocities: Vec::new(),
                nonzeros: 0,
            });
        }
        let lhs = self.system_matrix(h);
        let rhs = self.rhs(h);
        if rhs.iter().any(|v| !v.is_finite()) {
            return Err(DrapeError::SingularSystem {
                dofs: self.dofs,
                reason: "right-hand side has non-finite entries".into(),
            });
        }
        let velocities = FaerSolver::solve_once(&lhs, &rhs)?;
        Ok(Solution {
            velocities,
            nonzeros: lhs.nnz(),
        })
    }
}

/// New velocities from one implicit solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// `v_new`, indexed like the global system.
    pub velocities: Vec<f64>,
    /// Stored entries of the factorized matrix.
    pub nonzeros: usize,
}

/// Assembles the full system for the current particle state.
pub fn assemble(
    particles: &[Particle],
    springs: &[Spring],
    probes: &[CollisionProbe],
    gravity: DVec3,
    collision_stiffness: f64,
    dofs: usize,
) -> DrapeResult<ImplicitSystem> {
    let mut system = ImplicitSystem::new(dofs, springs.len());
    system.add_collisions(particles, probes, collision_stiffness)?;
    system.add_springs(particles, springs)?;
    system.add_inertia(particles, gravity);
    Ok(system)
}
