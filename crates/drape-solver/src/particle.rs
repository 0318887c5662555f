//! Point masses of the cloth grid.

use drape_math::DVec3;
use serde::{Deserialize, Serialize};

/// A point mass.
///
/// Free particles own a 3-wide block of the global system starting at
/// [`global_index`](Particle::global_index). Pinned particles have no block
/// and are never advanced, though they still anchor the springs attached
/// to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub(crate) position: DVec3,
    pub(crate) velocity: DVec3,
    pub(crate) mass: f64,
    pub(crate) radius: f64,
    pub(crate) pinned: bool,
    pub(crate) global_index: Option<usize>,
    rest_position: DVec3,
    rest_velocity: DVec3,
}

impl Particle {
    /// Creates a particle at rest. The rest snapshot is the initial state.
    pub fn new(position: DVec3, mass: f64, radius: f64) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            mass,
            radius,
            pinned: false,
            global_index: None,
            rest_position: position,
            rest_velocity: DVec3::ZERO,
        }
    }

    #[inline]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Scalar offset of this particle's block in the global system,
    /// `None` when pinned.
    #[inline]
    pub fn global_index(&self) -> Option<usize> {
        self.global_index
    }

    /// Position captured by the last [`tare`](Self::tare).
    #[inline]
    pub fn rest_position(&self) -> DVec3 {
        self.rest_position
    }

    /// Snapshot the current state as the rest state.
    pub fn tare(&mut self) {
        self.rest_position = self.position;
        self.rest_velocity = self.velocity;
    }

    /// Restore the last snapshot.
    pub fn reset(&mut self) {
        self.position = self.rest_position;
        self.velocity = self.rest_velocity;
    }

    /// Linear momentum `m v`.
    #[inline]
    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    /// Kinetic energy `½ m |v|²`.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }
}
