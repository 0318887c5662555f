//! Rigid spheres that cloth particles collide with.
//!
//! Probes are supplied by an external rigid-body system each step. The
//! cloth reads them but never pushes back (one-way coupling).

use drape_math::DVec3;
use drape_types::{DrapeError, DrapeResult};
use serde::{Deserialize, Serialize};

/// A sphere used only as a collision source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionProbe {
    pub center: DVec3,
    pub radius: f64,
}

/// Penalty response of one particle-probe pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Overlap `(r_p + r_s) - |x_p - x_s|`, always positive.
    pub depth: f64,
    /// Unit vector from the probe center to the particle.
    pub normal: DVec3,
    /// Repulsive force `c · depth · normal`.
    pub force: DVec3,
    /// Diagonal stiffness term `c · depth`.
    pub stiffness: f64,
}

impl CollisionProbe {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Rejects non-finite centers and negative or non-finite radii.
    pub fn validate(&self) -> DrapeResult<()> {
        if !self.center.is_finite() {
            return Err(DrapeError::InvalidInput(format!(
                "probe center {:?} is not finite",
                self.center
            )));
        }
        if !(self.radius >= 0.0 && self.radius.is_finite()) {
            return Err(DrapeError::InvalidInput(format!(
                "probe radius must be >= 0 (got {})",
                self.radius
            )));
        }
        Ok(())
    }

    /// Penalty contact for a particle at `position` with `radius`.
    ///
    /// Returns `None` when the spheres do not overlap. The stiffness term
    /// linearizes only the depth; the normal's dependence on position is
    /// not differentiated.
    pub fn contact(
        &self,
        position: DVec3,
        radius: f64,
        collision_stiffness: f64,
    ) -> DrapeResult<Option<Contact>> {
        let offset = position - self.center;
        let distance = offset.length();
        let depth = radius + self.radius - distance;
        if depth <= 0.0 {
            return Ok(None);
        }
        if distance == 0.0 {
            return Err(DrapeError::DegenerateStep(format!(
                "particle coincides with probe center {:?}",
                self.center
            )));
        }

        let normal = offset / distance;
        let stiffness = collision_stiffness * depth;
        Ok(Some(Contact {
            depth,
            normal,
            force: normal * stiffness,
            stiffness,
        }))
    }
}
