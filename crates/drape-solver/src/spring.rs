//! Linear (Hookean) springs between two particles.

use drape_math::{DMat3, DVec3};
use drape_mesh::{SpringEdge, SpringKind};
use drape_types::{DrapeError, DrapeResult, ParticleId};
use serde::{Deserialize, Serialize};

use crate::particle::Particle;

/// Elastic connector between particles `p0` and `p1`.
///
/// Springs index into the mesh's particle arena; they never own particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub p0: ParticleId,
    pub p1: ParticleId,
    /// Distance at which the spring exerts no force. Fixed at construction.
    pub rest_length: f64,
    pub stiffness: f64,
    pub kind: SpringKind,
}

/// Force and Jacobian of one spring at the current configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringResponse {
    /// Force on `p0`. `p1` receives the negation.
    pub force: DVec3,
    /// `Ks`, the 3×3 block coupling the endpoints. The force Jacobian is
    /// `-Ks` on the diagonal blocks and `+Ks` on the cross blocks.
    pub jacobian: DMat3,
    /// Current length.
    pub length: f64,
}

impl Spring {
    /// Creates a spring whose rest length is the current particle distance,
    /// so the network starts stress free.
    pub fn between(particles: &[Particle], edge: &SpringEdge, stiffness: f64) -> DrapeResult<Self> {
        let x0 = particles[edge.a.index()].position;
        let x1 = particles[edge.b.index()].position;
        let rest_length = (x1 - x0).length();
        if !(rest_length > 0.0 && rest_length.is_finite()) {
            return Err(DrapeError::DegenerateGeometry(format!(
                "spring {} → {} has rest length {rest_length}",
                edge.a.0, edge.b.0
            )));
        }
        Ok(Self {
            p0: edge.a,
            p1: edge.b,
            rest_length,
            stiffness,
            kind: edge.kind,
        })
    }

    /// Current separation of the endpoints.
    pub fn length(&self, particles: &[Particle]) -> f64 {
        (particles[self.p1.index()].position - particles[self.p0.index()].position).length()
    }

    /// Stored energy `½ k (l - L)²`.
    pub fn elastic_energy(&self, particles: &[Particle]) -> f64 {
        let stretch = self.length(particles) - self.rest_length;
        0.5 * self.stiffness * stretch * stretch
    }

    /// Evaluates force and Jacobian for endpoint positions `x0`, `x1`.
    ///
    /// With `dx = x1 - x0`, `l = |dx|` and `lf = (l - L) / l`:
    ///
    /// ```text
    /// force = k (l - L) dx / l
    /// Ks    = k / l² · [ (1 - lf) dx dxᵀ + lf (dx·dx) I ]
    /// ```
    pub fn evaluate(&self, x0: DVec3, x1: DVec3) -> DrapeResult<SpringResponse> {
        let dx = x1 - x0;
        let l = dx.length();
        if l == 0.0 || !l.is_finite() {
            return Err(DrapeError::DegenerateStep(format!(
                "spring {} → {} has length {l}",
                self.p0.0, self.p1.0
            )));
        }

        let stretch = l - self.rest_length;
        let force = dx * (self.stiffness * stretch / l);

        let lf = stretch / l;
        let outer = DMat3::from_cols(dx * dx.x, dx * dx.y, dx * dx.z);
        let jacobian = (outer * (1.0 - lf) + DMat3::from_diagonal(DVec3::splat(lf * dx.dot(dx))))
            * (self.stiffness / (l * l));

        Ok(SpringResponse {
            force,
            jacobian,
            length: l,
        })
    }
}
