//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f64 = 1.0 / 60.0;

/// Default collision radius of a cloth particle (meters).
pub const DEFAULT_PARTICLE_RADIUS: f64 = 0.01;

/// Default penalty stiffness for particle-probe contact.
pub const DEFAULT_COLLISION_STIFFNESS: f64 = 1.0e2;

/// Default number of timestep halvings a driver attempts after a failed step.
pub const DEFAULT_MAX_HALVINGS: u32 = 4;
