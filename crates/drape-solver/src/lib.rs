//! # drape-solver
//!
//! Implicit mass-spring cloth simulation.
//!
//! ## Key Types
//!
//! - [`ClothMesh`]: Particle grid plus spring network; advances in time with
//!   one backward-Euler solve per [`step`](ClothMesh::step)
//! - [`ClothConfig`]: Grid dimensions, corners, mass, stiffness, pin policy
//! - [`CollisionProbe`]: Rigid sphere that pushes cloth particles out
//! - [`assembly::ImplicitSystem`]: Per-step mass/stiffness/force assembly
//!
//! ## Example
//!
//! ```no_run
//! use drape_math::DVec3;
//! use drape_solver::{ClothConfig, ClothMesh, CollisionProbe};
//!
//! let config = ClothConfig::new(
//!     8,
//!     8,
//!     [[-0.5, 1.0, 0.0], [0.5, 1.0, 0.0], [-0.5, 1.0, 1.0], [0.5, 1.0, 1.0]],
//!     0.5,
//!     1.0e2,
//! );
//! let mut cloth = ClothMesh::new(&config)?;
//! let sphere = CollisionProbe::new(DVec3::new(0.0, 0.6, 0.5), 0.2);
//! for _ in 0..60 {
//!     cloth.step(1.0 / 60.0, DVec3::new(0.0, -9.81, 0.0), &[sphere])?;
//! }
//! # Ok::<(), drape_types::DrapeError>(())
//! ```

pub mod assembly;
pub mod cloth;
pub mod config;
pub mod particle;
pub mod probe;
pub mod spring;

pub use cloth::{ClothMesh, StepReport};
pub use config::{ClothConfig, PinPolicy};
pub use particle::Particle;
pub use probe::{CollisionProbe, Contact};
pub use spring::{Spring, SpringResponse};
