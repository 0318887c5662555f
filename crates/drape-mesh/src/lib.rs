//! # drape-mesh
//!
//! Regular-grid cloth geometry.
//!
//! ## Key Types
//!
//! - [`GridLayout`]: Row-major grid dimensions, index helpers, and the
//!   bilinear patch that places particles between four corners.
//! - [`SpringEdge`]: One structural, shear, or bend connection produced by
//!   [`topology::grid_springs`].
//! - [`RenderBuffers`]: Flat `f32` positions, normals, texture coordinates,
//!   and triangle-strip indices for a renderer.

pub mod buffers;
pub mod grid;
pub mod normals;
pub mod topology;

pub use buffers::RenderBuffers;
pub use grid::GridLayout;
pub use topology::{SpringEdge, SpringKind};
