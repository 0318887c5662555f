//! # drape-scene
//!
//! Headless driver around [`drape_solver::ClothMesh`].
//!
//! - [`SceneConfig`]: TOML-loadable description of a cloth, probes and timing
//! - [`ScenePreset`]: Built-in scenes (`hanging_sheet`, `sphere_drape`)
//! - [`SceneRunner`]: Tick loop with timestep-halving recovery and telemetry
//! - [`JsonFrameExporter`]: Per-frame positions written as one JSON file

pub mod export;
pub mod runner;
pub mod scenarios;

pub use export::JsonFrameExporter;
pub use runner::{RunSummary, SceneRunner};
pub use scenarios::{ProbeConfig, SceneConfig, ScenePreset};
