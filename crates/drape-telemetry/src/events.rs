//! Simulation event types.
//!
//! Lightweight value types emitted by a driver loop once per tick.

use serde::{Deserialize, Serialize};

/// A simulation event, tagged with the tick that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Tick number (0-indexed).
    pub timestep: u32,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Tick completed.
    TimestepEnd {
        /// Simulation time after the tick (seconds).
        sim_time: f64,
        /// Wall-clock time spent in the tick (seconds).
        wall_time: f64,
    },

    /// Particle-probe contacts at the start of the tick.
    Contacts {
        count: u32,
        /// Deepest overlap (meters).
        max_penetration: f64,
    },

    /// Energy snapshot after the tick.
    Energy {
        /// ½ Σ m |v|².
        kinetic: f64,
        /// ½ Σ k (l - L)².
        elastic: f64,
    },

    /// A failed tick succeeded after being split into substeps.
    Recovered {
        substeps: u32,
    },

    /// A tick could not be completed.
    StepFailed {
        reason: String,
    },

    /// Custom event for extensibility.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given tick.
    pub fn new(timestep: u32, kind: EventKind) -> Self {
        Self { timestep, kind }
    }
}
