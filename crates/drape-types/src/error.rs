//! Error types for the drape simulator.
//!
//! All crates return `DrapeResult<T>` from fallible operations.
//! Construction failures (`InvalidConfig`, `DegenerateGeometry`) mean no
//! object was created. Step failures (`InvalidInput`, `DegenerateStep`,
//! `SingularSystem`) leave the mesh in its pre-step state.

use thiserror::Error;

/// Unified error type for the drape simulator.
#[derive(Debug, Error)]
pub enum DrapeError {
    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Initial geometry cannot produce a valid spring network.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Per-step input (timestep, gravity, probes) is invalid.
    #[error("Invalid step input: {0}")]
    InvalidInput(String),

    /// A force contribution could not be evaluated during a step.
    #[error("Degenerate step: {0}")]
    DegenerateStep(String),

    /// The implicit system could not be solved.
    #[error("Singular system ({dofs} DOFs): {reason}")]
    SingularSystem {
        /// Size of the global system.
        dofs: usize,
        /// Underlying solver message.
        reason: String,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DrapeError {
    /// Returns true for failures a driver may retry with a smaller timestep.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DrapeError::SingularSystem { .. } | DrapeError::DegenerateStep(_)
        )
    }
}

/// Convenience alias for `Result<T, DrapeError>`.
pub type DrapeResult<T> = Result<T, DrapeError>;
