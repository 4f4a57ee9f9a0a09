//! Error types for the simulation core.

use thiserror::Error;

use crate::simulation::SimulationState;

/// Errors returned synchronously by simulation operations.
///
/// Numeric edge cases inside a tick (coincident vertices and the like) are
/// absorbed by denominator clamping and never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Simulation parameters were malformed or out of range.
    #[error("invalid simulation parameters: {reason}")]
    InvalidParameters {
        /// Human readable description of the offending value.
        reason: String,
    },
    /// The operation is not permitted in the driver's current state.
    #[error("cannot {operation} while the simulation is {state}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// State the driver was in.
        state: SimulationState,
    },
}

impl SimulationError {
    pub(crate) fn invalid_parameters(reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;
