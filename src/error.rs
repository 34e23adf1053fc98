//! Error taxonomy for the simulation

use thiserror::Error;

/// Failures raised for structurally invalid simulation input.
///
/// Arithmetic edge cases inside a valid simulation (an IRR that does not
/// converge, a zero investment base) are not errors; they surface as `None`
/// fields on the result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid schedule input: {0}")]
    InvalidScheduleInput(String),

    #[error("unsupported asset type '{0}', use 'plot', 'apartment' or 'villa'")]
    UnsupportedAssetType(String),

    #[error("degenerate simulation: {0}")]
    DegenerateSimulation(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
