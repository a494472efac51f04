use thiserror::Error;

/// Errors raised while binding a flight network to a simulation or while
/// driving it from interaction handlers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// A route names an airport that is not part of the simulated set.
    #[error("route {source_id} -> {destination_id} references unknown airport `{missing}`")]
    MissingNode {
        source_id: String,
        destination_id: String,
        missing: String,
    },

    /// A flight count, airport weight or coordinate is negative or non-finite.
    #[error("invalid {field} for {subject}: {value}")]
    InvalidWeight {
        field: &'static str,
        subject: String,
        value: f64,
    },

    #[error("airport `{0}` is listed more than once")]
    DuplicateAirport(String),

    #[error("particle index {index} is out of range for {len} particles")]
    ParticleOutOfRange { index: usize, len: usize },

    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),
}

pub type SimulationResult<T> = Result<T, SimulationError>;
