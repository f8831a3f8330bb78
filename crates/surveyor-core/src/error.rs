//! Error types for the survey planner core.

use thiserror::Error;

/// Failures surfaced by the core library.
///
/// Simulation outcomes such as a hard day-limit violation or a degraded cost
/// are not errors; they are recorded on the route itself.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("invalid speed {speed} km/h (expected a multiple of {step} within {min}..={max})")]
    InvalidSpeed {
        speed: u32,
        min: u32,
        max: u32,
        step: u32,
    },

    #[error("coordinate set does not contain the depot `{0}`")]
    MissingDepot(String),

    #[error("depot `{id}` appears {count} times in the coordinate set")]
    DuplicateDepot { id: String, count: usize },

    #[error("unknown compass direction `{0}`")]
    UnknownDirection(String),

    #[error("population is empty")]
    EmptyPopulation,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SurveyError>;
