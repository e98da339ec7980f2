use std::io;

use crate::sim::{SchedulingPolicyBuilderError, SimulationConfigBuilderError};

#[derive(thiserror::Error, Debug)]
pub enum PetriError {
    #[error("Filesystem error: {0}")]
    IOError(#[from] io::Error),
    #[error("Net description is not valid json: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Malformed net: {0}")]
    StructureError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Simulation configuration error: {0}")]
    SimulationConfigError(#[from] SimulationConfigBuilderError),
    #[error("Scheduling policy error: {0}")]
    PolicyConfigError(#[from] SchedulingPolicyBuilderError),
    #[error("Inappropriate value: {0}")]
    ValueError(String),
}

pub type Result<T> = std::result::Result<T, PetriError>;
