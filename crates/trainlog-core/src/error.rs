use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrainlogError {
    #[error("not initialized: run 'trainlog init'")]
    NotInitialized,

    #[error("flight log unavailable at {}: {reason}", path.display())]
    FlightLogUnavailable { path: PathBuf, reason: String },

    #[error("training plan unavailable at {}: {reason}", path.display())]
    PlanUnavailable { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrainlogError>;
