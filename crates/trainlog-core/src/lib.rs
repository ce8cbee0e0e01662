pub mod batch;
pub mod classifier;
pub mod code;
pub mod config;
pub mod duration;
pub mod error;
pub mod flight_log;
pub mod io;
pub mod matcher;
pub mod milestone;
pub mod paths;
pub mod phase;
pub mod plan;
pub mod report;
pub mod types;

pub use error::{Result, TrainlogError};
