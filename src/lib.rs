pub mod config;
pub mod domain;
pub mod error;
pub mod report;
pub mod simulation;
pub mod telemetry;
pub mod weather;

pub use error::{Result, SimulationError};
