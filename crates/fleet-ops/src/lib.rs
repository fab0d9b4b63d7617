pub mod config;
pub mod error;
pub mod fleet;
pub mod telemetry;
