// src/health/mod.rs
mod error;
mod report;
mod runner;

pub use error::HealthError;
pub use report::{collect_results, format, ProbeStatus, Report, ResultsMap};
pub use runner::{make_runner, Runner, RunnerBuilder};
