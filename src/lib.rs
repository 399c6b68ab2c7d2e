// src/lib.rs
//! Runs named async health probes concurrently, bounds each one with an
//! optional timeout, and folds the outcomes into a single report that can be
//! served over HTTP.
//!
//! ```no_run
//! use asclepius::{healthcheck, make_runner};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), asclepius::HealthError> {
//! let runner = make_runner(vec![
//!     healthcheck("db", || async { Ok::<_, String>(()) }, Some(Duration::from_millis(250))),
//!     healthcheck("cache", || async { Err::<(), _>("connection refused") }, None),
//! ]);
//!
//! let report = runner.run().await?;
//! assert!(!report.healthy);
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod health;
pub mod metrics;
pub mod probe;
pub mod server;

pub use health::{format, make_runner, HealthError, ProbeStatus, Report, ResultsMap, Runner};
pub use probe::{healthcheck, timeout, HealthCheck, Probe, ProbeResult};
pub use server::{make_route, HealthRoute, HealthService, ResponseSink};
