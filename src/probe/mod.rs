// src/probe/mod.rs
mod check;
mod result;
mod timer;

pub use check::{healthcheck, HealthCheck, Probe};
pub use result::{ProbeResult, OK_REASON};
pub use timer::timeout;
