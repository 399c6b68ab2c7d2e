// src/probe/result.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reason reported by a probe whose check succeeded.
pub const OK_REASON: &str = "OK";

/// Outcome of a single probe invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub healthy: bool,
    pub name: String,
    pub reason: String,
}

impl ProbeResult {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self {
            healthy: true,
            name: name.into(),
            reason: OK_REASON.to_string(),
        }
    }

    pub fn unhealthy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            healthy: false,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The limit is reported in whole milliseconds, rounded up so that a
    /// sub-millisecond limit never reads as zero.
    pub fn timed_out(name: impl Into<String>, limit: Duration) -> Self {
        let mut after_ms = limit.as_millis();
        if limit.subsec_nanos() % 1_000_000 != 0 {
            after_ms += 1;
        }
        Self::unhealthy(name, format!("timed out after {}ms", after_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_out_reason_rounds_up() {
        assert_eq!(
            ProbeResult::timed_out("foo", Duration::from_micros(500)).reason,
            "timed out after 1ms"
        );
        assert_eq!(
            ProbeResult::timed_out("foo", Duration::from_micros(10_001)).reason,
            "timed out after 11ms"
        );
        assert_eq!(
            ProbeResult::timed_out("foo", Duration::from_millis(10)).reason,
            "timed out after 10ms"
        );
        assert_eq!(
            ProbeResult::timed_out("foo", Duration::ZERO).reason,
            "timed out after 0ms"
        );
    }
}
