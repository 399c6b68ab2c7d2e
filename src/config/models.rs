// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Applied to probes that have no timeout of their own.
    #[serde(default)]
    pub default_timeout_ms: Option<u64>,

    #[serde(default)]
    pub reject_duplicate_names: bool,

    /// Per-probe overrides, keyed by probe name.
    #[serde(default)]
    pub probes: HashMap<String, ProbeConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("default_timeout_ms must be greater than zero")]
    ZeroDefaultTimeout,

    #[error("timeout_ms for probe '{0}' must be greater than zero")]
    ZeroProbeTimeout(String),

    #[error("Probe names must not be empty")]
    EmptyProbeName,
}

impl HealthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroDefaultTimeout);
        }

        for (name, probe) in &self.probes {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyProbeName);
            }
            if probe.timeout_ms == Some(0) {
                return Err(ConfigError::ZeroProbeTimeout(name.clone()));
            }
        }

        Ok(())
    }

    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout_ms.map(Duration::from_millis)
    }

    /// Timeout configured for `name`, falling back to the default.
    pub fn timeout_for(&self, name: &str) -> Option<Duration> {
        self.probes
            .get(name)
            .and_then(|probe| probe.timeout_ms)
            .map(Duration::from_millis)
            .or_else(|| self.default_timeout())
    }
}
