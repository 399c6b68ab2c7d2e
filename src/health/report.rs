// src/health/report.rs
use crate::probe::ProbeResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-probe entry of a report. The name lives in the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStatus {
    pub healthy: bool,
    pub reason: String,
}

impl From<ProbeResult> for ProbeStatus {
    fn from(result: ProbeResult) -> Self {
        Self {
            healthy: result.healthy,
            reason: result.reason,
        }
    }
}

pub type ResultsMap = BTreeMap<String, ProbeStatus>;

/// Aggregate outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub healthy: bool,
    pub results: ResultsMap,
}

/// Folds results into a map keyed by probe name. A later result overwrites
/// an earlier one with the same name.
pub fn collect_results<I>(results: I) -> ResultsMap
where
    I: IntoIterator<Item = ProbeResult>,
{
    results.into_iter().fold(ResultsMap::new(), |mut map, result| {
        map.insert(result.name.clone(), result.into());
        map
    })
}

/// Wraps `results` in a report that is healthy unless some entry is not.
pub fn format(results: ResultsMap) -> Report {
    Report {
        healthy: results.values().all(|status| status.healthy),
        results,
    }
}
