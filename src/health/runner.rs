// src/health/runner.rs
use super::error::{panic_message, HealthError};
use super::report::{collect_results, format, Report};
use crate::config::HealthConfig;
use crate::metrics::MetricsCollector;
use crate::probe::{HealthCheck, Probe, ProbeResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Runs a fixed set of checks concurrently and aggregates them into a
/// [`Report`].
#[derive(Clone)]
pub struct Runner {
    checks: Arc<[Arc<dyn HealthCheck>]>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Runner {
    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::default()
    }

    /// Applies the timeouts and duplicate-name policy from `config`.
    pub fn from_config<I>(probes: I, config: &HealthConfig) -> Result<Self, HealthError>
    where
        I: IntoIterator<Item = Probe>,
    {
        Self::builder().config(config).add_probes(probes).build()
    }

    /// Invokes every check at once and waits for all of them.
    ///
    /// Only fails when a check panics or its task is cancelled; in that case
    /// no report is produced.
    pub async fn run(&self) -> Result<Report, HealthError> {
        let span = tracing::info_span!(
            "health_run",
            run_id = %Uuid::new_v4(),
            probes = self.checks.len()
        );

        self.run_all().instrument(span).await
    }

    async fn run_all(&self) -> Result<Report, HealthError> {
        let mut tasks = Vec::with_capacity(self.checks.len());

        for check in self.checks.iter() {
            let check = check.clone();
            let task = tokio::spawn(
                async move {
                    let start = Instant::now();
                    let result = check.check().await;
                    (result, start.elapsed())
                }
                .in_current_span(),
            );
            tasks.push(task);
        }

        // Wait for every check to complete
        let joined = futures::future::join_all(tasks).await;

        let mut outcomes: Vec<(ProbeResult, Duration)> = Vec::with_capacity(joined.len());
        for (check, outcome) in self.checks.iter().zip(joined) {
            match outcome {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) if e.is_panic() => {
                    let message = panic_message(e.into_panic());
                    error!(probe = check.name(), %message, "Probe panicked");
                    return Err(HealthError::ProbePanicked {
                        name: check.name().to_string(),
                        message,
                    });
                }
                Err(e) => {
                    error!(probe = check.name(), "Probe task failed: {}", e);
                    return Err(HealthError::ProbeCancelled {
                        name: check.name().to_string(),
                    });
                }
            }
        }

        let mut healthy_count = 0;
        let mut unhealthy_count = 0;

        for (result, elapsed) in &outcomes {
            if result.healthy {
                healthy_count += 1;
                debug!(probe = %result.name, ?elapsed, "Probe is healthy");
            } else {
                unhealthy_count += 1;
                warn!(probe = %result.name, ?elapsed, "Probe is unhealthy: {}", result.reason);
            }

            if let Some(metrics) = &self.metrics {
                metrics.record_probe(&result.name, result.healthy, *elapsed);
            }
        }

        let report = format(collect_results(outcomes.into_iter().map(|(result, _)| result)));

        if let Some(metrics) = &self.metrics {
            metrics.record_report(report.healthy);
        }

        info!(
            "Health check complete: {} healthy, {} unhealthy",
            healthy_count, unhealthy_count
        );

        Ok(report)
    }
}

/// Builds a runner that does not reject duplicate probe names; the later
/// probe's result wins.
pub fn make_runner<I>(probes: I) -> Runner
where
    I: IntoIterator<Item = Probe>,
{
    let checks: Vec<Arc<dyn HealthCheck>> = probes
        .into_iter()
        .map(|probe| Arc::new(probe) as Arc<dyn HealthCheck>)
        .collect();

    Runner {
        checks: checks.into(),
        metrics: None,
    }
}

enum Entry {
    Probe(Probe),
    Custom(Arc<dyn HealthCheck>),
}

#[derive(Default)]
pub struct RunnerBuilder {
    entries: Vec<Entry>,
    config: Option<HealthConfig>,
    reject_duplicate_names: bool,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RunnerBuilder {
    pub fn add_probe(mut self, probe: Probe) -> Self {
        self.entries.push(Entry::Probe(probe));
        self
    }

    pub fn add_probes<I>(mut self, probes: I) -> Self
    where
        I: IntoIterator<Item = Probe>,
    {
        self.entries.extend(probes.into_iter().map(Entry::Probe));
        self
    }

    /// Adds a custom check. Config timeouts do not apply to it.
    pub fn add_check<C: HealthCheck + 'static>(mut self, check: C) -> Self {
        self.entries.push(Entry::Custom(Arc::new(check)));
        self
    }

    /// Probes without an explicit timeout get the one configured for their
    /// name, or the default. Also adopts the duplicate-name policy.
    pub fn config(mut self, config: &HealthConfig) -> Self {
        self.reject_duplicate_names = config.reject_duplicate_names;
        self.config = Some(config.clone());
        self
    }

    pub fn reject_duplicate_names(mut self, reject: bool) -> Self {
        self.reject_duplicate_names = reject;
        self
    }

    pub fn metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<Runner, HealthError> {
        let config = self.config;
        let checks: Vec<Arc<dyn HealthCheck>> = self
            .entries
            .into_iter()
            .map(|entry| match entry {
                Entry::Probe(probe) => {
                    let probe = match &config {
                        Some(config) => {
                            let timeout = config.timeout_for(probe.name());
                            probe.or_timeout(timeout)
                        }
                        None => probe,
                    };
                    Arc::new(probe) as Arc<dyn HealthCheck>
                }
                Entry::Custom(check) => check,
            })
            .collect();

        if self.reject_duplicate_names {
            let mut seen = HashSet::new();
            for check in &checks {
                if !seen.insert(check.name()) {
                    return Err(HealthError::DuplicateProbe(check.name().to_string()));
                }
            }
        }

        Ok(Runner {
            checks: checks.into(),
            metrics: self.metrics,
        })
    }
}
