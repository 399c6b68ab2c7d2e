// src/metrics/collector.rs
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Renders every registered series in the text exposition format.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Probe metrics
    pub probe_runs_total: IntCounterVec,
    pub probe_duration_seconds: HistogramVec,
    pub probe_status: IntGaugeVec,

    // Report metrics
    pub report_healthy: IntGauge,
    pub runs_total: IntCounter,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probe_runs_total = IntCounterVec::new(
            Opts::new("health_probe_runs_total", "Total number of probe invocations"),
            &["probe", "outcome"],
        )?;
        registry.register(Box::new(probe_runs_total.clone()))?;

        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "health_probe_duration_seconds",
                "Probe duration in seconds",
            ),
            &["probe"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let probe_status = IntGaugeVec::new(
            Opts::new(
                "health_probe_status",
                "Probe status from the last run (1=healthy, 0=unhealthy)",
            ),
            &["probe"],
        )?;
        registry.register(Box::new(probe_status.clone()))?;

        let report_healthy = IntGauge::new(
            "health_report_healthy",
            "Overall health from the last run (1=healthy, 0=unhealthy)",
        )?;
        registry.register(Box::new(report_healthy.clone()))?;

        let runs_total = IntCounter::new("health_runs_total", "Total number of health runs")?;
        registry.register(Box::new(runs_total.clone()))?;

        Ok(Self {
            probe_runs_total,
            probe_duration_seconds,
            probe_status,
            report_healthy,
            runs_total,
        })
    }

    pub fn record_probe(&self, probe: &str, healthy: bool, duration: Duration) {
        let outcome = if healthy { "healthy" } else { "unhealthy" };
        self.probe_runs_total
            .with_label_values(&[probe, outcome])
            .inc();

        self.probe_duration_seconds
            .with_label_values(&[probe])
            .observe(duration.as_secs_f64());

        self.probe_status
            .with_label_values(&[probe])
            .set(if healthy { 1 } else { 0 });
    }

    pub fn record_report(&self, healthy: bool) {
        self.runs_total.inc();
        self.report_healthy.set(if healthy { 1 } else { 0 });
    }
}
