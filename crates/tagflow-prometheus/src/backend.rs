use std::sync::Arc;

use prometheus::{
    CounterVec, Histogram, HistogramOpts, IntCounter, Opts, Registry, proto::MetricFamily,
};

use tagflow_core::{MetricsBackend, RunOutcome};

/// Prometheus backend for the engine's metrics trait.
///
/// ## Metrics
/// - `tagflow_runs_started_total` - counter of runs entering Running
/// - `tagflow_runs_completed_total{outcome}` - counter of finished runs
/// - `tagflow_run_duration_seconds` - histogram of run wall time
/// - `tagflow_items_processed_total{queue}` - counter of drained items
/// - `tagflow_resolves_total{outcome}` - counter of resolver calls
///
/// ## Label cardinality
/// All labels are bounded:
/// - `outcome` (runs): "completed", "canceled"
/// - `queue`: "create", "link"
/// - `outcome` (resolves): "resolved", "failed"
#[derive(Clone)]
pub struct PrometheusMetrics {
    runs_started: IntCounter,
    runs_completed: CounterVec,
    run_duration: Histogram,
    items_processed: CounterVec,
    resolves: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend registered into a caller-provided registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let runs_started = IntCounter::with_opts(
            Opts::new("runs_started_total", "Total automation runs started").namespace("tagflow"),
        )?;
        registry.register(Box::new(runs_started.clone()))?;

        let runs_completed = CounterVec::new(
            Opts::new("runs_completed_total", "Total automation runs finished")
                .namespace("tagflow"),
            &["outcome"],
        )?;
        registry.register(Box::new(runs_completed.clone()))?;

        let run_duration = Histogram::with_opts(
            HistogramOpts::new("run_duration_seconds", "Automation run wall time in seconds")
                .namespace("tagflow")
                .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]),
        )?;
        registry.register(Box::new(run_duration.clone()))?;

        let items_processed = CounterVec::new(
            Opts::new("items_processed_total", "Total queue items processed").namespace("tagflow"),
            &["queue"],
        )?;
        registry.register(Box::new(items_processed.clone()))?;

        let resolves = CounterVec::new(
            Opts::new("resolves_total", "Total find-or-create resolver calls")
                .namespace("tagflow"),
            &["outcome"],
        )?;
        registry.register(Box::new(resolves.clone()))?;

        Ok(Self {
            runs_started,
            runs_completed,
            run_duration,
            items_processed,
            resolves,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition (textfile export, scrape handler).
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// The underlying registry, for co-registering custom metrics.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_run_started(&self) {
        self.runs_started.inc();
    }

    fn record_run_completed(&self, outcome: RunOutcome, duration_ms: u64) {
        self.runs_completed
            .with_label_values(&[outcome.as_label()])
            .inc();
        self.run_duration.observe(duration_ms as f64 / 1000.0);
    }

    fn record_item_processed(&self, queue: &str) {
        self.items_processed.with_label_values(&[queue]).inc();
    }

    fn record_resolve(&self, outcome: &str) {
        self.resolves.with_label_values(&[outcome]).inc();
    }
}
