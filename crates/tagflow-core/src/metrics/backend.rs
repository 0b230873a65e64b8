use std::sync::Arc;

use serde::Serialize;

/// How a run terminated, for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunOutcome {
    /// Both queues drained to completion.
    Completed,
    /// The run was stopped before both queues drained.
    Canceled,
}

impl RunOutcome {
    /// Label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Canceled => "canceled",
        }
    }
}

/// Metrics collection interface for the automation engine.
///
/// Implementations are injected into the controller; the engine itself only
/// depends on this trait.
pub trait MetricsBackend: Send + Sync + 'static {
    /// A run transitioned Idle to Running.
    fn record_run_started(&self);

    /// A run finished (both loops exited) with the given outcome.
    fn record_run_completed(&self, outcome: RunOutcome, duration_ms: u64);

    /// One queue item was processed. `queue` is `"create"` or `"link"`.
    fn record_item_processed(&self, queue: &str);

    /// One resolver call finished. `outcome` is `"resolved"` or `"failed"`.
    fn record_resolve(&self, outcome: &str);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
