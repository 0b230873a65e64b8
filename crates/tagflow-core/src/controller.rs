//! Dual-queue automation controller.
//!
//! An explicit two-state machine (Idle/Running) owning both work queues,
//! the progress counters and the cancellation token for the current run.
//! One controller instance drives one host surface; the two drain loops
//! borrow it instead of sharing ambient globals.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tagflow_model::{CreateAction, LinkAction, RunnerConfig};

use crate::error::CoreError;
use crate::metrics::{MetricsHandle, RunOutcome, noop_metrics};
use crate::queue::build_queues;
use crate::resolver::Resolver;
use crate::surface::Surface;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

/// Asks the user before a batch action runs.
///
/// Declining aborts before any state change.
#[async_trait]
pub trait ConfirmGate: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Gate that approves every prompt, for configurations that opted out of
/// prompting and for tests.
pub struct AutoConfirm;

#[async_trait]
impl ConfirmGate for AutoConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub total: usize,
    pub processed: usize,
    pub creates_activated: usize,
    pub links_activated: usize,
    pub confirms_missing: usize,
    pub names_resolved: usize,
    pub names_failed: usize,
    pub outcome: RunOutcome,
    pub elapsed_ms: u64,
}

#[derive(Default)]
struct CreateStats {
    activated: usize,
    confirms_missing: usize,
}

#[derive(Default)]
struct LinkStats {
    activated: usize,
    resolved: usize,
    failed: usize,
}

struct RunInner {
    phase: Phase,
    cancel: CancellationToken,
    creates: VecDeque<CreateAction>,
    links: VecDeque<LinkAction>,
    processed: usize,
    total: usize,
}

/// Dual-queue runner over a host surface.
pub struct Controller {
    surface: Arc<dyn Surface>,
    resolver: Arc<dyn Resolver>,
    metrics: MetricsHandle,
    cfg: RunnerConfig,
    inner: Mutex<RunInner>,
}

impl Controller {
    pub fn new(surface: Arc<dyn Surface>, resolver: Arc<dyn Resolver>, cfg: RunnerConfig) -> Self {
        Self {
            surface,
            resolver,
            metrics: noop_metrics(),
            cfg,
            inner: Mutex::new(RunInner {
                phase: Phase::Idle,
                cancel: CancellationToken::new(),
                creates: VecDeque::new(),
                links: VecDeque::new(),
                processed: 0,
                total: 0,
            }),
        }
    }

    /// Replace the metrics backend and return the updated controller.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.phase
    }

    /// Execute one full run: confirm, build both queues from the current
    /// snapshot, drain them concurrently, then reset to Idle.
    ///
    /// Queues are rebuilt from the surface on every run; nothing is resumed
    /// from a previous one.
    pub async fn run(&self, gate: &dyn ConfirmGate) -> Result<RunReport, CoreError> {
        if self.phase().await == Phase::Running {
            return Err(CoreError::AlreadyRunning);
        }
        if !gate.confirm("Start batch automation run?").await {
            info!("automation run declined");
            return Err(CoreError::Declined);
        }

        let queues = build_queues(&self.surface.snapshot());
        let total = queues.total();

        let cancel = CancellationToken::new();
        {
            let mut inner = self.inner.lock().await;
            if inner.phase == Phase::Running {
                return Err(CoreError::AlreadyRunning);
            }
            inner.phase = Phase::Running;
            inner.cancel = cancel.clone();
            inner.creates = queues.creates;
            inner.links = queues.links;
            inner.processed = 0;
            inner.total = total;
        }
        self.surface.set_progress(0.0);
        self.metrics.record_run_started();
        info!(total, "automation run started");
        let started = Instant::now();

        let (create_stats, link_stats) =
            tokio::join!(self.drain_creates(&cancel), self.drain_links(&cancel));

        let canceled = cancel.is_cancelled();
        let processed = self.inner.lock().await.processed;
        self.finish().await;

        let outcome = if canceled {
            RunOutcome::Canceled
        } else {
            RunOutcome::Completed
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_run_completed(outcome, elapsed_ms);
        info!(outcome = outcome.as_label(), processed, total, "automation run finished");

        Ok(RunReport {
            total,
            processed,
            creates_activated: create_stats.activated,
            links_activated: link_stats.activated,
            confirms_missing: create_stats.confirms_missing,
            names_resolved: link_stats.resolved,
            names_failed: link_stats.failed,
            outcome,
            elapsed_ms,
        })
    }

    /// Stop the current run: cancel the token and discard everything still
    /// queued. In-flight activations and remote calls are not interrupted;
    /// the loops observe cancellation at their next iteration boundary.
    pub async fn request_stop(&self) {
        let mut inner = self.inner.lock().await;
        if inner.phase != Phase::Running {
            return;
        }
        inner.cancel.cancel();
        inner.creates.clear();
        inner.links.clear();
        info!("stop requested; queues cleared");
    }

    /// Drain loop A: activate each pending create, give the dialog time to
    /// open, then confirm it when a save control is present.
    async fn drain_creates(&self, cancel: &CancellationToken) -> CreateStats {
        let mut stats = CreateStats::default();
        loop {
            if cancel.is_cancelled() {
                break;
            }
            let Some(item) = self.inner.lock().await.creates.pop_front() else {
                break;
            };
            if self.surface.activate(item.handle).await {
                stats.activated += 1;
            } else {
                debug!(handle = %item.handle, "create control vanished before activation");
            }
            tokio::time::sleep(self.cfg.step_delay()).await;
            if !self.surface.confirm_dialog().await {
                // Known fragility: nothing to click means the dialog never
                // opened, or the host changed its layout. Not a failure.
                stats.confirms_missing += 1;
                debug!(handle = %item.handle, "save control absent after create activation");
            }
            self.complete_item("create").await;
            tokio::time::sleep(self.cfg.step_delay()).await;
        }
        stats
    }

    /// Drain loop B: resolve every distinct tag name first, wait for the
    /// host to settle, then activate the link buttons in queue order.
    async fn drain_links(&self, cancel: &CancellationToken) -> LinkStats {
        let mut stats = LinkStats::default();

        // Phase 1: sequential resolution, once per distinct name. Order of
        // first occurrence; failures are logged and non-fatal.
        for name in self.distinct_link_names().await {
            if cancel.is_cancelled() {
                break;
            }
            match self.resolver.find_or_create(&name).await {
                Some(id) => {
                    debug!(tag = %name, id = %id, "tag resolved");
                    self.metrics.record_resolve("resolved");
                    stats.resolved += 1;
                }
                None => {
                    warn!(tag = %name, "tag resolution failed");
                    self.metrics.record_resolve("failed");
                    stats.failed += 1;
                }
            }
        }
        if !cancel.is_cancelled() {
            tokio::time::sleep(self.cfg.settle_delay()).await;
        }

        // Phase 2: link everything, resolved or not.
        loop {
            if cancel.is_cancelled() {
                break;
            }
            let Some(item) = self.inner.lock().await.links.pop_front() else {
                break;
            };
            if self.surface.activate(item.handle).await {
                stats.activated += 1;
            } else {
                debug!(handle = %item.handle, "link control vanished before activation");
            }
            self.complete_item("link").await;
            tokio::time::sleep(self.cfg.step_delay()).await;
        }
        stats
    }

    /// Distinct non-empty tag names across the link queue, in order of
    /// first occurrence. Does not consume the queue.
    async fn distinct_link_names(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for link in &inner.links {
            if let Some(name) = &link.tag_name {
                if seen.insert(name.clone()) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    async fn complete_item(&self, queue: &'static str) {
        let percent = {
            let mut inner = self.inner.lock().await;
            if inner.phase != Phase::Running || inner.total == 0 {
                return;
            }
            inner.processed = (inner.processed + 1).min(inner.total);
            inner.processed as f64 / inner.total as f64 * 100.0
        };
        self.surface.set_progress(percent);
        self.metrics.record_item_processed(queue);
    }

    /// Terminal normalization, run unconditionally when both loops exit.
    async fn finish(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.cancel.cancel();
            inner.creates.clear();
            inner.links.clear();
            inner.processed = 0;
            inner.total = 0;
            inner.phase = Phase::Idle;
        }
        self.surface.set_progress(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::watch;

    use crate::surface::DockView;
    use tagflow_model::{
        ActionHandle, CREATE_GROUP_PLACEHOLDER, ControlGroup, EntityId, Snapshot, SnapshotButton,
        TagBadge,
    };

    struct ScriptedSurface {
        snapshot: StdMutex<Snapshot>,
        activated: StdMutex<Vec<ActionHandle>>,
        confirm_present: bool,
        confirmed: AtomicUsize,
        progress: StdMutex<Vec<f64>>,
        changes: watch::Sender<u64>,
    }

    impl ScriptedSurface {
        fn new(snapshot: Snapshot) -> Self {
            Self {
                snapshot: StdMutex::new(snapshot),
                activated: StdMutex::new(Vec::new()),
                confirm_present: true,
                confirmed: AtomicUsize::new(0),
                progress: StdMutex::new(Vec::new()),
                changes: watch::channel(0).0,
            }
        }

        fn activated_count(&self) -> usize {
            self.activated.lock().unwrap().len()
        }

        fn last_progress(&self) -> Option<f64> {
            self.progress.lock().unwrap().last().copied()
        }
    }

    #[async_trait]
    impl Surface for ScriptedSurface {
        fn snapshot(&self) -> Snapshot {
            self.snapshot.lock().unwrap().clone()
        }

        async fn activate(&self, handle: ActionHandle) -> bool {
            self.activated.lock().unwrap().push(handle);
            true
        }

        async fn confirm_dialog(&self) -> bool {
            if self.confirm_present {
                self.confirmed.fetch_add(1, Ordering::SeqCst);
            }
            self.confirm_present
        }

        fn set_progress(&self, percent: f64) {
            self.progress.lock().unwrap().push(percent);
        }

        fn dock_view(&self) -> DockView {
            DockView::default()
        }

        fn apply_dock(&self, _entries: &[String]) {}

        fn changes(&self) -> watch::Receiver<u64> {
            self.changes.subscribe()
        }
    }

    struct CountingResolver {
        calls: StdMutex<Vec<String>>,
        fail: HashSet<String>,
    }

    impl CountingResolver {
        fn new() -> Self {
            Self {
                calls: StdMutex::new(Vec::new()),
                fail: HashSet::new(),
            }
        }

        fn failing(names: &[&str]) -> Self {
            Self {
                calls: StdMutex::new(Vec::new()),
                fail: names.iter().map(|n| n.to_string()).collect(),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Resolver for CountingResolver {
        async fn find_or_create(&self, name: &str) -> Option<EntityId> {
            self.calls.lock().unwrap().push(name.to_string());
            if self.fail.contains(name) {
                None
            } else {
                Some(EntityId::new(format!("id-{name}")))
            }
        }
    }

    struct DenyAll;

    #[async_trait]
    impl ConfirmGate for DenyAll {
        async fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    fn fast_cfg() -> RunnerConfig {
        RunnerConfig {
            step_delay_ms: 1,
            settle_delay_ms: 1,
        }
    }

    fn create_group(ids: &[u64]) -> ControlGroup {
        ControlGroup {
            placeholder: CREATE_GROUP_PLACEHOLDER.into(),
            buttons: ids
                .iter()
                .map(|id| SnapshotButton {
                    handle: ActionHandle::new(*id),
                    disabled: false,
                })
                .collect(),
        }
    }

    fn badge(id: u64, name: Option<&str>) -> TagBadge {
        TagBadge {
            link: ActionHandle::new(id),
            texts: name.map(|n| vec![n.to_string()]).unwrap_or_default(),
        }
    }

    #[tokio::test]
    async fn full_run_resolves_each_name_once() {
        let snapshot = Snapshot {
            groups: vec![create_group(&[1, 2, 3])],
            badges: vec![badge(10, Some("blonde")), badge(11, Some("blonde"))],
            ..Default::default()
        };
        let surface = Arc::new(ScriptedSurface::new(snapshot));
        let resolver = Arc::new(CountingResolver::new());
        let ctrl = Controller::new(surface.clone(), resolver.clone(), fast_cfg());

        let report = ctrl.run(&AutoConfirm).await.unwrap();

        assert_eq!(resolver.calls(), vec!["blonde".to_string()]);
        assert_eq!(report.total, 5);
        assert_eq!(report.processed, 5);
        assert_eq!(report.creates_activated, 3);
        assert_eq!(report.links_activated, 2);
        assert_eq!(surface.confirmed.load(Ordering::SeqCst), 3);
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(ctrl.phase().await, Phase::Idle);

        // Progress hits 100 before the terminal reset to 0.
        let progress = surface.progress.lock().unwrap().clone();
        assert!(progress.contains(&100.0));
        assert_eq!(surface.last_progress(), Some(0.0));
        assert!(progress.iter().all(|p| *p <= 100.0));
    }

    #[tokio::test]
    async fn nameless_badge_is_linked_but_never_resolved() {
        let snapshot = Snapshot {
            badges: vec![badge(20, None)],
            ..Default::default()
        };
        let surface = Arc::new(ScriptedSurface::new(snapshot));
        let resolver = Arc::new(CountingResolver::new());
        let ctrl = Controller::new(surface.clone(), resolver.clone(), fast_cfg());

        let report = ctrl.run(&AutoConfirm).await.unwrap();

        assert!(resolver.calls().is_empty());
        assert_eq!(report.links_activated, 1);
        assert_eq!(report.processed, 1);
    }

    #[tokio::test]
    async fn failed_resolution_does_not_block_linking() {
        let snapshot = Snapshot {
            badges: vec![badge(30, Some("alpha")), badge(31, Some("beta"))],
            ..Default::default()
        };
        let surface = Arc::new(ScriptedSurface::new(snapshot));
        let resolver = Arc::new(CountingResolver::failing(&["alpha"]));
        let ctrl = Controller::new(surface.clone(), resolver.clone(), fast_cfg());

        let report = ctrl.run(&AutoConfirm).await.unwrap();

        assert_eq!(resolver.calls().len(), 2);
        assert_eq!(report.names_failed, 1);
        assert_eq!(report.names_resolved, 1);
        assert_eq!(report.links_activated, 2);
    }

    #[tokio::test]
    async fn declined_confirmation_changes_nothing() {
        let snapshot = Snapshot {
            groups: vec![create_group(&[1])],
            ..Default::default()
        };
        let surface = Arc::new(ScriptedSurface::new(snapshot));
        let ctrl = Controller::new(surface.clone(), Arc::new(CountingResolver::new()), fast_cfg());

        let err = ctrl.run(&DenyAll).await.unwrap_err();

        assert!(matches!(err, CoreError::Declined));
        assert_eq!(ctrl.phase().await, Phase::Idle);
        assert_eq!(surface.activated_count(), 0);
        assert!(surface.progress.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_run_is_rejected() {
        let snapshot = Snapshot {
            groups: vec![create_group(&(1..=20).collect::<Vec<_>>())],
            ..Default::default()
        };
        let surface = Arc::new(ScriptedSurface::new(snapshot));
        let cfg = RunnerConfig {
            step_delay_ms: 20,
            settle_delay_ms: 1,
        };
        let ctrl = Arc::new(Controller::new(
            surface.clone(),
            Arc::new(CountingResolver::new()),
            cfg,
        ));

        let running = ctrl.clone();
        let handle = tokio::spawn(async move { running.run(&AutoConfirm).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = ctrl.run(&AutoConfirm).await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyRunning));

        ctrl.request_stop().await;
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.outcome, RunOutcome::Canceled);
    }

    #[tokio::test]
    async fn stop_discards_queues_and_next_run_starts_fresh() {
        let snapshot = Snapshot {
            groups: vec![create_group(&(1..=20).collect::<Vec<_>>())],
            ..Default::default()
        };
        let surface = Arc::new(ScriptedSurface::new(snapshot));
        let cfg = RunnerConfig {
            step_delay_ms: 20,
            settle_delay_ms: 1,
        };
        let ctrl = Arc::new(Controller::new(
            surface.clone(),
            Arc::new(CountingResolver::new()),
            cfg,
        ));

        let running = ctrl.clone();
        let handle = tokio::spawn(async move { running.run(&AutoConfirm).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctrl.request_stop().await;

        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.outcome, RunOutcome::Canceled);
        assert!(report.processed < report.total);
        assert_eq!(ctrl.phase().await, Phase::Idle);

        // A fresh run rebuilds from the snapshot rather than resuming.
        let before = surface.activated_count();
        let report = ctrl.run(&AutoConfirm).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.total, 20);
        assert_eq!(report.processed, 20);
        assert_eq!(surface.activated_count(), before + 20);
    }
}
