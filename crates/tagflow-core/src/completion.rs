//! Missing-entry completion sweep.
//!
//! Unlike the resolver, which talks to the catalog API directly, the sweep
//! drives the host's own per-item creation controls: it discovers the
//! create affordances the host already renders for missing entries and
//! activates them one by one, gated by a single confirmation prompt naming
//! every target.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use tagflow_model::{AutomationConfig, CreateAffordance};

use crate::controller::ConfirmGate;
use crate::error::CoreError;
use crate::surface::Surface;

const DEFAULT_STEP_DELAY_MS: u64 = 500;

/// Counters for a finished sweep.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub discovered: usize,
    pub activated: usize,
}

/// Batch-activates the host's "create missing entry" controls.
pub struct CompletionSweep {
    surface: Arc<dyn Surface>,
    cfg: AutomationConfig,
    step_delay: Duration,
}

impl CompletionSweep {
    pub fn new(surface: Arc<dyn Surface>, cfg: AutomationConfig) -> Self {
        Self {
            surface,
            cfg,
            step_delay: Duration::from_millis(DEFAULT_STEP_DELAY_MS),
        }
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Create affordances in the current snapshot, recognized by their
    /// title containing "create" (case-insensitive).
    pub fn discover(&self) -> Vec<CreateAffordance> {
        self.surface
            .snapshot()
            .affordances
            .into_iter()
            .filter(|a| a.title.to_lowercase().contains("create"))
            .collect()
    }

    /// Entry point for embedded activation (page load, surface change):
    /// runs the sweep only when `auto_create` is enabled. Explicit
    /// invocations call [`run`](Self::run) directly instead.
    pub async fn run_if_auto(&self, gate: &dyn ConfirmGate) -> Result<CompletionReport, CoreError> {
        if !self.cfg.auto_create {
            debug!("auto-create disabled, skipping sweep");
            return Ok(CompletionReport::default());
        }
        self.run(gate).await
    }

    /// Discover targets, confirm once, then activate each sequentially.
    ///
    /// No targets is a successful no-op. A declined confirmation aborts
    /// with nothing activated.
    pub async fn run(&self, gate: &dyn ConfirmGate) -> Result<CompletionReport, CoreError> {
        let targets = self.discover();
        if targets.is_empty() {
            debug!("no missing entries discovered");
            return Ok(CompletionReport::default());
        }

        if self.cfg.require_confirmation {
            let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
            let prompt = format!(
                "Create {} missing entries: {}?",
                targets.len(),
                names.join(", ")
            );
            if !gate.confirm(&prompt).await {
                info!("completion sweep declined");
                return Err(CoreError::Declined);
            }
        }

        let mut activated = 0;
        for target in &targets {
            if self.surface.activate(target.handle).await {
                activated += 1;
            } else {
                debug!(entry = %target.name, "creation control vanished before activation");
            }
            tokio::time::sleep(self.step_delay).await;
        }

        info!(discovered = targets.len(), activated, "completion sweep finished");
        Ok(CompletionReport {
            discovered: targets.len(),
            activated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::sync::watch;

    use crate::controller::AutoConfirm;
    use crate::surface::DockView;
    use tagflow_model::{ActionHandle, Snapshot};

    struct AffordanceSurface {
        snapshot: Snapshot,
        activated: StdMutex<Vec<ActionHandle>>,
        changes: watch::Sender<u64>,
    }

    impl AffordanceSurface {
        fn new(affordances: Vec<CreateAffordance>) -> Self {
            Self {
                snapshot: Snapshot {
                    affordances,
                    ..Default::default()
                },
                activated: StdMutex::new(Vec::new()),
                changes: watch::channel(0).0,
            }
        }
    }

    #[async_trait]
    impl Surface for AffordanceSurface {
        fn snapshot(&self) -> Snapshot {
            self.snapshot.clone()
        }

        async fn activate(&self, handle: ActionHandle) -> bool {
            self.activated.lock().unwrap().push(handle);
            true
        }

        async fn confirm_dialog(&self) -> bool {
            false
        }

        fn set_progress(&self, _percent: f64) {}

        fn dock_view(&self) -> DockView {
            DockView::default()
        }

        fn apply_dock(&self, _entries: &[String]) {}

        fn changes(&self) -> watch::Receiver<u64> {
            self.changes.subscribe()
        }
    }

    struct DenyAll;

    #[async_trait]
    impl ConfirmGate for DenyAll {
        async fn confirm(&self, _prompt: &str) -> bool {
            false
        }
    }

    struct PromptCapture(StdMutex<Option<String>>);

    #[async_trait]
    impl ConfirmGate for PromptCapture {
        async fn confirm(&self, prompt: &str) -> bool {
            *self.0.lock().unwrap() = Some(prompt.to_string());
            true
        }
    }

    fn affordance(id: u64, title: &str, name: &str) -> CreateAffordance {
        CreateAffordance {
            handle: ActionHandle::new(id),
            title: title.into(),
            name: name.into(),
        }
    }

    fn fast(surface: Arc<AffordanceSurface>, cfg: AutomationConfig) -> CompletionSweep {
        CompletionSweep::new(surface, cfg).with_step_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn discovers_only_create_affordances() {
        let surface = Arc::new(AffordanceSurface::new(vec![
            affordance(1, "Create tag", "alpha"),
            affordance(2, "Edit entry", "beta"),
            affordance(3, "CREATE performer", "gamma"),
        ]));
        let sweep = fast(surface, AutomationConfig::default());

        let targets = sweep.discover();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "gamma"]);
    }

    #[tokio::test]
    async fn prompt_names_every_target() {
        let surface = Arc::new(AffordanceSurface::new(vec![
            affordance(1, "Create tag", "alpha"),
            affordance(2, "Create tag", "beta"),
        ]));
        let sweep = fast(surface.clone(), AutomationConfig::default());
        let gate = PromptCapture(StdMutex::new(None));

        let report = sweep.run(&gate).await.unwrap();

        assert_eq!(report.discovered, 2);
        assert_eq!(report.activated, 2);
        let prompt = gate.0.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("alpha"));
        assert!(prompt.contains("beta"));
        assert_eq!(surface.activated.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn declined_sweep_activates_nothing() {
        let surface = Arc::new(AffordanceSurface::new(vec![affordance(
            1,
            "Create tag",
            "alpha",
        )]));
        let sweep = fast(surface.clone(), AutomationConfig::default());

        let err = sweep.run(&DenyAll).await.unwrap_err();

        assert!(matches!(err, CoreError::Declined));
        assert!(surface.activated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn confirmation_is_skipped_when_disabled() {
        let surface = Arc::new(AffordanceSurface::new(vec![affordance(
            1,
            "Create tag",
            "alpha",
        )]));
        let cfg = AutomationConfig {
            require_confirmation: false,
            ..Default::default()
        };
        let sweep = fast(surface.clone(), cfg);

        // DenyAll would veto if it were consulted.
        let report = sweep.run(&DenyAll).await.unwrap();
        assert_eq!(report.activated, 1);
    }

    #[tokio::test]
    async fn auto_run_honors_the_auto_create_flag() {
        let surface = Arc::new(AffordanceSurface::new(vec![affordance(
            1,
            "Create tag",
            "alpha",
        )]));

        let off = fast(surface.clone(), AutomationConfig::default());
        let report = off.run_if_auto(&AutoConfirm).await.unwrap();
        assert_eq!(report.activated, 0);
        assert!(surface.activated.lock().unwrap().is_empty());

        let cfg = AutomationConfig {
            auto_create: true,
            ..Default::default()
        };
        let on = fast(surface.clone(), cfg);
        let report = on.run_if_auto(&AutoConfirm).await.unwrap();
        assert_eq!(report.activated, 1);
    }

    #[tokio::test]
    async fn empty_discovery_is_a_noop() {
        let surface = Arc::new(AffordanceSurface::new(Vec::new()));
        let sweep = fast(surface, AutomationConfig::default());

        let report = sweep.run(&AutoConfirm).await.unwrap();
        assert_eq!(report.discovered, 0);
        assert_eq!(report.activated, 0);
    }
}
