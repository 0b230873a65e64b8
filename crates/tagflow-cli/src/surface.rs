use std::{fs, path::Path};

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info};

use tagflow_core::{DockView, Surface};
use tagflow_model::{ActionHandle, Snapshot};

/// Surface over a captured snapshot file.
///
/// There is no live host page on the command line; this surface replays
/// what a run would do against the captured state, logging each activation
/// instead of clicking anything. Remote resolver calls still happen for
/// real, so `run` against a plan surface creates tags but touches nothing
/// host-side.
pub struct PlanSurface {
    snapshot: Snapshot,
    changes: watch::Sender<u64>,
}

impl PlanSurface {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            changes: watch::channel(0).0,
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot file {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_str(&text)
            .with_context(|| format!("parsing snapshot file {}", path.display()))?;
        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl Surface for PlanSurface {
    fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    async fn activate(&self, handle: ActionHandle) -> bool {
        info!(handle = %handle, "would activate control");
        true
    }

    async fn confirm_dialog(&self) -> bool {
        info!("would confirm dialog");
        true
    }

    fn set_progress(&self, percent: f64) {
        debug!(percent, "progress");
    }

    fn dock_view(&self) -> DockView {
        DockView::default()
    }

    fn apply_dock(&self, _entries: &[String]) {}

    fn changes(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}
