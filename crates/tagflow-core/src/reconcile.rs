//! Level-triggered control reconciliation.
//!
//! The host re-renders its page at will, discarding injected controls. The
//! reconciler subscribes to surface change notifications and re-runs an
//! idempotent "ensure the control is mounted" pass after a debounce, so the
//! control survives re-renders without double-mounting.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use tagflow_model::InsertPosition;

use crate::surface::Surface;

const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Where a mounted control ends up among existing dock entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Insert, then sort all entries alphabetically (case-insensitive).
    #[default]
    Sorted,
    /// Insert before all existing entries.
    Top,
    /// Insert after all existing entries.
    Bottom,
}

impl From<InsertPosition> for Placement {
    fn from(pos: InsertPosition) -> Self {
        match pos {
            InsertPosition::Top => Placement::Top,
            InsertPosition::Bottom => Placement::Bottom,
        }
    }
}

/// Result of a single reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The anchor is not on the current page; nothing to do.
    AnchorAbsent,
    /// The control is already mounted; nothing to do.
    AlreadyMounted,
    /// The control was mounted this pass.
    Mounted,
}

/// Keeps one control mounted next to its anchor across host re-renders.
pub struct ControlReconciler {
    surface: Arc<dyn Surface>,
    label: String,
    placement: Placement,
    debounce: Duration,
}

impl ControlReconciler {
    pub fn new(surface: Arc<dyn Surface>, label: impl Into<String>) -> Self {
        Self {
            surface,
            label: label.into(),
            placement: Placement::default(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// One idempotent pass: mount the control if the anchor is present and
    /// the control is not already there. Absence of the anchor is a no-op,
    /// not an error; the control is only relevant on certain pages.
    pub fn ensure_control(&self) -> ReconcileOutcome {
        let view = self.surface.dock_view();
        if !view.anchor_present {
            trace!(control = %self.label, "anchor absent, skipping mount");
            return ReconcileOutcome::AnchorAbsent;
        }
        if view.entries.iter().any(|e| e == &self.label) {
            return ReconcileOutcome::AlreadyMounted;
        }

        let mut entries = view.entries;
        match self.placement {
            Placement::Sorted => {
                entries.push(self.label.clone());
                entries.sort_by_key(|e| e.to_lowercase());
            }
            Placement::Top => entries.insert(0, self.label.clone()),
            Placement::Bottom => entries.push(self.label.clone()),
        }
        self.surface.apply_dock(&entries);
        debug!(control = %self.label, "control mounted");
        ReconcileOutcome::Mounted
    }

    /// Subscription loop: on every change notification, wait out the
    /// debounce window (coalescing further notifications), then re-run
    /// [`ensure_control`](Self::ensure_control). Runs until cancelled or
    /// the surface drops its change channel.
    pub async fn watch(&self, cancel: CancellationToken) {
        let mut changes = self.surface.changes();
        self.ensure_control();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    tokio::time::sleep(self.debounce).await;
                    // Anything that arrived during the debounce window is
                    // covered by this same pass.
                    changes.borrow_and_update();
                    self.ensure_control();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::sync::watch;

    use crate::surface::DockView;
    use tagflow_model::{ActionHandle, Snapshot};

    struct DockSurface {
        anchor_present: bool,
        entries: StdMutex<Vec<String>>,
        applies: StdMutex<usize>,
        changes: watch::Sender<u64>,
    }

    impl DockSurface {
        fn new(anchor_present: bool, entries: &[&str]) -> Self {
            Self {
                anchor_present,
                entries: StdMutex::new(entries.iter().map(|e| e.to_string()).collect()),
                applies: StdMutex::new(0),
                changes: watch::channel(0).0,
            }
        }
    }

    #[async_trait]
    impl Surface for DockSurface {
        fn snapshot(&self) -> Snapshot {
            Snapshot::default()
        }

        async fn activate(&self, _handle: ActionHandle) -> bool {
            false
        }

        async fn confirm_dialog(&self) -> bool {
            false
        }

        fn set_progress(&self, _percent: f64) {}

        fn dock_view(&self) -> DockView {
            DockView {
                anchor_present: self.anchor_present,
                entries: self.entries.lock().unwrap().clone(),
            }
        }

        fn apply_dock(&self, entries: &[String]) {
            *self.entries.lock().unwrap() = entries.to_vec();
            *self.applies.lock().unwrap() += 1;
        }

        fn changes(&self) -> watch::Receiver<u64> {
            self.changes.subscribe()
        }
    }

    #[test]
    fn mounts_sorted_among_existing_entries() {
        let surface = Arc::new(DockSurface::new(true, &["Alpha", "zulu"]));
        let reconciler = ControlReconciler::new(surface.clone(), "Batch");

        assert_eq!(reconciler.ensure_control(), ReconcileOutcome::Mounted);
        assert_eq!(
            *surface.entries.lock().unwrap(),
            vec!["Alpha".to_string(), "Batch".to_string(), "zulu".to_string()]
        );
    }

    #[test]
    fn repeated_passes_mount_exactly_once() {
        let surface = Arc::new(DockSurface::new(true, &[]));
        let reconciler = ControlReconciler::new(surface.clone(), "Batch");

        assert_eq!(reconciler.ensure_control(), ReconcileOutcome::Mounted);
        assert_eq!(reconciler.ensure_control(), ReconcileOutcome::AlreadyMounted);

        let entries = surface.entries.lock().unwrap();
        assert_eq!(entries.iter().filter(|e| *e == "Batch").count(), 1);
        drop(entries);
        assert_eq!(*surface.applies.lock().unwrap(), 1);
    }

    #[test]
    fn anchor_absent_is_a_noop() {
        let surface = Arc::new(DockSurface::new(false, &[]));
        let reconciler = ControlReconciler::new(surface.clone(), "Batch");

        assert_eq!(reconciler.ensure_control(), ReconcileOutcome::AnchorAbsent);
        assert!(surface.entries.lock().unwrap().is_empty());
        assert_eq!(*surface.applies.lock().unwrap(), 0);
    }

    #[test]
    fn configured_position_maps_onto_placement() {
        assert_eq!(Placement::from(InsertPosition::Top), Placement::Top);
        assert_eq!(Placement::from(InsertPosition::Bottom), Placement::Bottom);
    }

    #[test]
    fn placement_overrides_skip_sorting() {
        let surface = Arc::new(DockSurface::new(true, &["m"]));
        let top = ControlReconciler::new(surface.clone(), "z").with_placement(Placement::Top);
        assert_eq!(top.ensure_control(), ReconcileOutcome::Mounted);
        assert_eq!(*surface.entries.lock().unwrap(), vec!["z".to_string(), "m".to_string()]);

        let bottom =
            ControlReconciler::new(surface.clone(), "a").with_placement(Placement::Bottom);
        assert_eq!(bottom.ensure_control(), ReconcileOutcome::Mounted);
        assert_eq!(
            *surface.entries.lock().unwrap(),
            vec!["z".to_string(), "m".to_string(), "a".to_string()]
        );
    }

    #[tokio::test]
    async fn watch_remounts_after_change_burst() {
        let surface = Arc::new(DockSurface::new(true, &[]));
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            let surface = surface.clone();
            tokio::spawn(async move {
                ControlReconciler::new(surface, "Batch")
                    .with_debounce(Duration::from_millis(5))
                    .watch(cancel)
                    .await;
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;

        // Host re-render wipes the dock, then fires a burst of changes.
        surface.entries.lock().unwrap().clear();
        for rev in 1..=5u64 {
            let _ = surface.changes.send(rev);
        }

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(
            *surface.entries.lock().unwrap(),
            vec!["Batch".to_string()]
        );

        cancel.cancel();
        task.await.unwrap();
    }
}
