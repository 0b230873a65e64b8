//! Abstraction over the host UI the automation acts against.
//!
//! The host page is an external collaborator with no stable contract; this
//! trait is the seam that keeps the engine testable. Concrete adapters sit
//! outside this crate (the CLI ships a plan surface fed from a captured
//! snapshot, tests use scripted surfaces).

use async_trait::async_trait;
use tokio::sync::watch;

use tagflow_model::{ActionHandle, Snapshot};

/// View of the control dock used by the reconciler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DockView {
    /// Whether the anchor element is present on the current page.
    pub anchor_present: bool,
    /// Labels of the controls currently mounted, in display order.
    pub entries: Vec<String>,
}

/// The host UI as seen by the engine.
///
/// Absence is never an error on this interface: activating a vanished
/// handle or confirming a dialog that never opened returns `false` and the
/// host page is left untouched.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Current actionable controls. Taking a snapshot has no side effects.
    fn snapshot(&self) -> Snapshot;

    /// Activate (click) a control. `false` when the handle no longer
    /// resolves to anything on the page.
    async fn activate(&self, handle: ActionHandle) -> bool;

    /// Locate the save control of the dialog opened by the most recent
    /// create activation and activate it. `false` when no such control is
    /// present.
    async fn confirm_dialog(&self) -> bool;

    /// Report run progress to the host indicator, `0.0..=100.0`.
    fn set_progress(&self, percent: f64);

    /// Dock state for control reconciliation.
    fn dock_view(&self) -> DockView;

    /// Replace the dock entries with `entries` (mount and reorder in one
    /// step). Entries the host does not know are mounted fresh.
    fn apply_dock(&self, entries: &[String]);

    /// Change notifications. The value is a revision counter the host bumps
    /// on every re-render; receivers only care that it moved.
    fn changes(&self) -> watch::Receiver<u64>;
}
