pub mod completion;
pub mod controller;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod reconcile;
pub mod resolver;
pub mod surface;

pub use completion::{CompletionReport, CompletionSweep};
pub use controller::{AutoConfirm, ConfirmGate, Controller, Phase, RunReport};
pub use error::CoreError;
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, RunOutcome, noop_metrics};
pub use queue::{WorkQueues, build_queues};
pub use reconcile::{ControlReconciler, Placement, ReconcileOutcome};
pub use resolver::Resolver;
pub use surface::{DockView, Surface};

pub mod prelude {
    pub use crate::completion::CompletionSweep;
    pub use crate::controller::{AutoConfirm, ConfirmGate, Controller, Phase};
    pub use crate::error::CoreError;
    pub use crate::reconcile::ControlReconciler;
    pub use crate::resolver::Resolver;
    pub use crate::surface::Surface;
}
