mod domain;
pub use domain::CREATE_GROUP_PLACEHOLDER;
pub use domain::{ActionHandle, ControlGroup, CreateAffordance, Snapshot, SnapshotButton, TagBadge};
pub use domain::{CreateAction, LinkAction};
pub use domain::{EntityId, RemoteTag};

mod error;
pub use error::{ModelError, ModelResult};

mod config;
pub use config::{AutomationConfig, InsertPosition, RunnerConfig};

mod strategy;
pub use strategy::{JitterStrategy, RetryStrategy};
