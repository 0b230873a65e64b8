mod constants;
mod entity;
mod snapshot;

pub use constants::CREATE_GROUP_PLACEHOLDER;
pub use entity::{EntityId, RemoteTag};
pub use snapshot::{
    ActionHandle, ControlGroup, CreateAction, CreateAffordance, LinkAction, Snapshot,
    SnapshotButton, TagBadge,
};
