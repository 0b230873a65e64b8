use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to a clickable control inside a surface snapshot.
///
/// Handles are transient: they are only meaningful against the snapshot
/// (and the live surface) that produced them, and are discarded once the
/// control has been activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionHandle(u64);

impl ActionHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A point-in-time view of the actionable controls the host currently
/// renders.
///
/// The surface produces these; the queue builder and the completion sweep
/// consume them. A snapshot is plain data: taking one has no side effects,
/// and an empty snapshot is a valid one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    /// Control groups that may contain pending create buttons.
    pub groups: Vec<ControlGroup>,
    /// Tag badges with a link button and the badge's text fragments.
    pub badges: Vec<TagBadge>,
    /// Per-item creation affordances for entities the host reports missing.
    pub affordances: Vec<CreateAffordance>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.badges.is_empty() && self.affordances.is_empty()
    }
}

/// A button group together with its adjacent placeholder text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlGroup {
    pub placeholder: String,
    pub buttons: Vec<SnapshotButton>,
}

/// A single button inside a control group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotButton {
    pub handle: ActionHandle,
    #[serde(default)]
    pub disabled: bool,
}

/// A tag badge: a link button plus the badge's text fragments in display
/// order. The display name lives in a sibling text fragment, not inside
/// the button itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagBadge {
    pub link: ActionHandle,
    #[serde(default)]
    pub texts: Vec<String>,
}

impl TagBadge {
    /// The badge's display name: the first non-empty text fragment, trimmed.
    /// `None` when the badge carries no usable text.
    pub fn display_name(&self) -> Option<String> {
        self.texts
            .iter()
            .map(|t| t.trim())
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }
}

/// A host-rendered "create this missing entry" control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAffordance {
    pub handle: ActionHandle,
    /// Button title; affordances are recognized by this containing "create".
    pub title: String,
    /// Display name of the entry the affordance would create.
    pub name: String,
}

/// Pending create action, built from an enabled button in a create group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAction {
    pub handle: ActionHandle,
}

/// Pending tag-link action. `tag_name` is `None` when the badge had no
/// extractable text; such items are still queued and activated, they just
/// never participate in resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAction {
    pub handle: ActionHandle,
    pub tag_name: Option<String>,
}
