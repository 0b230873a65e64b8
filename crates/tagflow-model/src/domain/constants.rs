//! Common model-level constants.
//!
//! Well-known strings shared between the surface layer and the queue
//! builder. Keeping them here avoids scattering magic strings through
//! the codebase.

/// Placeholder text that marks a control group as a pending-create context.
///
/// The queue builder only collects buttons from groups whose placeholder
/// equals this label; groups with any other placeholder belong to unrelated
/// host controls and are ignored.
pub const CREATE_GROUP_PLACEHOLDER: &str = "Create";
