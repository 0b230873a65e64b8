//! Work-queue construction from a surface snapshot.

use std::collections::VecDeque;

use tagflow_model::{CREATE_GROUP_PLACEHOLDER, CreateAction, LinkAction, Snapshot};

/// The two ordered queues a run drains. Order matches snapshot order.
#[derive(Debug, Default)]
pub struct WorkQueues {
    pub creates: VecDeque<CreateAction>,
    pub links: VecDeque<LinkAction>,
}

impl WorkQueues {
    pub fn total(&self) -> usize {
        self.creates.len() + self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.links.is_empty()
    }
}

/// Scan a snapshot for actionable elements and materialize both queues.
///
/// Create queue: enabled buttons of groups whose placeholder equals the
/// create label. Link queue: one item per tag badge, with the display name
/// taken from the badge's first non-empty text fragment; badges without a
/// usable name are still queued with `tag_name: None`.
///
/// Pure function: no side effects, and a snapshot with nothing actionable
/// yields empty queues rather than an error.
pub fn build_queues(snapshot: &Snapshot) -> WorkQueues {
    let mut queues = WorkQueues::default();

    for group in &snapshot.groups {
        if group.placeholder != CREATE_GROUP_PLACEHOLDER {
            continue;
        }
        for button in &group.buttons {
            if button.disabled {
                continue;
            }
            queues.creates.push_back(CreateAction {
                handle: button.handle,
            });
        }
    }

    for badge in &snapshot.badges {
        queues.links.push_back(LinkAction {
            handle: badge.link,
            tag_name: badge.display_name(),
        });
    }

    queues
}
