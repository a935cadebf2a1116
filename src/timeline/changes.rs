/*!
 * Change records and batched delivery to listeners.
 *
 * Mutations append records to a pending batch; the batch is handed to every
 * listener in one call when the logical operation that produced it ends.
 */

use log::trace;
use std::fmt;

use crate::caption::{CaptionId, StoredCaption};

/// One change made to a timeline.
///
/// Caption payloads are snapshots taken when the change was recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// The whole list was replaced
    Reload,
    /// A caption was inserted before `before` (or at the end when `None`).
    ///
    /// `before` is the caption that follows the new one in the list once the
    /// batch is applied in order. It is not always the caption passed to
    /// `insert_before`: making room in front of the first caption can move
    /// that caption behind its successor.
    Insert {
        caption: StoredCaption,
        before: Option<CaptionId>,
    },
    /// Fields of a caption changed
    Update { caption: StoredCaption },
    /// A caption was removed
    Remove { caption: StoredCaption },
}

impl Change {
    /// Caption the change is about, `None` for a reload
    pub fn caption(&self) -> Option<&StoredCaption> {
        match self {
            Change::Reload => None,
            Change::Insert { caption, .. }
            | Change::Update { caption }
            | Change::Remove { caption } => Some(caption),
        }
    }

    /// Short name of the change type
    pub fn kind(&self) -> &'static str {
        match self {
            Change::Reload => "reload",
            Change::Insert { .. } => "insert",
            Change::Update { .. } => "update",
            Change::Remove { .. } => "remove",
        }
    }
}

/// Receives batches of changes
pub trait ChangeListener {
    fn on_changes(&mut self, changes: &[Change]);
}

impl<F> ChangeListener for F
where
    F: FnMut(&[Change]),
{
    fn on_changes(&mut self, changes: &[Change]) {
        self(changes)
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Pending changes plus the listeners they are delivered to
#[derive(Default)]
pub(crate) struct ChangeBatch {
    pending: Vec<Change>,
    listeners: Vec<(ListenerId, Box<dyn ChangeListener>)>,
    next_listener: u64,
}

impl fmt::Debug for ChangeBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBatch")
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ChangeBatch {
    pub(crate) fn subscribe(&mut self, listener: Box<dyn ChangeListener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn record(&mut self, change: Change) {
        trace!("Recorded {} change", change.kind());
        self.pending.push(change);
    }

    /// Deliver the pending batch to every listener
    pub(crate) fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let changes = std::mem::take(&mut self.pending);
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_changes(&changes);
        }
    }
}
