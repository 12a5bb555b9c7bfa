//! Change notification
//!
//! Connections buffer the statements they add and remove and publish them
//! at commit, one aggregated event per direction.

use super::types::Quad;
use std::fmt;
use std::sync::Arc;

/// Statements changed by one committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SailChangeEvent {
    StatementsAdded(Vec<Quad>),
    StatementsRemoved(Vec<Quad>),
}

impl SailChangeEvent {
    pub fn statements(&self) -> &[Quad] {
        match self {
            SailChangeEvent::StatementsAdded(quads) | SailChangeEvent::StatementsRemoved(quads) => quads,
        }
    }

    pub fn is_addition(&self) -> bool {
        matches!(self, SailChangeEvent::StatementsAdded(_))
    }
}

/// Receives committed changes, synchronously and in registration order
pub trait SailChangedListener: Send + Sync {
    fn statements_changed(&self, event: &SailChangeEvent);
}

/// Handle returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

/// Registered listeners in registration order
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, Arc<dyn SailChangedListener>)>,
}

impl ListenerRegistry {
    pub(crate) fn add(&mut self, listener: Arc<dyn SailChangedListener>) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Snapshot so listeners run without the registry locked
    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn SailChangedListener>> {
        self.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
    }
}
