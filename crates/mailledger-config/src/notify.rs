//! Change notifications.
//!
//! Listeners run synchronously, in registration order, after every mutation
//! that actually changed something. A listener may return [`Flow::Stop`] to
//! keep the remaining listeners from seeing the event.

use std::fmt;

use crate::hash::Handle;
use crate::set::ConfigSet;

/// What happened to a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Value was set.
    Set,
    /// Value was reset to its default, or an overlay went back to inheriting.
    Reset,
    /// The variable's default was replaced.
    InitialSet,
    /// An overlay is about to be removed.
    Deleted,
}

/// A change, as seen by listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEvent {
    /// Entry that changed.
    pub handle: Handle,
    /// Its full name, e.g. `Quince` or `work:Quince`.
    pub name: String,
    /// What happened.
    pub kind: EventKind,
}

/// Whether later listeners should see the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Pass the event on.
    #[default]
    Continue,
    /// Stop here.
    Stop,
}

/// Identifies a registered listener, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Listener callback.
pub type Listener = Box<dyn FnMut(&ConfigSet, &ConfigEvent) -> Flow>;

/// Ordered set of listeners.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(id, _)| id))
            .finish()
    }
}

impl Listeners {
    /// Appends a listener.
    pub fn add(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(i, _)| *i != id);
        self.entries.len() != before
    }

    /// Number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Calls each listener in order until one stops the event.
    pub(crate) fn dispatch(&mut self, cs: &ConfigSet, event: &ConfigEvent) {
        for (id, listener) in &mut self.entries {
            if listener(cs, event) == Flow::Stop {
                tracing::trace!(listener = id.0, variable = %event.name, "Listener stopped event");
                break;
            }
        }
    }
}
