#![forbid(unsafe_code)]

//! Observer lists and change events.
//!
//! [`Observers<E>`] is the fan-out primitive every node and list is built on.
//! A callback is held strongly from [`subscribe`](Observers::subscribe) until
//! the subscriber hands its [`SubscriptionId`] back to
//! [`unsubscribe`](Observers::unsubscribe). Nothing is released implicitly: an
//! adapter that stops observing without unsubscribing keeps being called.
//!
//! # Invariants
//!
//! 1. Observers are notified in registration order.
//! 2. Emission walks a snapshot of the list, so a callback may subscribe,
//!    unsubscribe, or cause a nested emission on the same list without a
//!    borrow panic.
//! 3. A callback removed while an emission is in flight still receives that
//!    emission (it was in the snapshot) and none after it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle returned by [`Observers::subscribe`], used to detach later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value (unique per observer list).
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Process-unique identity of an [`ObservableNode`], assigned at
/// construction. Names may repeat; ids never do.
///
/// [`ObservableNode`]: crate::node::ObservableNode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

impl NodeId {
    pub(crate) fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A property-change notification emitted by an [`ObservableNode`].
///
/// [`ObservableNode`]: crate::node::ObservableNode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChanged {
    /// Identity of the node that changed.
    pub id: NodeId,
    /// Name of the node that changed.
    pub node: Rc<str>,
    /// Name of the property that changed.
    pub property: &'static str,
}

impl PropertyChanged {
    /// Whether this notification is for `property`.
    #[must_use]
    pub fn is(&self, property: &str) -> bool {
        self.property == property
    }
}

type Callback<E> = Rc<dyn Fn(&E)>;

/// Ordered list of callbacks for events of type `E`.
pub struct Observers<E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.len())
            .finish()
    }
}

impl<E> Observers<E> {
    /// Create an empty observer list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Register `observer`; it is called for every emission until
    /// [`unsubscribe`](Self::unsubscribe) is called with the returned id.
    pub fn subscribe(&self, observer: impl Fn(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Detach the observer registered under `id`.
    ///
    /// Returns `false` if `id` was never issued by this list or has already
    /// been released.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(pos) => {
                entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of attached observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no observer is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Deliver `event` to every observer, synchronously and in order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }
}
