#![forbid(unsafe_code)]

//! Observable ordered list.
//!
//! [`ObservableList<T>`] is the child collection behind panels and option
//! sets. Every mutation stores first, releases its borrow, then emits one
//! [`ListChange`] describing what happened, so a handler may read or mutate
//! the list again from inside the callback (the nested mutation completes
//! before the outer call returns).
//!
//! Items are cloned into events; lists hold `Rc` handles or small values.

use std::cell::RefCell;
use std::fmt;

use crate::notify::{Observers, SubscriptionId};

/// A single mutation of an [`ObservableList`].
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<T> {
    /// `item` was inserted at `index`.
    Insert { index: usize, item: T },
    /// `item` was removed from `index`.
    Remove { index: usize, item: T },
    /// The item at `index` was swapped from `old` to `new`.
    Replace { index: usize, old: T, new: T },
    /// An item moved from `from` to `to`.
    Move { from: usize, to: usize },
    /// The whole contents were replaced.
    Reset,
}

impl<T> ListChange<T> {
    /// Position an item left from, if the change took one out.
    ///
    /// `Remove` and `Replace` report their index, `Move` its source; inserts
    /// and resets have none.
    #[must_use]
    pub fn old_index(&self) -> Option<usize> {
        match self {
            Self::Remove { index, .. } | Self::Replace { index, .. } => Some(*index),
            Self::Move { from, .. } => Some(*from),
            Self::Insert { .. } | Self::Reset => None,
        }
    }

    /// Short label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
            Self::Move { .. } => "move",
            Self::Reset => "reset",
        }
    }

    /// Whether the change can have taken an item out of the list.
    #[must_use]
    pub const fn may_remove(&self) -> bool {
        !matches!(self, Self::Insert { .. } | Self::Move { .. })
    }
}

/// An ordered `Vec` that notifies observers of every mutation.
pub struct ObservableList<T> {
    items: RefCell<Vec<T>>,
    observers: Observers<ListChange<T>>,
}

impl<T> Default for ObservableList<T> {
    fn default() -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            observers: Observers::new(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &*self.items.borrow())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<T: Clone> ObservableList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a list holding `items` (no notification).
    #[must_use]
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            observers: Observers::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Clone of the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    /// Clone of the first item.
    #[must_use]
    pub fn first(&self) -> Option<T> {
        self.get(0)
    }

    /// Clone of the last item.
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.items.borrow().last().cloned()
    }

    /// Clone of the whole contents.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    /// Borrow the contents for the duration of `f`.
    ///
    /// `f` must not mutate this list.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.borrow())
    }

    /// Index of the first item matching `pred`.
    pub fn position(&self, pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.borrow().iter().position(pred)
    }

    /// Whether any item matches `pred`.
    pub fn any(&self, pred: impl FnMut(&T) -> bool) -> bool {
        self.items.borrow().iter().any(pred)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Append `item`.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(item.clone());
            items.len() - 1
        };
        self.emit(ListChange::Insert { index, item });
    }

    /// Insert `item` at `index`. Returns `false` (and does nothing) when
    /// `index > len`.
    pub fn insert(&self, index: usize, item: T) -> bool {
        {
            let mut items = self.items.borrow_mut();
            if index > items.len() {
                return false;
            }
            items.insert(index, item.clone());
        }
        self.emit(ListChange::Insert { index, item });
        true
    }

    /// Remove and return the item at `index`.
    pub fn remove(&self, index: usize) -> Option<T> {
        let item = {
            let mut items = self.items.borrow_mut();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.emit(ListChange::Remove {
            index,
            item: item.clone(),
        });
        Some(item)
    }

    /// Remove and return the first item matching `pred`.
    pub fn remove_first(&self, pred: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.position(pred)?;
        self.remove(index)
    }

    /// Replace the item at `index`, returning the previous one.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let old = {
            let mut items = self.items.borrow_mut();
            let slot = items.get_mut(index)?;
            std::mem::replace(slot, item.clone())
        };
        self.emit(ListChange::Replace {
            index,
            old: old.clone(),
            new: item,
        });
        Some(old)
    }

    /// Move the item at `from` so that it ends up at `to`.
    pub fn move_item(&self, from: usize, to: usize) -> bool {
        {
            let mut items = self.items.borrow_mut();
            if from >= items.len() || to >= items.len() {
                return false;
            }
            if from == to {
                return true;
            }
            let item = items.remove(from);
            items.insert(to, item);
        }
        self.emit(ListChange::Move { from, to });
        true
    }

    /// Replace the whole contents with `items`.
    pub fn reset(&self, items: Vec<T>) {
        let old = std::mem::replace(&mut *self.items.borrow_mut(), items);
        drop(old);
        self.emit(ListChange::Reset);
    }

    /// Remove every item (a `Reset`).
    pub fn clear(&self) {
        self.reset(Vec::new());
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Attach a change observer.
    pub fn subscribe(&self, observer: impl Fn(&ListChange<T>) + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Detach a change observer.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of attached change observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn emit(&self, change: ListChange<T>) {
        tracing::trace!(
            message = "list.changed",
            kind = change.kind(),
            len = self.len()
        );
        self.observers.emit(&change);
    }
}
