#![forbid(unsafe_code)]

//! Observable nodes: identity, change notification, and type introspection.
//!
//! [`ObservableNode`] is the unit every view-model is built from. It carries
//! an immutable identity name and an observer list, and offers
//! [`set_property`](ObservableNode::set_property) for equality-gated writes.
//!
//! Node types expose the embedded `ObservableNode` through the [`Node`]
//! trait, which also provides a stable [`NodeType`] tag that an external
//! renderer registry can key on.
//!
//! # Invariants
//!
//! 1. `name` is fixed at construction and never reassigned.
//! 2. `set_property` with a value equal to the stored one is a no-op: no
//!    store, no notification.
//! 3. A write that changes the value notifies exactly once, after the new
//!    value is stored and every internal borrow is released, so observers may
//!    read the node (or write it again) from inside the callback.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::notify::{NodeId, Observers, PropertyChanged, SubscriptionId};

/// Identity plus observer list shared by every view-model node.
pub struct ObservableNode {
    id: NodeId,
    name: Rc<str>,
    observers: Observers<PropertyChanged>,
}

impl fmt::Debug for ObservableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableNode")
            .field("id", &self.id.raw())
            .field("name", &self.name)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ObservableNode {
    /// Create a node with the given identity name.
    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            id: NodeId::next(),
            name: name.into(),
            observers: Observers::new(),
        }
    }

    /// Unique identity, carried by every [`PropertyChanged`] this node emits.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Programmatic name (used for logging and lookup). Not unique.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a property-change observer.
    pub fn subscribe(&self, observer: impl Fn(&PropertyChanged) + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Detach a property-change observer.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Number of attached property-change observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Store `value` into `slot` if it differs from the current value, then
    /// notify `property`. Returns whether a notification fired.
    pub fn set_property<T: PartialEq>(
        &self,
        slot: &RefCell<T>,
        value: T,
        property: &'static str,
    ) -> bool {
        let old = {
            let mut current = slot.borrow_mut();
            if *current == value {
                return false;
            }
            std::mem::replace(&mut *current, value)
        };
        drop(old);
        self.on_change(property);
        true
    }

    /// [`set_property`](Self::set_property) for `Copy` values kept in a `Cell`.
    pub fn set_cell<T: Copy + PartialEq>(
        &self,
        slot: &Cell<T>,
        value: T,
        property: &'static str,
    ) -> bool {
        if slot.get() == value {
            return false;
        }
        slot.set(value);
        self.on_change(property);
        true
    }

    /// Raw notification primitive.
    ///
    /// Derived properties without a backing field use this to announce that
    /// their computed value may have changed.
    pub fn on_change(&self, property: &'static str) {
        tracing::trace!(message = "node.changed", node = %self.name, property);
        self.observers.emit(&PropertyChanged {
            id: self.id,
            node: Rc::clone(&self.name),
            property,
        });
    }
}

/// Stable, introspectable tag for a concrete node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeType {
    id: TypeId,
    name: &'static str,
}

impl NodeType {
    /// Tag for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// `TypeId` of the concrete node type.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, without generic arguments.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Implemented by every view-model node.
pub trait Node: Any {
    /// The embedded observable node.
    fn node(&self) -> &ObservableNode;

    /// Identity name.
    fn name(&self) -> &str {
        self.node().name()
    }

    /// Concrete type tag of the implementing node.
    fn node_type(&self) -> NodeType {
        NodeType::of::<Self>()
    }
}

/// Shared reference to any node, compared by identity.
///
/// Two `NodeRef`s are equal only when they point at the same allocation,
/// which is how pane and window content is compared.
#[derive(Clone)]
pub struct NodeRef(Rc<dyn Node>);

impl NodeRef {
    /// Wrap a shared node.
    #[must_use]
    pub fn new<N: Node>(node: Rc<N>) -> Self {
        Self(node)
    }

    /// The referenced node.
    #[must_use]
    pub fn get(&self) -> &dyn Node {
        &*self.0
    }

    /// Whether the referenced node is of type `N`.
    #[must_use]
    pub fn is<N: Node>(&self) -> bool {
        self.0.node_type().id() == TypeId::of::<N>()
    }

    /// Whether this reference points at the same allocation as `other`.
    #[must_use]
    pub fn points_to<N: Node>(&self, other: &Rc<N>) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(other))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef")
            .field(&self.0.name())
            .field(&self.0.node_type().short_name())
            .finish()
    }
}

impl<N: Node> From<Rc<N>> for NodeRef {
    fn from(node: Rc<N>) -> Self {
        Self::new(node)
    }
}

impl std::ops::Deref for NodeRef {
    type Target = dyn Node;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
