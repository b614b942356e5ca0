#![forbid(unsafe_code)]

//! Generic panel: a named decorator host with an ordered pane list.

use std::fmt;
use std::rc::Rc;

use vmkit_core::{DecoratorHost, DecoratorRegistry, Node, ObservableList, ObservableNode};

/// A panel owning an observable list of shared panes.
///
/// Panes are held by `Rc` and compared by identity wherever the panel needs
/// to find one, so two panes with equal contents are still distinct.
pub struct Panel<P> {
    node: ObservableNode,
    decorators: DecoratorRegistry,
    children: ObservableList<Rc<P>>,
}

impl<P> fmt::Debug for Panel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("name", &self.node.name())
            .field("children", &self.children.len())
            .finish()
    }
}

impl<P: 'static> Panel<P> {
    pub const CHILDREN: &'static str = "children";

    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            node: ObservableNode::new(name),
            decorators: DecoratorRegistry::new(),
            children: ObservableList::new(),
        }
    }

    /// The pane list. Mutate it directly; the panel and any attached
    /// layouts observe every change.
    #[must_use]
    pub fn children(&self) -> &ObservableList<Rc<P>> {
        &self.children
    }

    /// Append a pane.
    pub fn add(&self, pane: Rc<P>) {
        self.children.push(pane);
    }

    /// Replace every pane with one `Reset`, then notify `children`.
    pub fn set_children(&self, panes: Vec<Rc<P>>) {
        self.children.reset(panes);
        self.node.on_change(Self::CHILDREN);
    }

    /// Position of `pane` in the list by identity.
    #[must_use]
    pub fn index_of(&self, pane: &Rc<P>) -> Option<usize> {
        self.children.position(|p| Rc::ptr_eq(p, pane))
    }

    #[must_use]
    pub fn contains(&self, pane: &Rc<P>) -> bool {
        self.index_of(pane).is_some()
    }
}

impl<P: 'static> Node for Panel<P> {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl<P: 'static> DecoratorHost for Panel<P> {
    fn decorators(&self) -> &DecoratorRegistry {
        &self.decorators
    }
}
