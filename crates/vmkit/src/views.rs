#![forbid(unsafe_code)]

//! Node type → renderer association.
//!
//! View-models do not render. A UI layer registers one or more renderers per
//! concrete node type and resolves them from a live node through
//! [`Node::node_type`]. The renderer type `R` is whatever the UI layer uses:
//! a factory closure, a widget id, a template name.

use std::any::TypeId;
use std::fmt;

use ahash::AHashMap;
use vmkit_core::{Node, NodeType};

struct Entry<R> {
    node_type: NodeType,
    renderers: Vec<R>,
}

/// Registry of renderers keyed by concrete node type.
pub struct ViewRegistry<R> {
    entries: AHashMap<TypeId, Entry<R>>,
}

impl<R> Default for ViewRegistry<R> {
    fn default() -> Self {
        Self {
            entries: AHashMap::new(),
        }
    }
}

impl<R> fmt::Debug for ViewRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self
            .entries
            .values()
            .map(|e| (e.node_type.short_name(), e.renderers.len()))
            .collect();
        types.sort_unstable();
        f.debug_struct("ViewRegistry").field("types", &types).finish()
    }
}

impl<R> ViewRegistry<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `renderer` with node type `N`. Later registrations for the
    /// same type are kept after earlier ones.
    pub fn register<N: Node>(&mut self, renderer: R) -> &mut Self {
        let node_type = NodeType::of::<N>();
        let entry = self.entries.entry(node_type.id()).or_insert_with(|| Entry {
            node_type,
            renderers: Vec::new(),
        });
        entry.renderers.push(renderer);
        tracing::debug!(
            message = "views.register",
            node_type = node_type.short_name(),
            renderers = entry.renderers.len()
        );
        self
    }

    /// Every renderer registered for `node`'s concrete type, in
    /// registration order.
    #[must_use]
    pub fn renderers_for(&self, node: &dyn Node) -> &[R] {
        self.renderers_for_type(node.node_type())
    }

    #[must_use]
    pub fn renderers_for_type(&self, node_type: NodeType) -> &[R] {
        self.entries
            .get(&node_type.id())
            .map(|e| e.renderers.as_slice())
            .unwrap_or(&[])
    }

    /// The first renderer registered for `node`'s type.
    #[must_use]
    pub fn resolve(&self, node: &dyn Node) -> Option<&R> {
        self.renderers_for(node).first()
    }

    #[must_use]
    pub fn is_registered<N: Node>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<N>())
    }

    /// Number of node types with at least one renderer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
