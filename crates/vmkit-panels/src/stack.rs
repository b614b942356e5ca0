#![forbid(unsafe_code)]

//! Stack panel: panes laid out one after another, no selection.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vmkit_core::{Node, NodeRef, ObservableNode};

use crate::panel::Panel;

/// A pane in a [`StackPanel`].
pub struct StackPane {
    node: ObservableNode,
    content: RefCell<Option<NodeRef>>,
}

impl fmt::Debug for StackPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackPane")
            .field("name", &self.node.name())
            .field("content", &*self.content.borrow())
            .finish()
    }
}

impl StackPane {
    pub const CONTENT: &'static str = "content";

    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            node: ObservableNode::new(name),
            content: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn with_content(self, content: NodeRef) -> Self {
        *self.content.borrow_mut() = Some(content);
        self
    }

    #[must_use]
    pub fn content(&self) -> Option<NodeRef> {
        self.content.borrow().clone()
    }

    pub fn set_content(&self, content: Option<NodeRef>) -> bool {
        self.node.set_property(&self.content, content, Self::CONTENT)
    }
}

impl Node for StackPane {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

/// Panel of [`StackPane`]s.
pub type StackPanel = Panel<StackPane>;
