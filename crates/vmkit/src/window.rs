#![forbid(unsafe_code)]

//! Root desktop window view-model.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vmkit_core::{DecoratorHost, DecoratorRegistry, Node, NodeRef, ObservableNode};

use crate::settings::AppSettings;

/// Top-level window: a title, one child node, and the shared settings.
pub struct DesktopWindow {
    node: ObservableNode,
    decorators: DecoratorRegistry,
    title: RefCell<String>,
    child: RefCell<Option<NodeRef>>,
    settings: Rc<AppSettings>,
}

impl fmt::Debug for DesktopWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesktopWindow")
            .field("name", &self.node.name())
            .field("title", &*self.title.borrow())
            .field("child", &*self.child.borrow())
            .finish()
    }
}

impl DesktopWindow {
    pub const TITLE: &'static str = "title";
    pub const CHILD: &'static str = "child";

    #[must_use]
    pub fn new(name: impl Into<Rc<str>>, settings: Rc<AppSettings>) -> Self {
        Self {
            node: ObservableNode::new(name),
            decorators: DecoratorRegistry::new(),
            title: RefCell::new(String::new()),
            child: RefCell::new(None),
            settings,
        }
    }

    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        *self.title.borrow_mut() = title.into();
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Rc<AppSettings> {
        &self.settings
    }

    #[must_use]
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) -> bool {
        self.node.set_property(&self.title, title.into(), Self::TITLE)
    }

    #[must_use]
    pub fn child(&self) -> Option<NodeRef> {
        self.child.borrow().clone()
    }

    /// Replace the root content. Compared by identity.
    pub fn set_child(&self, child: Option<NodeRef>) -> bool {
        self.node.set_property(&self.child, child, Self::CHILD)
    }
}

impl Node for DesktopWindow {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl DecoratorHost for DesktopWindow {
    fn decorators(&self) -> &DecoratorRegistry {
        &self.decorators
    }
}
