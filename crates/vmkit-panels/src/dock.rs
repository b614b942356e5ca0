#![forbid(unsafe_code)]

//! Dock panel: panes tagged with an edge or the center.
//!
//! The panel stores panes in collection order and does not police how many
//! are `Center`. Render order is derived: every non-center pane in
//! collection order, then every center pane in collection order. The last
//! pane in that order fills the remaining space.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use vmkit_core::{Node, NodeRef, ObservableNode};

use crate::panel::Panel;

/// Where a dock pane attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DockPosition {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl DockPosition {
    #[must_use]
    pub const fn is_center(self) -> bool {
        matches!(self, Self::Center)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// A pane docked at a [`DockPosition`].
pub struct DockPane {
    node: ObservableNode,
    content: RefCell<Option<NodeRef>>,
    position: Cell<DockPosition>,
}

impl fmt::Debug for DockPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockPane")
            .field("name", &self.node.name())
            .field("position", &self.position.get())
            .finish()
    }
}

impl DockPane {
    pub const CONTENT: &'static str = "content";
    pub const POSITION: &'static str = "position";

    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            node: ObservableNode::new(name),
            content: RefCell::new(None),
            position: Cell::new(DockPosition::default()),
        }
    }

    #[must_use]
    pub fn with_content(self, content: NodeRef) -> Self {
        *self.content.borrow_mut() = Some(content);
        self
    }

    #[must_use]
    pub fn with_position(self, position: DockPosition) -> Self {
        self.position.set(position);
        self
    }

    #[must_use]
    pub fn content(&self) -> Option<NodeRef> {
        self.content.borrow().clone()
    }

    pub fn set_content(&self, content: Option<NodeRef>) -> bool {
        self.node.set_property(&self.content, content, Self::CONTENT)
    }

    #[must_use]
    pub fn position(&self) -> DockPosition {
        self.position.get()
    }

    pub fn set_position(&self, position: DockPosition) -> bool {
        self.node.set_cell(&self.position, position, Self::POSITION)
    }
}

impl Node for DockPane {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

/// Panel of [`DockPane`]s.
pub type DockPanel = Panel<DockPane>;

impl Panel<DockPane> {
    /// Panes in render order: non-center first, then center, each group in
    /// collection order.
    #[must_use]
    pub fn render_order(&self) -> Vec<Rc<DockPane>> {
        render_order(&self.children().snapshot())
    }

    /// The pane that receives fill behavior: the last in render order.
    #[must_use]
    pub fn fill_pane(&self) -> Option<Rc<DockPane>> {
        self.render_order().pop()
    }
}

pub(crate) fn render_order(panes: &[Rc<DockPane>]) -> Vec<Rc<DockPane>> {
    let (centers, mut order): (Vec<_>, Vec<_>) = panes
        .iter()
        .cloned()
        .partition(|pane| pane.position().is_center());
    order.extend(centers);
    order
}
