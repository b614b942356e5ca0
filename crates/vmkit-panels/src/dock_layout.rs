#![forbid(unsafe_code)]

//! Mount/unmount adapter that keeps a dock panel's render order current.
//!
//! A renderer attaches a [`DockLayout`] when it mounts a [`DockPanel`] and
//! detaches it when it unmounts. While attached, the layout observes the
//! pane list and every pane's `position`, and rebuilds its ordered pane list
//! whenever either changes. Renderers observe the layout's `order` property
//! instead of the raw panel.
//!
//! # Invariants
//!
//! 1. While attached, [`order`](DockLayout::order) equals
//!    [`DockPanel::render_order`] after every list or position change.
//! 2. Exactly one position subscription is held per pane entry in the list.
//! 3. After [`detach`](DockLayout::detach) the layout holds no subscription
//!    on the panel or on any pane.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use vmkit_core::{ListChange, Node, ObservableNode, SubscriptionId};

use crate::dock::{DockPane, DockPanel, render_order};

struct Attachment {
    panel: Rc<DockPanel>,
    list_subscription: SubscriptionId,
    panes: Vec<(Rc<DockPane>, SubscriptionId)>,
}

/// Ordered view of an attached [`DockPanel`].
pub struct DockLayout {
    node: ObservableNode,
    this: Weak<DockLayout>,
    attachment: RefCell<Option<Attachment>>,
    order: RefCell<Vec<Rc<DockPane>>>,
}

impl fmt::Debug for DockLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockLayout")
            .field("name", &self.node.name())
            .field("attached", &self.is_attached())
            .field("order", &self.order.borrow().len())
            .finish()
    }
}

impl DockLayout {
    pub const ORDER: &'static str = "order";

    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|this| Self {
            node: ObservableNode::new(name),
            this: this.clone(),
            attachment: RefCell::new(None),
            order: RefCell::new(Vec::new()),
        })
    }

    /// Start observing `panel`, detaching from any previous panel first.
    pub fn attach(&self, panel: &Rc<DockPanel>) {
        self.detach();

        let this = self.this.clone();
        let list_subscription = panel
            .children()
            .subscribe(move |change: &ListChange<Rc<DockPane>>| {
                if let Some(layout) = this.upgrade() {
                    layout.on_panes_changed(change);
                }
            });
        let panes = panel
            .children()
            .snapshot()
            .into_iter()
            .map(|pane| self.track(pane))
            .collect();

        *self.attachment.borrow_mut() = Some(Attachment {
            panel: Rc::clone(panel),
            list_subscription,
            panes,
        });
        self.rebuild("attach");
    }

    /// Release every subscription and clear the order.
    pub fn detach(&self) {
        let Some(attachment) = self.attachment.borrow_mut().take() else {
            return;
        };
        attachment
            .panel
            .children()
            .unsubscribe(attachment.list_subscription);
        for (pane, id) in attachment.panes {
            pane.node().unsubscribe(id);
        }

        let had_panes = !self.order.borrow().is_empty();
        self.order.borrow_mut().clear();
        if had_panes {
            self.node.on_change(Self::ORDER);
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attachment.borrow().is_some()
    }

    /// Panes in render order as of the last rebuild.
    #[must_use]
    pub fn order(&self) -> Vec<Rc<DockPane>> {
        self.order.borrow().clone()
    }

    /// The pane receiving fill behavior.
    #[must_use]
    pub fn fill_pane(&self) -> Option<Rc<DockPane>> {
        self.order.borrow().last().cloned()
    }

    /// Number of panes whose position is being observed.
    #[must_use]
    pub fn tracked_panes(&self) -> usize {
        self.attachment
            .borrow()
            .as_ref()
            .map_or(0, |a| a.panes.len())
    }

    fn track(&self, pane: Rc<DockPane>) -> (Rc<DockPane>, SubscriptionId) {
        let this = self.this.clone();
        let id = pane.node().subscribe(move |event| {
            if event.is(DockPane::POSITION) {
                if let Some(layout) = this.upgrade() {
                    layout.rebuild("position");
                }
            }
        });
        (pane, id)
    }

    fn untrack(&self, pane: &Rc<DockPane>) {
        let removed = {
            let mut attachment = self.attachment.borrow_mut();
            let Some(attachment) = attachment.as_mut() else {
                return;
            };
            attachment
                .panes
                .iter()
                .position(|(p, _)| Rc::ptr_eq(p, pane))
                .map(|i| attachment.panes.remove(i))
        };
        if let Some((pane, id)) = removed {
            pane.node().unsubscribe(id);
        }
    }

    fn untrack_all(&self) {
        let panes = match self.attachment.borrow_mut().as_mut() {
            Some(attachment) => std::mem::take(&mut attachment.panes),
            None => return,
        };
        for (pane, id) in panes {
            pane.node().unsubscribe(id);
        }
    }

    fn push_tracked(&self, pane: Rc<DockPane>) {
        let entry = self.track(pane);
        if let Some(attachment) = self.attachment.borrow_mut().as_mut() {
            attachment.panes.push(entry);
        } else {
            entry.0.node().unsubscribe(entry.1);
        }
    }

    fn on_panes_changed(&self, change: &ListChange<Rc<DockPane>>) {
        match change {
            ListChange::Insert { item, .. } => self.push_tracked(Rc::clone(item)),
            ListChange::Remove { item, .. } => self.untrack(item),
            ListChange::Replace { old, new, .. } => {
                self.untrack(old);
                self.push_tracked(Rc::clone(new));
            }
            ListChange::Move { .. } => {}
            ListChange::Reset => {
                self.untrack_all();
                let current = match self.attachment.borrow().as_ref() {
                    Some(attachment) => attachment.panel.children().snapshot(),
                    None => return,
                };
                for pane in current {
                    self.push_tracked(pane);
                }
            }
        }
        self.rebuild(change.kind());
    }

    fn rebuild(&self, cause: &'static str) {
        let panes = match self.attachment.borrow().as_ref() {
            Some(attachment) => attachment.panel.children().snapshot(),
            None => return,
        };
        let order = render_order(&panes);
        tracing::debug!(
            message = "dock.layout.rebuild",
            layout = self.node.name(),
            cause,
            panes = order.len(),
            fill = ?order.last().map(|p| p.name())
        );
        let old = self.order.replace(order);
        drop(old);
        self.node.on_change(Self::ORDER);
    }
}

impl Node for DockLayout {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl Drop for DockLayout {
    fn drop(&mut self) {
        if let Some(attachment) = self.attachment.get_mut().take() {
            attachment
                .panel
                .children()
                .unsubscribe(attachment.list_subscription);
            for (pane, id) in attachment.panes {
                pane.node().unsubscribe(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::DockPosition;
    use std::cell::Cell;

    fn pane(name: &str, position: DockPosition) -> Rc<DockPane> {
        Rc::new(DockPane::new(name).with_position(position))
    }

    fn names(panes: &[Rc<DockPane>]) -> Vec<String> {
        panes.iter().map(|p| p.name().to_string()).collect()
    }

    fn xyz() -> (Rc<DockPanel>, [Rc<DockPane>; 3]) {
        let dock = Rc::new(DockPanel::new("dock"));
        let panes = [
            pane("X", DockPosition::Left),
            pane("Y", DockPosition::Center),
            pane("Z", DockPosition::Bottom),
        ];
        for p in &panes {
            dock.add(Rc::clone(p));
        }
        (dock, panes)
    }

    #[test]
    fn attach_builds_initial_order() {
        let (dock, _) = xyz();
        let layout = DockLayout::new("layout");
        layout.attach(&dock);

        assert!(layout.is_attached());
        assert_eq!(names(&layout.order()), vec!["X", "Z", "Y"]);
        assert_eq!(layout.tracked_panes(), 3);
        assert_eq!(
            layout.fill_pane().map(|p| p.name().to_string()),
            Some("Y".to_string())
        );
    }

    #[test]
    fn list_mutations_rebuild_order() {
        let (dock, [_, y, _]) = xyz();
        let layout = DockLayout::new("layout");
        layout.attach(&dock);

        dock.add(pane("T", DockPosition::Top));
        assert_eq!(names(&layout.order()), vec!["X", "Z", "T", "Y"]);
        assert_eq!(layout.tracked_panes(), 4);

        dock.children().remove_first(|p| Rc::ptr_eq(p, &y));
        assert_eq!(names(&layout.order()), vec!["X", "Z", "T"]);
        assert_eq!(layout.tracked_panes(), 3);
        assert_eq!(y.node().observer_count(), 0);

        dock.children().replace(0, pane("W", DockPosition::Center));
        assert_eq!(names(&layout.order()), vec!["Z", "T", "W"]);

        dock.children().move_item(1, 2);
        assert_eq!(names(&layout.order()), vec!["T", "Z", "W"]);

        dock.set_children(vec![pane("only", DockPosition::Right)]);
        assert_eq!(names(&layout.order()), vec!["only"]);
        assert_eq!(layout.tracked_panes(), 1);
    }

    #[test]
    fn position_change_rebuilds_and_notifies() {
        let (dock, [x, _, _]) = xyz();
        let layout = DockLayout::new("layout");
        layout.attach(&dock);

        let rebuilds = Rc::new(Cell::new(0));
        let sink = Rc::clone(&rebuilds);
        layout.node().subscribe(move |e| {
            if e.is(DockLayout::ORDER) {
                sink.set(sink.get() + 1);
            }
        });

        x.set_position(DockPosition::Center);
        assert_eq!(names(&layout.order()), vec!["Z", "X", "Y"]);
        assert_eq!(rebuilds.get(), 1);

        // Content changes do not reorder.
        x.set_content(None);
        x.node().on_change(DockPane::CONTENT);
        assert_eq!(rebuilds.get(), 1);
    }

    #[test]
    fn detach_releases_every_subscription() {
        let (dock, panes) = xyz();
        let layout = DockLayout::new("layout");
        layout.attach(&dock);
        assert_eq!(dock.children().observer_count(), 1);

        layout.detach();
        assert!(!layout.is_attached());
        assert!(layout.order().is_empty());
        assert_eq!(dock.children().observer_count(), 0);
        for p in &panes {
            assert_eq!(p.node().observer_count(), 0);
        }

        // Mutations after detach no longer reach the layout.
        dock.add(pane("late", DockPosition::Top));
        assert!(layout.order().is_empty());
    }

    #[test]
    fn reattach_moves_to_new_panel() {
        let (first, first_panes) = xyz();
        let second = Rc::new(DockPanel::new("second"));
        second.add(pane("S", DockPosition::Center));

        let layout = DockLayout::new("layout");
        layout.attach(&first);
        layout.attach(&second);

        assert_eq!(first.children().observer_count(), 0);
        assert_eq!(first_panes[0].node().observer_count(), 0);
        assert_eq!(names(&layout.order()), vec!["S"]);
    }

    #[test]
    fn dropping_layout_unsubscribes() {
        let (dock, panes) = xyz();
        let layout = DockLayout::new("layout");
        layout.attach(&dock);
        drop(layout);

        assert_eq!(dock.children().observer_count(), 0);
        assert_eq!(panes[1].node().observer_count(), 0);
    }

    #[test]
    fn duplicate_pane_entries_are_tracked_individually() {
        let dock = Rc::new(DockPanel::new("dock"));
        let shared = pane("twice", DockPosition::Left);
        dock.add(Rc::clone(&shared));
        dock.add(Rc::clone(&shared));

        let layout = DockLayout::new("layout");
        layout.attach(&dock);
        assert_eq!(shared.node().observer_count(), 2);

        dock.children().remove(0);
        assert_eq!(shared.node().observer_count(), 1);
        assert_eq!(layout.order().len(), 1);
    }
}
