#![forbid(unsafe_code)]

//! Tab panel with synchronized selection.
//!
//! A [`TabPanel`] exposes its selection two ways: a `selected_index` into the
//! pane list, and the `selected_pane` itself. Either may be set; the other
//! follows. Mutating the pane list re-derives both.
//!
//! # State machine
//!
//! ```text
//!   trigger                       effect
//!   ───────────────────────────   ─────────────────────────────────────────
//!   set_selected_index(i)         pane := panes[i] if in bounds, else None
//!                                 (an out-of-range index is kept as-is)
//!   set_selected_pane(p)          index := position of p by identity;
//!                                 p absent → pane and index both None
//!   list change, pane gone        index := None if list empty, else
//!                                 clamp(prior slot or last, 0..len)
//!   list change, pane present     index := new position of pane
//!   list change, no pane          index := None
//! ```
//!
//! # Invariants
//!
//! 1. Outside a sync, `selected_pane` is `None` or a member of the list.
//! 2. When `selected_pane` is `Some(p)`, `selected_index` is `p`'s position.
//! 3. A sync never re-enters itself. A selection change made by an observer
//!    while a sync is running is queued, and the outermost sync repeats until
//!    no request is pending, so invariants 1 and 2 hold once it returns.
//! 4. Without re-entrant observers, each property is notified at most once
//!    per external mutation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vmkit_core::{
    DecoratorHost, DecoratorRegistry, ListChange, Node, NodeRef, ObservableList, ObservableNode,
};

use crate::panel::Panel;

// ---------------------------------------------------------------------------
// Pane
// ---------------------------------------------------------------------------

/// One tab: content plus header text and icon.
pub struct TabPane {
    node: ObservableNode,
    content: RefCell<Option<NodeRef>>,
    header: RefCell<String>,
    icon: RefCell<String>,
}

impl fmt::Debug for TabPane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabPane")
            .field("name", &self.node.name())
            .field("header", &*self.header.borrow())
            .finish()
    }
}

impl TabPane {
    pub const CONTENT: &'static str = "content";
    pub const HEADER: &'static str = "header";
    pub const ICON: &'static str = "icon";

    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self {
            node: ObservableNode::new(name),
            content: RefCell::new(None),
            header: RefCell::new(String::new()),
            icon: RefCell::new(String::new()),
        }
    }

    #[must_use]
    pub fn with_content(self, content: NodeRef) -> Self {
        *self.content.borrow_mut() = Some(content);
        self
    }

    #[must_use]
    pub fn with_header(self, header: impl Into<String>) -> Self {
        *self.header.borrow_mut() = header.into();
        self
    }

    #[must_use]
    pub fn with_icon(self, icon: impl Into<String>) -> Self {
        *self.icon.borrow_mut() = icon.into();
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
    pub fn header(&self) -> String {
        self.header.borrow().clone()
    }

    pub fn set_header(&self, header: impl Into<String>) -> bool {
        self.node.set_property(&self.header, header.into(), Self::HEADER)
    }

    #[must_use]
    pub fn icon(&self) -> String {
        self.icon.borrow().clone()
    }

    pub fn set_icon(&self, icon: impl Into<String>) -> bool {
        self.node.set_property(&self.icon, icon.into(), Self::ICON)
    }
}

impl Node for TabPane {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

/// What a tab header shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TabHeaderDisplayMode {
    IconOnly,
    TextOnly,
    #[default]
    IconAndText,
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Which side of the selection the other is re-derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncFrom {
    Index,
    Pane,
}

/// Clears the sync flag on drop.
struct SyncGuard<'a>(&'a Cell<bool>);

impl<'a> SyncGuard<'a> {
    /// `None` when a sync is already running.
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A panel of tabs with one selected tab.
pub struct TabPanel {
    panel: Panel<TabPane>,
    selected_index: Cell<Option<usize>>,
    selected_pane: RefCell<Option<Rc<TabPane>>>,
    header_display_mode: Cell<TabHeaderDisplayMode>,
    syncing: Cell<bool>,
    pending: Cell<Option<SyncFrom>>,
}

impl fmt::Debug for TabPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabPanel")
            .field("panel", &self.panel)
            .field("selected_index", &self.selected_index.get())
            .field("selected_pane", &*self.selected_pane.borrow())
            .finish()
    }
}

impl TabPanel {
    pub const SELECTED_INDEX: &'static str = "selected_index";
    pub const SELECTED_PANE: &'static str = "selected_pane";
    pub const HEADER_DISPLAY_MODE: &'static str = "header_display_mode";

    /// Create an empty panel with nothing selected.
    ///
    /// The panel observes its own pane list, so it is handed out behind an
    /// `Rc`.
    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|this: &Weak<Self>| {
            let panel = Panel::new(name);
            let this = this.clone();
            panel
                .children()
                .subscribe(move |change: &ListChange<Rc<TabPane>>| {
                    if let Some(tabs) = this.upgrade() {
                        tabs.on_panes_changed(change);
                    }
                });
            Self {
                panel,
                selected_index: Cell::new(None),
                selected_pane: RefCell::new(None),
                header_display_mode: Cell::new(TabHeaderDisplayMode::default()),
                syncing: Cell::new(false),
                pending: Cell::new(None),
            }
        })
    }

    #[must_use]
    pub fn panel(&self) -> &Panel<TabPane> {
        &self.panel
    }

    #[must_use]
    pub fn panes(&self) -> &ObservableList<Rc<TabPane>> {
        self.panel.children()
    }

    /// Append a pane.
    pub fn add(&self, pane: Rc<TabPane>) {
        self.panel.add(pane);
    }

    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index.get()
    }

    #[must_use]
    pub fn selected_pane(&self) -> Option<Rc<TabPane>> {
        self.selected_pane.borrow().clone()
    }

    /// Select by position. An out-of-range index is stored unchanged and
    /// selects no pane. Returns whether the index changed.
    pub fn set_selected_index(&self, index: Option<usize>) -> bool {
        let changed = self
            .panel
            .node()
            .set_cell(&self.selected_index, index, Self::SELECTED_INDEX);
        if changed {
            self.request_sync(SyncFrom::Index);
        }
        changed
    }

    /// Select a pane. A pane that is not in the list clears the selection.
    /// Returns whether the pane or the index changed.
    pub fn set_selected_pane(&self, pane: Option<Rc<TabPane>>) -> bool {
        let pane = pane.filter(|p| self.panel.contains(p));
        let index_before = self.selected_index.get();
        let pane_changed = self.store_pane(pane);
        self.request_sync(SyncFrom::Pane);
        pane_changed || self.selected_index.get() != index_before
    }

    #[must_use]
    pub fn header_display_mode(&self) -> TabHeaderDisplayMode {
        self.header_display_mode.get()
    }

    pub fn set_header_display_mode(&self, mode: TabHeaderDisplayMode) -> bool {
        self.panel
            .node()
            .set_cell(&self.header_display_mode, mode, Self::HEADER_DISPLAY_MODE)
    }

    // -----------------------------------------------------------------------
    // Sync
    // -----------------------------------------------------------------------

    /// Queue a re-derivation and, unless one is already running, drain the
    /// queue. The latest request wins: it reflects the last selection write.
    fn request_sync(&self, from: SyncFrom) {
        self.pending.set(Some(from));
        let Some(_guard) = SyncGuard::enter(&self.syncing) else {
            return;
        };
        while let Some(from) = self.pending.take() {
            match from {
                SyncFrom::Index => self.pane_from_index(),
                SyncFrom::Pane => self.index_from_pane(),
            }
        }
    }

    fn pane_from_index(&self) {
        let index = self.selected_index.get();
        let pane = index.and_then(|i| self.panes().get(i));
        tracing::debug!(
            message = "tabs.select",
            panel = self.panel.name(),
            index = ?index,
            pane = ?pane.as_ref().map(|p| p.name())
        );
        self.store_pane(pane);
    }

    fn index_from_pane(&self) {
        let pane = self.selected_pane();
        let index = pane.as_ref().and_then(|p| self.panel.index_of(p));
        if pane.is_some() && index.is_none() {
            self.store_pane(None);
        }
        self.panel
            .node()
            .set_cell(&self.selected_index, index, Self::SELECTED_INDEX);
    }

    /// Store `pane` if it differs by identity, then notify.
    fn store_pane(&self, pane: Option<Rc<TabPane>>) -> bool {
        let same = match (&*self.selected_pane.borrow(), &pane) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same {
            return false;
        }
        let old = self.selected_pane.replace(pane);
        drop(old);
        self.panel.node().on_change(Self::SELECTED_PANE);
        true
    }

    fn on_panes_changed(&self, change: &ListChange<Rc<TabPane>>) {
        let lost = self
            .selected_pane()
            .is_some_and(|pane| !self.panel.contains(&pane));
        if !lost {
            self.request_sync(SyncFrom::Pane);
            return;
        }

        let len = self.panes().len();
        let recovered = if len == 0 {
            None
        } else {
            Some(change.old_index().unwrap_or(len - 1).min(len - 1))
        };
        tracing::debug!(
            message = "tabs.recover",
            panel = self.panel.name(),
            change = change.kind(),
            prior = ?self.selected_index.get(),
            recovered = ?recovered
        );
        // The recovered slot may equal the old index (the next pane slid into
        // it), so the pane is re-derived even when the index is unchanged.
        self.panel
            .node()
            .set_cell(&self.selected_index, recovered, Self::SELECTED_INDEX);
        self.request_sync(SyncFrom::Index);
    }
}

impl Node for TabPanel {
    fn node(&self) -> &ObservableNode {
        self.panel.node()
    }
}

impl DecoratorHost for TabPanel {
    fn decorators(&self) -> &DecoratorRegistry {
        self.panel.decorators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    fn pane(name: &str) -> Rc<TabPane> {
        Rc::new(TabPane::new(name).with_header(name))
    }

    fn abc() -> (Rc<TabPanel>, [Rc<TabPane>; 3]) {
        let tabs = TabPanel::new("tabs");
        let panes = [pane("A"), pane("B"), pane("C")];
        for p in &panes {
            tabs.add(Rc::clone(p));
        }
        (tabs, panes)
    }

    fn log_of(tabs: &TabPanel) -> Rc<RefCell<Vec<&'static str>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        tabs.node()
            .subscribe(move |e| sink.borrow_mut().push(e.property));
        log
    }

    fn is(pane: Option<Rc<TabPane>>, expected: &Rc<TabPane>) -> bool {
        pane.is_some_and(|p| Rc::ptr_eq(&p, expected))
    }

    #[test]
    fn starts_unselected() {
        let tabs = TabPanel::new("tabs");
        assert_eq!(tabs.selected_index(), None);
        assert!(tabs.selected_pane().is_none());
        assert_eq!(
            tabs.header_display_mode(),
            TabHeaderDisplayMode::IconAndText
        );
    }

    #[test]
    fn adding_panes_does_not_select() {
        let (tabs, _) = abc();
        assert_eq!(tabs.selected_index(), None);
        assert!(tabs.selected_pane().is_none());
    }

    #[test]
    fn index_drives_pane() {
        let (tabs, [_, b, _]) = abc();
        let log = log_of(&tabs);

        assert!(tabs.set_selected_index(Some(1)));
        assert!(is(tabs.selected_pane(), &b));
        assert_eq!(*log.borrow(), vec!["selected_index", "selected_pane"]);
    }

    #[test]
    fn pane_drives_index() {
        let (tabs, [_, _, c]) = abc();
        let log = log_of(&tabs);

        assert!(tabs.set_selected_pane(Some(Rc::clone(&c))));
        assert_eq!(tabs.selected_index(), Some(2));
        assert_eq!(*log.borrow(), vec!["selected_pane", "selected_index"]);
    }

    #[test]
    fn out_of_range_index_keeps_index_without_pane() {
        let (tabs, _) = abc();
        tabs.set_selected_index(Some(0));
        assert!(tabs.set_selected_index(Some(5)));
        assert_eq!(tabs.selected_index(), Some(5));
        assert!(tabs.selected_pane().is_none());
    }

    #[test]
    fn foreign_pane_clears_selection() {
        let (tabs, [a, _, _]) = abc();
        tabs.set_selected_pane(Some(a));
        assert!(tabs.set_selected_pane(Some(pane("stranger"))));
        assert_eq!(tabs.selected_index(), None);
        assert!(tabs.selected_pane().is_none());
    }

    #[test]
    fn removing_selected_middle_selects_next_in_same_slot() {
        let (tabs, [_, b, c]) = abc();
        tabs.set_selected_pane(Some(Rc::clone(&b)));
        let log = log_of(&tabs);

        assert!(tabs.panes().remove(1).is_some());
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(is(tabs.selected_pane(), &c));
        // Index did not move, so only the pane is announced.
        assert_eq!(*log.borrow(), vec!["selected_pane"]);
    }

    #[test]
    fn removing_selected_last_clamps_to_new_last() {
        let (tabs, [_, b, c]) = abc();
        tabs.set_selected_pane(Some(c));
        tabs.panes().remove(2);
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(is(tabs.selected_pane(), &b));
    }

    #[test]
    fn removing_all_panes_clears_selection() {
        let (tabs, [a, _, _]) = abc();
        tabs.set_selected_pane(Some(a));
        tabs.panes().remove(0);
        tabs.panes().remove(0);
        tabs.panes().remove(0);
        assert_eq!(tabs.selected_index(), None);
        assert!(tabs.selected_pane().is_none());
    }

    #[test]
    fn clear_clears_selection() {
        let (tabs, [_, b, _]) = abc();
        tabs.set_selected_pane(Some(b));
        tabs.panes().clear();
        assert_eq!(tabs.selected_index(), None);
        assert!(tabs.selected_pane().is_none());
    }

    #[test]
    fn reset_without_selected_pane_falls_back_to_last() {
        let (tabs, [a, _, _]) = abc();
        tabs.set_selected_pane(Some(a));
        let x = pane("X");
        let y = pane("Y");
        tabs.panel()
            .set_children(vec![Rc::clone(&x), Rc::clone(&y)]);
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(is(tabs.selected_pane(), &y));
    }

    #[test]
    fn replace_selected_takes_replacement() {
        let (tabs, [_, b, _]) = abc();
        tabs.set_selected_pane(Some(b));
        let z = pane("Z");
        tabs.panes().replace(1, Rc::clone(&z));
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(is(tabs.selected_pane(), &z));
    }

    #[test]
    fn shifting_list_keeps_pane_and_moves_index() {
        let (tabs, [a, b, _]) = abc();
        tabs.set_selected_pane(Some(Rc::clone(&b)));

        tabs.panes().insert(0, pane("first"));
        assert_eq!(tabs.selected_index(), Some(2));
        assert!(is(tabs.selected_pane(), &b));

        tabs.panes().remove(0);
        tabs.panes().move_item(1, 2);
        assert_eq!(tabs.selected_index(), Some(2));
        assert!(is(tabs.selected_pane(), &b));

        // Removing an unselected pane only shifts.
        assert!(tabs.panes().remove_first(|p| Rc::ptr_eq(p, &a)).is_some());
        assert_eq!(tabs.selected_index(), Some(1));
    }

    #[test]
    fn list_change_without_pane_clears_stale_index() {
        let (tabs, _) = abc();
        tabs.set_selected_index(Some(5));
        tabs.add(pane("D"));
        assert_eq!(tabs.selected_index(), None);
    }

    #[test]
    fn repeated_sync_is_idempotent() {
        let (tabs, [_, b, _]) = abc();
        let log = log_of(&tabs);

        tabs.set_selected_index(Some(1));
        assert!(!tabs.set_selected_index(Some(1)));
        assert!(!tabs.set_selected_pane(Some(Rc::clone(&b))));

        assert_eq!(tabs.selected_index(), Some(1));
        assert!(is(tabs.selected_pane(), &b));
        assert_eq!(*log.borrow(), vec!["selected_index", "selected_pane"]);
    }

    #[test]
    fn observer_reading_during_notification_sees_new_state() {
        let (tabs, [_, _, c]) = abc();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        let weak = Rc::downgrade(&tabs);
        tabs.node().subscribe(move |e| {
            if e.is(TabPanel::SELECTED_PANE) {
                if let Some(tabs) = weak.upgrade() {
                    sink.set(tabs.selected_index());
                }
            }
        });

        tabs.set_selected_index(Some(2));
        assert_eq!(seen.get(), Some(2));
        assert!(is(tabs.selected_pane(), &c));
    }

    /// Subscribe `act` to the first `selected_pane` notification only.
    fn once_on_pane_change(tabs: &Rc<TabPanel>, act: impl Fn(&TabPanel) + 'static) {
        let fired = Cell::new(false);
        let weak = Rc::downgrade(tabs);
        tabs.node().subscribe(move |e| {
            if e.is(TabPanel::SELECTED_PANE) && !fired.replace(true) {
                if let Some(tabs) = weak.upgrade() {
                    act(&tabs);
                }
            }
        });
    }

    fn consistent(tabs: &TabPanel) -> bool {
        match tabs.selected_pane() {
            Some(p) => tabs
                .selected_index()
                .and_then(|i| tabs.panes().get(i))
                .is_some_and(|q| Rc::ptr_eq(&p, &q)),
            None => tabs
                .selected_index()
                .is_none_or(|i| i >= tabs.panes().len()),
        }
    }

    #[test]
    fn reselecting_index_inside_notification_wins() {
        let (tabs, [_, _, c]) = abc();
        once_on_pane_change(&tabs, |tabs| {
            tabs.set_selected_index(Some(2));
        });

        tabs.set_selected_index(Some(0));
        assert_eq!(tabs.selected_index(), Some(2));
        assert!(is(tabs.selected_pane(), &c));
    }

    #[test]
    fn reselecting_pane_inside_notification_wins() {
        let (tabs, [_, b, _]) = abc();
        let target = Rc::clone(&b);
        once_on_pane_change(&tabs, move |tabs| {
            tabs.set_selected_pane(Some(Rc::clone(&target)));
        });

        tabs.set_selected_index(Some(2));
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(is(tabs.selected_pane(), &b));
    }

    #[test]
    fn list_mutation_inside_notification_is_resynced() {
        let (tabs, [a, _, _]) = abc();
        once_on_pane_change(&tabs, |tabs| {
            tabs.panes().insert(0, pane("front"));
        });

        tabs.set_selected_index(Some(0));
        assert!(is(tabs.selected_pane(), &a));
        assert_eq!(tabs.selected_index(), Some(1));
        assert!(consistent(&tabs));
    }

    #[test]
    fn header_display_mode_notifies() {
        let tabs = TabPanel::new("tabs");
        let log = log_of(&tabs);
        assert!(tabs.set_header_display_mode(TabHeaderDisplayMode::IconOnly));
        assert!(!tabs.set_header_display_mode(TabHeaderDisplayMode::IconOnly));
        assert_eq!(*log.borrow(), vec!["header_display_mode"]);
    }

    #[test]
    fn pane_properties_notify() {
        let p = TabPane::new("p").with_icon("gear");
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        p.node().subscribe(move |e| sink.borrow_mut().push(e.property));

        assert!(p.set_header("Settings"));
        assert!(!p.set_icon("gear"));
        let content: Rc<TabPane> = Rc::new(TabPane::new("inner"));
        assert!(p.set_content(Some(NodeRef::from(Rc::clone(&content)))));
        assert!(!p.set_content(Some(NodeRef::from(content))));
        assert_eq!(*log.borrow(), vec!["header", "content"]);
    }

    // ── Tracing capture ─────────────────────────────────────────────────

    struct RecoverCapture {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl<S> Layer<S> for RecoverCapture
    where
        S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            struct Msg {
                message: Option<String>,
            }
            impl tracing::field::Visit for Msg {
                fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                    if field.name() == "message" {
                        self.message = Some(value.to_string());
                    }
                }

                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "message" {
                        self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                    }
                }
            }
            let mut msg = Msg { message: None };
            event.record(&mut msg);
            if let Some(message) = msg.message {
                self.messages.lock().expect("trace lock").push(message);
            }
        }
    }

    #[test]
    fn recovery_emits_debug_event() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(RecoverCapture {
            messages: Arc::clone(&messages),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        let (tabs, [_, b, _]) = abc();
        tabs.set_selected_pane(Some(b));
        tabs.panes().remove(1);

        let messages = messages.lock().expect("trace lock");
        assert!(
            messages.iter().any(|m| m == "tabs.recover"),
            "expected tabs.recover event, got {messages:?}"
        );
        assert!(messages.iter().any(|m| m == "tabs.select"));
    }
}
