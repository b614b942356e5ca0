#![forbid(unsafe_code)]

//! Typed field view-model.
//!
//! A [`Field<T>`] wraps one value plus the UI metadata a form renderer needs:
//! a display name, a description (tooltip text), and two independent flags.
//! `is_hidden` means "do not render"; `is_read_only` means "render, but do
//! not allow edits". Neither implies the other.

use std::cell::{Cell, RefCell};
use std::fmt;

use bitflags::bitflags;
use vmkit_core::{DecoratorHost, DecoratorRegistry, Node, ObservableNode};

bitflags! {
    /// UI state flags of a field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// Kept in application logic but not rendered.
        const HIDDEN = 1 << 0;
        /// Rendered but not editable.
        const READ_ONLY = 1 << 1;
    }
}

/// A named, observable value with display metadata and decorators.
pub struct Field<T> {
    node: ObservableNode,
    decorators: DecoratorRegistry,
    value: RefCell<T>,
    display_name: RefCell<String>,
    description: RefCell<String>,
    flags: Cell<FieldFlags>,
}

impl<T: fmt::Debug> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.node.name())
            .field("value", &*self.value.borrow())
            .field("flags", &self.flags.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + Default + 'static> Field<T> {
    /// Create a field holding `T::default()`.
    #[must_use]
    pub fn new(name: impl Into<std::rc::Rc<str>>) -> Self {
        Self::with_initial(name, T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Field<T> {
    pub const VALUE: &'static str = "value";
    pub const DISPLAY_NAME: &'static str = "display_name";
    pub const DESCRIPTION: &'static str = "description";
    pub const IS_HIDDEN: &'static str = "is_hidden";
    pub const IS_READ_ONLY: &'static str = "is_read_only";

    /// Create a field holding `value`.
    #[must_use]
    pub fn with_initial(name: impl Into<std::rc::Rc<str>>, value: T) -> Self {
        Self {
            node: ObservableNode::new(name),
            decorators: DecoratorRegistry::new(),
            value: RefCell::new(value),
            display_name: RefCell::new(String::new()),
            description: RefCell::new(String::new()),
            flags: Cell::new(FieldFlags::empty()),
        }
    }

    // -----------------------------------------------------------------------
    // Construction-time configuration (no notifications)
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn with_value(self, value: T) -> Self {
        *self.value.borrow_mut() = value;
        self
    }

    #[must_use]
    pub fn with_display_name(self, display_name: impl Into<String>) -> Self {
        *self.display_name.borrow_mut() = display_name.into();
        self
    }

    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        *self.description.borrow_mut() = description.into();
        self
    }

    #[must_use]
    pub fn with_hidden(self, hidden: bool) -> Self {
        let mut flags = self.flags.get();
        flags.set(FieldFlags::HIDDEN, hidden);
        self.flags.set(flags);
        self
    }

    #[must_use]
    pub fn with_read_only(self, read_only: bool) -> Self {
        let mut flags = self.flags.get();
        flags.set(FieldFlags::READ_ONLY, read_only);
        self.flags.set(flags);
        self
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn value(&self) -> T {
        self.value.borrow().clone()
    }

    /// Borrow the value without cloning. `f` must not write this field.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    pub fn set_value(&self, value: T) -> bool {
        self.node.set_property(&self.value, value, Self::VALUE)
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        self.display_name.borrow().clone()
    }

    pub fn set_display_name(&self, display_name: impl Into<String>) -> bool {
        self.node
            .set_property(&self.display_name, display_name.into(), Self::DISPLAY_NAME)
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.description.borrow().clone()
    }

    pub fn set_description(&self, description: impl Into<String>) -> bool {
        self.node
            .set_property(&self.description, description.into(), Self::DESCRIPTION)
    }

    #[must_use]
    pub fn flags(&self) -> FieldFlags {
        self.flags.get()
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.flags.get().contains(FieldFlags::HIDDEN)
    }

    pub fn set_hidden(&self, hidden: bool) -> bool {
        self.set_flag(FieldFlags::HIDDEN, hidden, Self::IS_HIDDEN)
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.flags.get().contains(FieldFlags::READ_ONLY)
    }

    pub fn set_read_only(&self, read_only: bool) -> bool {
        self.set_flag(FieldFlags::READ_ONLY, read_only, Self::IS_READ_ONLY)
    }

    fn set_flag(&self, flag: FieldFlags, on: bool, property: &'static str) -> bool {
        let mut next = self.flags.get();
        next.set(flag, on);
        self.node.set_cell(&self.flags, next, property)
    }
}

impl<T: 'static> Node for Field<T> {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl<T: 'static> DecoratorHost for Field<T> {
    fn decorators(&self) -> &DecoratorRegistry {
        &self.decorators
    }
}
