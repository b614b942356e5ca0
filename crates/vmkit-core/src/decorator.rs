#![forbid(unsafe_code)]

//! Type-keyed decorators.
//!
//! A decorator is an optional annotation (a unit string, a numeric range, a
//! "hidden" marker) attached to a node without changing the node's type.
//! Each node that accepts decorators owns one [`DecoratorRegistry`] and
//! implements [`DecoratorHost`].
//!
//! # Invariants
//!
//! 1. A registry holds at most one instance per decorator type.
//! 2. `ensure` returns the stored instance when one exists; it constructs a
//!    default only when none does.
//! 3. Only the host mutates its registry: the registry's insert/remove are
//!    crate-private and reached through [`DecoratorHost`], which notifies the
//!    host's [`DECORATORS`] property on every add or remove. Everyone else
//!    gets a read-only snapshot.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::node::{Node, NodeType, ObservableNode};

/// Property name a host notifies when its decorator set changes.
pub const DECORATORS: &str = "decorators";

/// Marker trait for node types usable as decorators.
pub trait Decorator: Node {}

struct Entry {
    type_id: TypeId,
    any: Rc<dyn Any>,
    decorator: Rc<dyn Decorator>,
}

/// At-most-one-per-type store of decorators, in insertion order.
#[derive(Default)]
pub struct DecoratorRegistry {
    entries: RefCell<Vec<Entry>>,
}

impl fmt::Debug for DecoratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .entries
            .borrow()
            .iter()
            .map(|e| e.decorator.name().to_string())
            .collect();
        f.debug_struct("DecoratorRegistry")
            .field("decorators", &names)
            .finish()
    }
}

impl DecoratorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a decorator of type `D` is present.
    #[must_use]
    pub fn has<D: Decorator>(&self) -> bool {
        self.index_of::<D>().is_some()
    }

    /// The stored decorator of type `D`, if any.
    #[must_use]
    pub fn try_get<D: Decorator>(&self) -> Option<Rc<D>> {
        let entries = self.entries.borrow();
        let entry = entries.iter().find(|e| e.type_id == TypeId::of::<D>())?;
        Rc::clone(&entry.any).downcast::<D>().ok()
    }

    /// Number of decorators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no decorator is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Read-only view of the decorators, in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn Decorator>> {
        self.entries
            .borrow()
            .iter()
            .map(|e| Rc::clone(&e.decorator))
            .collect()
    }

    /// Type tags of the decorators, in insertion order.
    #[must_use]
    pub fn types(&self) -> Vec<NodeType> {
        self.entries
            .borrow()
            .iter()
            .map(|e| e.decorator.node_type())
            .collect()
    }

    /// Existing `D`, or a freshly stored default. The flag is `true` when the
    /// instance was created by this call.
    pub(crate) fn get_or_insert<D: Decorator + Default>(&self) -> (Rc<D>, bool) {
        if let Some(existing) = self.try_get::<D>() {
            return (existing, false);
        }
        let created = Rc::new(D::default());
        self.entries.borrow_mut().push(Entry {
            type_id: TypeId::of::<D>(),
            any: Rc::clone(&created) as Rc<dyn Any>,
            decorator: Rc::clone(&created) as Rc<dyn Decorator>,
        });
        (created, true)
    }

    /// Drop the stored `D`, handing it back if one existed.
    pub(crate) fn remove<D: Decorator>(&self) -> Option<Rc<dyn Decorator>> {
        let mut entries = self.entries.borrow_mut();
        let pos = entries.iter().position(|e| e.type_id == TypeId::of::<D>())?;
        Some(entries.remove(pos).decorator)
    }

    fn index_of<D: Decorator>(&self) -> Option<usize> {
        self.entries
            .borrow()
            .iter()
            .position(|e| e.type_id == TypeId::of::<D>())
    }
}

/// A node that carries a [`DecoratorRegistry`].
///
/// Implementors only supply [`decorators`](Self::decorators); every mutation
/// goes through the provided methods so the host's observers hear about it.
pub trait DecoratorHost: Node {
    /// The host's registry.
    fn decorators(&self) -> &DecoratorRegistry;

    /// Whether a decorator of type `D` is attached.
    fn has_decorator<D: Decorator>(&self) -> bool
    where
        Self: Sized,
    {
        self.decorators().has::<D>()
    }

    /// Return the attached `D`, creating and attaching a default one first if
    /// needed. Calling it twice returns the same instance.
    fn ensure_decorator<D: Decorator + Default>(&self) -> Rc<D>
    where
        Self: Sized,
    {
        let (decorator, created) = self.decorators().get_or_insert::<D>();
        if created {
            tracing::debug!(
                message = "decorator.ensure",
                host = self.name(),
                decorator = decorator.name()
            );
            self.node().on_change(DECORATORS);
        }
        decorator
    }

    /// The attached `D`, if any.
    fn try_get_decorator<D: Decorator>(&self) -> Option<Rc<D>>
    where
        Self: Sized,
    {
        self.decorators().try_get::<D>()
    }

    /// Detach `D`. Returns `true` iff one was attached.
    fn remove_decorator<D: Decorator>(&self) -> bool
    where
        Self: Sized,
    {
        let Some(removed) = self.decorators().remove::<D>() else {
            return false;
        };
        tracing::debug!(
            message = "decorator.remove",
            host = self.name(),
            decorator = removed.name()
        );
        drop(removed);
        self.node().on_change(DECORATORS);
        true
    }

    /// Attach or detach a marker decorator. Returns whether anything changed.
    fn set_marker<D: Decorator + Default>(&self, present: bool) -> bool
    where
        Self: Sized,
    {
        if present {
            if self.has_decorator::<D>() {
                return false;
            }
            self.ensure_decorator::<D>();
            true
        } else {
            self.remove_decorator::<D>()
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in decorators
// ---------------------------------------------------------------------------

/// Marker: the host should not be rendered.
#[derive(Debug)]
pub struct Hidden {
    node: ObservableNode,
}

impl Default for Hidden {
    fn default() -> Self {
        Self {
            node: ObservableNode::new("hidden"),
        }
    }
}

impl Node for Hidden {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl Decorator for Hidden {}

/// Marker: the host is rendered but not editable.
#[derive(Debug)]
pub struct ReadOnly {
    node: ObservableNode,
}

impl Default for ReadOnly {
    fn default() -> Self {
        Self {
            node: ObservableNode::new("read_only"),
        }
    }
}

impl Node for ReadOnly {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl Decorator for ReadOnly {}

/// Display unit appended to a value ("kW", "°C").
#[derive(Debug)]
pub struct Unit {
    node: ObservableNode,
    unit: RefCell<String>,
}

impl Unit {
    pub const UNIT: &'static str = "unit";

    #[must_use]
    pub fn unit(&self) -> String {
        self.unit.borrow().clone()
    }

    pub fn set_unit(&self, unit: impl Into<String>) -> bool {
        self.node.set_property(&self.unit, unit.into(), Self::UNIT)
    }
}

impl Default for Unit {
    fn default() -> Self {
        Self {
            node: ObservableNode::new("unit"),
            unit: RefCell::new(String::new()),
        }
    }
}

impl Node for Unit {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl Decorator for Unit {}

/// Distinguishes the range decorators from one another.
pub trait RangeKind: 'static {
    /// Identity name given to decorators of this kind.
    const NAME: &'static str;
}

/// Hard limits a value must stay within.
#[derive(Debug)]
pub enum Limit {}

impl RangeKind for Limit {
    const NAME: &'static str = "limit_range";
}

/// Band outside of which a value is shown as a warning.
#[derive(Debug)]
pub enum Warning {}

impl RangeKind for Warning {
    const NAME: &'static str = "warning_range";
}

/// Numeric `[minimum, maximum]` annotation; `K` selects its meaning.
pub struct RangeDecorator<K: RangeKind> {
    node: ObservableNode,
    minimum: Cell<f64>,
    maximum: Cell<f64>,
    _kind: PhantomData<K>,
}

pub type LimitRange = RangeDecorator<Limit>;
pub type WarningRange = RangeDecorator<Warning>;

impl<K: RangeKind> RangeDecorator<K> {
    pub const MINIMUM: &'static str = "minimum";
    pub const MAXIMUM: &'static str = "maximum";

    #[must_use]
    pub fn minimum(&self) -> f64 {
        self.minimum.get()
    }

    #[must_use]
    pub fn maximum(&self) -> f64 {
        self.maximum.get()
    }

    pub fn set_minimum(&self, value: f64) -> bool {
        self.node.set_cell(&self.minimum, value, Self::MINIMUM)
    }

    pub fn set_maximum(&self, value: f64) -> bool {
        self.node.set_cell(&self.maximum, value, Self::MAXIMUM)
    }

    /// Set both bounds; returns whether either changed.
    pub fn set_bounds(&self, minimum: f64, maximum: f64) -> bool {
        let a = self.set_minimum(minimum);
        let b = self.set_maximum(maximum);
        a || b
    }

    /// Whether `value` lies within `[minimum, maximum]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum.get() && value <= self.maximum.get()
    }
}

impl<K: RangeKind> Default for RangeDecorator<K> {
    fn default() -> Self {
        Self {
            node: ObservableNode::new(K::NAME),
            minimum: Cell::new(0.0),
            maximum: Cell::new(0.0),
            _kind: PhantomData,
        }
    }
}

impl<K: RangeKind> fmt::Debug for RangeDecorator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeDecorator")
            .field("kind", &K::NAME)
            .field("minimum", &self.minimum.get())
            .field("maximum", &self.maximum.get())
            .finish()
    }
}

impl<K: RangeKind> Node for RangeDecorator<K> {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl<K: RangeKind> Decorator for RangeDecorator<K> {}

/// Number of fractional digits to display.
#[derive(Debug)]
pub struct Precision {
    node: ObservableNode,
    digits: Cell<u32>,
}

impl Precision {
    pub const DIGITS: &'static str = "digits";

    #[must_use]
    pub fn digits(&self) -> u32 {
        self.digits.get()
    }

    pub fn set_digits(&self, digits: u32) -> bool {
        self.node.set_cell(&self.digits, digits, Self::DIGITS)
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            node: ObservableNode::new("precision"),
            digits: Cell::new(0),
        }
    }
}

impl Node for Precision {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl Decorator for Precision {}

/// Increment used by spin/slider editors.
#[derive(Debug)]
pub struct Step {
    node: ObservableNode,
    step: Cell<f64>,
}

impl Step {
    pub const STEP: &'static str = "step";

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step.get()
    }

    pub fn set_step(&self, step: f64) -> bool {
        self.node.set_cell(&self.step, step, Self::STEP)
    }
}

impl Default for Step {
    fn default() -> Self {
        Self {
            node: ObservableNode::new("step"),
            step: Cell::new(0.0),
        }
    }
}

impl Node for Step {
    fn node(&self) -> &ObservableNode {
        &self.node
    }
}

impl Decorator for Step {}
