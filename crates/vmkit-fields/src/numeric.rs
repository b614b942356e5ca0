#![forbid(unsafe_code)]

//! Numeric fields with observable bounds.
//!
//! One generic [`NumericField<T>`] covers every numeric representation. The
//! per-type default bounds live in the [`Numeric`] table below rather than
//! in a type per representation: a new field starts with
//! `[T::MIN, T::MAX]`, and callers narrow it as needed.
//!
//! Bounds are descriptive. `set_value` does not clamp; renderers and
//! validators consult [`is_in_range`](NumericField::is_in_range).

use std::cell::Cell;
use std::fmt;
use std::ops::Deref;

use vmkit_core::{DecoratorHost, DecoratorRegistry, Node, ObservableNode};

use crate::field::Field;

/// Numeric value types with their default field bounds.
pub trait Numeric: Copy + PartialOrd + Default + fmt::Debug + 'static {
    /// Default lower bound.
    const MIN: Self;
    /// Default upper bound.
    const MAX: Self;
}

macro_rules! numeric_bounds {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Numeric for $ty {
                const MIN: Self = <$ty>::MIN;
                const MAX: Self = <$ty>::MAX;
            }
        )*
    };
}

numeric_bounds!(i32, u32, i64, u64, f32, f64);

/// A [`Field`] over a numeric type, with `minimum` and `maximum`.
pub struct NumericField<T: Numeric> {
    field: Field<T>,
    minimum: Cell<T>,
    maximum: Cell<T>,
}

impl<T: Numeric> fmt::Debug for NumericField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericField")
            .field("name", &self.field.name())
            .field("value", &self.field.value())
            .field("minimum", &self.minimum.get())
            .field("maximum", &self.maximum.get())
            .finish()
    }
}

impl<T: Numeric> NumericField<T> {
    pub const MINIMUM: &'static str = "minimum";
    pub const MAXIMUM: &'static str = "maximum";

    /// Create a field at `T::default()` with the type's full range.
    #[must_use]
    pub fn new(name: impl Into<std::rc::Rc<str>>) -> Self {
        Self {
            field: Field::new(name),
            minimum: Cell::new(T::MIN),
            maximum: Cell::new(T::MAX),
        }
    }

    /// Narrow the bounds at construction (no notifications).
    #[must_use]
    pub fn with_bounds(self, minimum: T, maximum: T) -> Self {
        self.minimum.set(minimum);
        self.maximum.set(maximum);
        self
    }

    /// Set the initial value at construction (no notifications).
    #[must_use]
    pub fn with_value(self, value: T) -> Self {
        Self {
            field: self.field.with_value(value),
            ..self
        }
    }

    /// The underlying typed field.
    #[must_use]
    pub fn field(&self) -> &Field<T> {
        &self.field
    }

    #[must_use]
    pub fn minimum(&self) -> T {
        self.minimum.get()
    }

    pub fn set_minimum(&self, minimum: T) -> bool {
        self.field
            .node()
            .set_cell(&self.minimum, minimum, Self::MINIMUM)
    }

    #[must_use]
    pub fn maximum(&self) -> T {
        self.maximum.get()
    }

    pub fn set_maximum(&self, maximum: T) -> bool {
        self.field
            .node()
            .set_cell(&self.maximum, maximum, Self::MAXIMUM)
    }

    /// Whether the current value lies within `[minimum, maximum]`.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        let value = self.field.value();
        value >= self.minimum.get() && value <= self.maximum.get()
    }
}

impl<T: Numeric> Deref for NumericField<T> {
    type Target = Field<T>;

    fn deref(&self) -> &Self::Target {
        &self.field
    }
}

impl<T: Numeric> Node for NumericField<T> {
    fn node(&self) -> &ObservableNode {
        self.field.node()
    }
}

impl<T: Numeric> DecoratorHost for NumericField<T> {
    fn decorators(&self) -> &DecoratorRegistry {
        self.field.decorators()
    }
}
