#![forbid(unsafe_code)]

//! Option-set (radio) field.
//!
//! A [`RadioField<T>`] is a [`Field<T>`] whose value should always be one of
//! the values in an observable list of [`RadioOption`]s. The field watches
//! its own option list and repairs the value when the list changes under it.
//!
//! # State machine
//!
//! ```text
//!   option list event        action
//!   ───────────────────      ─────────────────────────────────────────────
//!   Insert / Move            none (a valid value stays valid)
//!   Remove / Replace / Reset ensure_value_is_valid():
//!                              value matches an option  → keep
//!                              options non-empty        → first option's value
//!                              options empty            → T::default()
//! ```
//!
//! The repair goes through [`set_value`](RadioField::set_value), so observers
//! see `value` followed by `selected_option`, exactly once each.
//!
//! `RadioField<T>` derefs to its [`Field<T>`] for metadata (display name,
//! flags, decorators). Value writes must use the inherent
//! [`RadioField::set_value`]; `Field::set_value` reached through the deref
//! does not announce `selected_option`.
//!
//! # Invariants
//!
//! 1. After any remove/replace/reset, `value` equals some option's value, or
//!    `T::default()` when there are no options.
//! 2. The selected option is derived by value lookup; it is never stored.
//! 3. [`add_option`](RadioField::add_option) never creates a second option
//!    with an equal value.
//! 4. Selecting an option that is not in the list is rejected with
//!    [`VmError::InvariantViolation`]; it is never coerced. This includes the
//!    initial value passed to [`with_options`](RadioField::with_options).

use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use vmkit_core::{
    DecoratorHost, DecoratorRegistry, ListChange, Node, ObservableList, ObservableNode, Result,
    VmError,
};

use crate::field::Field;

/// One selectable entry: a display label and the value it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioOption<T> {
    label: String,
    value: T,
}

impl<T> RadioOption<T> {
    #[must_use]
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }
}

/// A field constrained to the values of an observable option list.
pub struct RadioField<T> {
    field: Field<T>,
    options: ObservableList<RadioOption<T>>,
}

impl<T: fmt::Debug> fmt::Debug for RadioField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadioField")
            .field("field", &self.field)
            .field("options", &self.options)
            .finish()
    }
}

impl<T> RadioField<T>
where
    T: Clone + PartialEq + Default + fmt::Debug + 'static,
{
    pub const SELECTED_OPTION: &'static str = "selected_option";

    /// Create an empty option set holding `T::default()`.
    ///
    /// The field subscribes to its own option list, so it is handed out
    /// behind an `Rc`.
    #[must_use]
    pub fn new(name: impl Into<Rc<str>>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|this: &Weak<Self>| {
            let options = ObservableList::new();
            let this = this.clone();
            options.subscribe(move |change: &ListChange<RadioOption<T>>| {
                if let Some(field) = this.upgrade() {
                    field.on_options_changed(change);
                }
            });
            Self {
                field: Field::new(name),
                options,
            }
        })
    }

    /// Create an option set from `(label, value)` pairs, selecting `value`.
    ///
    /// Fails with [`VmError::DuplicateKey`] on a repeated option value and
    /// with [`VmError::InvariantViolation`] when `value` is not among them.
    pub fn with_options(
        name: impl Into<Rc<str>>,
        options: impl IntoIterator<Item = (String, T)>,
        value: T,
    ) -> Result<Rc<Self>> {
        let field = Self::new(name);
        for (label, option_value) in options {
            field.add_option(label, option_value)?;
        }
        field.select_value(&value)?;
        Ok(field)
    }

    /// The option list. Direct mutations are observed and trigger the same
    /// re-validation as the managed API.
    #[must_use]
    pub fn options(&self) -> &ObservableList<RadioOption<T>> {
        &self.options
    }

    #[must_use]
    pub fn value(&self) -> T {
        self.field.value()
    }

    /// Store `value`; on change, notifies `value` then `selected_option`.
    pub fn set_value(&self, value: T) -> bool {
        if self.field.set_value(value) {
            self.field.node().on_change(Self::SELECTED_OPTION);
            true
        } else {
            false
        }
    }

    /// The option whose value equals the current value.
    #[must_use]
    pub fn selected_option(&self) -> Option<RadioOption<T>> {
        let value = self.field.value();
        self.options
            .with(|options| options.iter().find(|o| o.value == value).cloned())
    }

    /// Select `option`, or clear to `T::default()` with `None`.
    ///
    /// Returns whether the value changed.
    pub fn set_selected_option(&self, option: Option<&RadioOption<T>>) -> Result<bool> {
        let Some(option) = option else {
            return Ok(self.set_value(T::default()));
        };
        if !self.options.any(|o| o == option) {
            return Err(self.reject(&option.value, "selected option not in list"));
        }
        Ok(self.set_value(option.value.clone()))
    }

    /// Select the option whose value equals `value`.
    ///
    /// Fails with [`VmError::InvariantViolation`] when no option carries it.
    pub fn select_value(&self, value: &T) -> Result<bool> {
        let option = self
            .options
            .with(|options| options.iter().find(|o| &o.value == value).cloned());
        match option {
            Some(option) => Ok(self.set_value(option.value)),
            None => Err(self.reject(value, "no option with this value")),
        }
    }

    /// Append an option. Fails without touching the list if an option with
    /// an equal value already exists.
    pub fn add_option(&self, label: impl Into<String>, value: T) -> Result<()> {
        if self.options.any(|o| o.value == value) {
            tracing::warn!(
                message = "radio.rejected",
                field = self.field.name(),
                reason = "duplicate option value",
                value = ?value
            );
            return Err(VmError::duplicate(self.field.name(), format!("{value:?}")));
        }
        self.options.push(RadioOption::new(label, value));
        Ok(())
    }

    /// Remove the first option whose value equals `value`. Returns whether
    /// one was removed.
    pub fn remove_option(&self, value: &T) -> bool {
        self.options.remove_first(|o| &o.value == value).is_some()
    }

    /// Make `value` valid against the current options. Returns whether the
    /// value had to change.
    pub fn ensure_value_is_valid(&self) -> bool {
        let current = self.field.value();
        if self.options.any(|o| o.value == current) {
            return false;
        }
        let next = self
            .options
            .first()
            .map(|o| o.value)
            .unwrap_or_default();
        let changed = self.set_value(next);
        if changed {
            tracing::debug!(
                message = "radio.revalidate",
                field = self.field.name(),
                options = self.options.len(),
                from = ?current
            );
        }
        changed
    }

    fn reject(&self, value: &T, reason: &'static str) -> VmError {
        tracing::warn!(
            message = "radio.rejected",
            field = self.field.name(),
            reason,
            value = ?value
        );
        VmError::invariant(self.field.name(), format!("{reason}: {value:?}"))
    }

    fn on_options_changed(&self, change: &ListChange<RadioOption<T>>) {
        if change.may_remove() {
            self.ensure_value_is_valid();
        }
    }
}

/// Read access to the field metadata. Write the value through
/// [`RadioField::set_value`] so `selected_option` is announced.
impl<T> Deref for RadioField<T> {
    type Target = Field<T>;

    fn deref(&self) -> &Self::Target {
        &self.field
    }
}

impl<T: 'static> Node for RadioField<T> {
    fn node(&self) -> &ObservableNode {
        self.field.node()
    }
}

impl<T: 'static> DecoratorHost for RadioField<T> {
    fn decorators(&self) -> &DecoratorRegistry {
        self.field.decorators()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn theme() -> Rc<RadioField<String>> {
        let field = RadioField::new("ThemeColor");
        for v in ["Light", "Dark", "System"] {
            field.add_option(v, v.to_string()).expect("unique");
        }
        field.set_value("Light".to_string());
        field
    }

    fn log_of(field: &RadioField<String>) -> Rc<RefCell<Vec<&'static str>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        field
            .node()
            .subscribe(move |e| sink.borrow_mut().push(e.property));
        log
    }

    #[test]
    fn selected_option_is_derived_from_value() {
        let field = theme();
        assert_eq!(
            field.selected_option(),
            Some(RadioOption::new("Light", "Light".to_string()))
        );
        field.set_value("Dark".to_string());
        assert_eq!(
            field.selected_option().map(|o| o.label().to_string()),
            Some("Dark".to_string())
        );
    }

    #[test]
    fn duplicate_value_rejected_list_untouched() {
        let field = theme();
        let err = field
            .add_option("Darker", "Dark".to_string())
            .expect_err("duplicate");
        assert!(matches!(err, VmError::DuplicateKey { .. }));
        assert_eq!(field.options().len(), 3);
        assert_eq!(
            field.options().get(1).map(|o| o.label().to_string()),
            Some("Dark".to_string())
        );
    }

    #[test]
    fn removing_selected_resets_to_first_once() {
        let field = theme();
        field.set_value("Dark".to_string());
        let log = log_of(&field);

        assert!(field.remove_option(&"Dark".to_string()));
        assert_eq!(field.value(), "Light");
        assert_eq!(*log.borrow(), vec!["value", "selected_option"]);
    }

    #[test]
    fn removing_unselected_keeps_value_silently() {
        let field = theme();
        let log = log_of(&field);
        assert!(field.remove_option(&"System".to_string()));
        assert_eq!(field.value(), "Light");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn removing_missing_option_is_noop() {
        let field = theme();
        assert!(!field.remove_option(&"Sepia".to_string()));
        assert_eq!(field.options().len(), 3);
    }

    #[test]
    fn removing_last_option_resets_to_default() {
        let field = RadioField::new("mode");
        field.add_option("Only", 7u32).expect("unique");
        field.set_value(7);

        assert!(field.remove_option(&7));
        assert_eq!(field.value(), 0);
        assert_eq!(field.selected_option(), None);
    }

    #[test]
    fn replace_and_reset_revalidate() {
        let field = theme();
        field.options().replace(0, RadioOption::new("Paper", "Paper".to_string()));
        assert_eq!(field.value(), "Paper");

        field.options().reset(vec![
            RadioOption::new("A", "A".to_string()),
            RadioOption::new("B", "B".to_string()),
        ]);
        assert_eq!(field.value(), "A");

        field.options().clear();
        assert_eq!(field.value(), "");
    }

    #[test]
    fn insert_does_not_force_revalidation() {
        let field: Rc<RadioField<String>> = RadioField::new("empty");
        assert!(field.set_value("free".to_string()));
        field.add_option("One", "one".to_string()).expect("unique");
        assert_eq!(field.value(), "free");
        assert_eq!(field.selected_option(), None);
    }

    #[test]
    fn selecting_foreign_option_fails() {
        let field = theme();
        let err = field
            .set_selected_option(Some(&RadioOption::new("Sepia", "Sepia".to_string())))
            .expect_err("not present");
        assert!(matches!(err, VmError::InvariantViolation { .. }));
        assert_eq!(field.value(), "Light");
    }

    #[test]
    fn selecting_present_option_and_none() {
        let field = theme();
        let dark = field.options().get(1).expect("dark");
        assert_eq!(field.set_selected_option(Some(&dark)), Ok(true));
        assert_eq!(field.value(), "Dark");

        assert_eq!(field.set_selected_option(None), Ok(true));
        assert_eq!(field.value(), "");
        assert_eq!(field.selected_option(), None);
    }

    #[test]
    fn select_value_looks_up_by_value() {
        let field = theme();
        assert_eq!(field.select_value(&"System".to_string()), Ok(true));
        assert_eq!(field.select_value(&"System".to_string()), Ok(false));
        let err = field
            .select_value(&"Sepia".to_string())
            .expect_err("absent");
        assert_eq!(err.node(), "ThemeColor");
        assert_eq!(field.value(), "System");
    }

    #[test]
    fn with_options_builds_and_rejects_duplicates() {
        let ok = RadioField::with_options(
            "preset",
            [
                ("Preset4".to_string(), 4u8),
                ("Preset6".to_string(), 6),
            ],
            6,
        )
        .expect("unique");
        assert_eq!(ok.value(), 6);

        let dup = RadioField::with_options(
            "preset",
            [("a".to_string(), 1u8), ("b".to_string(), 1)],
            1,
        );
        assert!(dup.is_err());
    }

    #[test]
    fn with_options_rejects_initial_value_outside_options() {
        let err = RadioField::with_options(
            "preset",
            [("Four".to_string(), 4u8), ("Six".to_string(), 6)],
            9,
        )
        .expect_err("9 is not an option");
        assert!(matches!(err, VmError::InvariantViolation { .. }));
        assert_eq!(err.node(), "preset");
    }

    #[test]
    fn set_value_through_radio_announces_selected_option() {
        let field = theme();
        let log = log_of(&field);
        // Method resolution picks the inherent setter over the deref target.
        assert!(field.set_value("System".to_string()));
        assert_eq!(*log.borrow(), vec!["value", "selected_option"]);
        assert!(field.display_name().is_empty());
    }

    #[test]
    fn field_drop_releases_list_observer_target() {
        let field = theme();
        let weak = Rc::downgrade(&field);
        drop(field);
        assert!(weak.upgrade().is_none());
    }
}
