//! Modifiers
//!
//! A [`Modifier`] binds one style variable (e.g. `@navbar-height`) to a
//! nullable override value. `None` means "not overridden": the modifier is
//! left out of every flattened override map and the framework default
//! applies.
//!
//! Dimension-style modifiers declare a suffix unit. Storing `10` into such a
//! modifier persists `"10px"`, while observers still receive the raw `10` so
//! bound controls keep showing what the user typed.

use crate::value::RawValue;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

/// Unit appended to suffixed modifiers when neither the caller nor the
/// field table names one
pub const DEFAULT_UNIT: &str = "px";

new_key_type! {
    /// Handle to one observer subscription on a modifier
    pub struct ObserverId;
}

/// Observer callback. Returning `false` drops the subscription.
type Observer = Box<dyn FnMut(Option<&RawValue>) -> bool>;

/// Declarative description of one field in a group's table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModifierSpec {
    /// Local field name, unique within the group
    pub field: String,
    /// Style variable name, the key in the override map
    pub variable: String,
    /// Key a control declares to subscribe to this field (defaults to `field`)
    pub binding_key: Option<String>,
    /// Whether stored values get a unit appended
    pub suffix_unit: bool,
    /// Unit to append when the caller does not pass one
    pub unit: Option<String>,
}

impl ModifierSpec {
    pub fn new(field: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            variable: variable.into(),
            binding_key: None,
            suffix_unit: false,
            unit: None,
        }
    }

    /// Suffix stored values with the given unit
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.suffix_unit = true;
        self.unit = Some(unit.into());
        self
    }

    /// Suffix stored values, falling back to [`DEFAULT_UNIT`]
    pub fn suffixed(mut self) -> Self {
        self.suffix_unit = true;
        self
    }

    /// Subscribe controls under a key other than the field name
    pub fn bound_to(mut self, key: impl Into<String>) -> Self {
        self.binding_key = Some(key.into());
        self
    }

    pub fn binding_key(&self) -> &str {
        self.binding_key.as_deref().unwrap_or(&self.field)
    }
}

/// A single named, nullable, observable style-variable override
pub struct Modifier {
    spec: ModifierSpec,
    value: Option<String>,
    observers: SlotMap<ObserverId, Observer>,
}

impl Modifier {
    pub fn new(spec: ModifierSpec) -> Self {
        Self {
            spec,
            value: None,
            observers: SlotMap::with_key(),
        }
    }

    pub fn spec(&self) -> &ModifierSpec {
        &self.spec
    }

    pub fn field(&self) -> &str {
        &self.spec.field
    }

    pub fn variable(&self) -> &str {
        &self.spec.variable
    }

    /// Persisted (possibly suffixed) value
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Compute the persisted form of a raw value without storing it
    pub fn persisted_form(&self, raw: &RawValue, explicit_unit: Option<&str>) -> String {
        if self.spec.suffix_unit {
            let unit = explicit_unit
                .or(self.spec.unit.as_deref())
                .unwrap_or(DEFAULT_UNIT);
            format!("{}{}", raw, unit)
        } else {
            raw.to_string()
        }
    }

    /// Store a raw value, suffixing it when the field declares a unit.
    ///
    /// `None` is stored verbatim. Observers are not notified; see
    /// [`Modifier::notify`]. Returns whether the persisted value changed.
    pub fn store(&mut self, raw: Option<RawValue>, explicit_unit: Option<&str>) -> bool {
        let persisted = raw.map(|raw| self.persisted_form(&raw, explicit_unit));
        self.replace(persisted)
    }

    /// Store an already-final value, bypassing unit suffixing
    pub fn load(&mut self, persisted: Option<String>) -> bool {
        self.replace(persisted)
    }

    fn replace(&mut self, persisted: Option<String>) -> bool {
        if self.value == persisted {
            return false;
        }
        tracing::trace!(
            "Modifier {}: {:?} -> {:?}",
            self.spec.variable,
            self.value,
            persisted
        );
        self.value = persisted;
        true
    }

    /// Store and notify observers in one step
    pub fn set_value(&mut self, raw: Option<RawValue>, explicit_unit: Option<&str>) -> bool {
        let changed = self.store(raw.clone(), explicit_unit);
        self.notify(raw.as_ref());
        changed
    }

    /// Register an observer that lives until unsubscribed
    pub fn subscribe<F>(&mut self, mut callback: F) -> ObserverId
    where
        F: FnMut(Option<&RawValue>) + 'static,
    {
        self.observers.insert(Box::new(move |value| {
            callback(value);
            true
        }))
    }

    /// Register an observer that unsubscribes itself by returning `false`
    pub fn subscribe_while<F>(&mut self, callback: F) -> ObserverId
    where
        F: FnMut(Option<&RawValue>) -> bool + 'static,
    {
        self.observers.insert(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Notify every observer with the raw (pre-suffix) value
    pub fn notify(&mut self, raw: Option<&RawValue>) {
        self.observers.retain(|_, observer| observer(raw));
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifier")
            .field("variable", &self.spec.variable)
            .field("value", &self.value)
            .field("observers", &self.observers.len())
            .finish()
    }
}
