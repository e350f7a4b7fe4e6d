//! Modifier groups
//!
//! A [`ModifierGroup`] owns the modifiers of one styled component (buttons,
//! navbar, panels, ...). Its field table is fixed at construction; values
//! change for the lifetime of the editor but fields are never added or
//! removed.
//!
//! Groups know nothing about scheduling or history. The editor wraps every
//! group operation with the side effects it needs.

use crate::binding::{ControlBinding, ControlId, SharedControl};
use crate::error::{CoreError, Result};
use crate::modifier::{Modifier, ModifierSpec};
use crate::value::{OverrideMap, RawValue};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A fixed set of modifiers for one logical UI component
#[derive(Debug)]
pub struct ModifierGroup {
    name: String,
    tag: String,
    fields: IndexMap<String, Modifier>,
    bindings: FxHashMap<ControlId, ControlBinding>,
}

impl ModifierGroup {
    /// Build a group from its field table
    pub fn new(
        name: impl Into<String>,
        tag: impl Into<String>,
        specs: impl IntoIterator<Item = ModifierSpec>,
    ) -> Result<Self> {
        let name = name.into();
        let mut fields = IndexMap::new();
        for spec in specs {
            if fields.contains_key(&spec.field) {
                return Err(CoreError::DuplicateField {
                    group: name,
                    field: spec.field,
                });
            }
            fields.insert(spec.field.clone(), Modifier::new(spec));
        }
        if fields.is_empty() {
            return Err(CoreError::EmptyGroup(name));
        }

        Ok(Self {
            name,
            tag: tag.into(),
            fields,
            bindings: FxHashMap::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group-level tag controls carry to subscribe to this group
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn modifier(&self, field: &str) -> Option<&Modifier> {
        self.fields.get(field)
    }

    pub fn modifier_mut(&mut self, field: &str) -> Option<&mut Modifier> {
        self.fields.get_mut(field)
    }

    /// Modifiers in field-table order
    pub fn modifiers(&self) -> impl Iterator<Item = &Modifier> {
        self.fields.values()
    }

    /// Variable names claimed by this group
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(Modifier::variable)
    }

    /// Fields currently overridden, in table order
    pub fn set_fields(&self) -> impl Iterator<Item = &Modifier> {
        self.fields.values().filter(|m| m.is_set())
    }

    /// Non-null modifiers as `variable -> value`. Empty when nothing is overridden.
    pub fn extract(&self) -> OverrideMap {
        self.set_fields()
            .filter_map(|m| m.value().map(|v| (m.variable().to_string(), v.to_string())))
            .collect()
    }

    /// Load values for every field whose variable appears in `overrides`.
    ///
    /// Values are taken as final (no unit suffixing). Fields missing from the
    /// map are left untouched and unknown keys are ignored. Observers of each
    /// loaded field are notified. Returns the number of fields loaded.
    pub fn load(&mut self, overrides: &OverrideMap) -> usize {
        let mut loaded = 0;
        for modifier in self.fields.values_mut() {
            let Some(value) = overrides.get(modifier.variable()) else {
                continue;
            };
            modifier.load(Some(value.clone()));
            modifier.notify(Some(&RawValue::Text(value.clone())));
            loaded += 1;
        }
        loaded
    }

    /// Make this group match `snapshot` exactly: fields whose variable is
    /// absent become null. Every observer is notified once.
    pub fn restore(&mut self, snapshot: &OverrideMap) {
        for modifier in self.fields.values_mut() {
            let value = snapshot.get(modifier.variable()).cloned();
            modifier.load(value.clone());
            modifier.notify(value.map(RawValue::Text).as_ref());
        }
    }

    /// Clear every field, notifying observers. Returns how many fields were set.
    pub fn reset(&mut self) -> usize {
        let mut cleared = 0;
        for modifier in self.fields.values_mut() {
            if modifier.load(None) {
                cleared += 1;
            }
            modifier.notify(None);
        }
        cleared
    }

    /// Wire every matching control to its modifier.
    ///
    /// A control matches when its group tag equals this group's tag and its
    /// field key equals a modifier's binding key. Each match subscribes a
    /// weak observer that pushes values into the control. Controls already
    /// bound are skipped. Returns the number of new bindings.
    pub fn bind_controls(&mut self, controls: &[SharedControl]) -> usize {
        let mut bound = 0;
        for control in controls {
            let (id, field_key, unit_override) = {
                let c = control.borrow();
                if c.group_tag() != Some(self.tag.as_str()) {
                    continue;
                }
                let Some(key) = c.field_key() else {
                    continue;
                };
                (c.id(), key.to_string(), c.unit_override().map(str::to_string))
            };
            if self.bindings.contains_key(&id) {
                continue;
            }

            let Some(modifier) = self
                .fields
                .values_mut()
                .find(|m| m.spec().binding_key() == field_key)
            else {
                tracing::debug!(
                    "ModifierGroup {}: no field bound to key '{}' ({})",
                    self.name,
                    field_key,
                    id
                );
                continue;
            };

            let weak = Rc::downgrade(control);
            let observer = modifier.subscribe_while(move |raw| {
                let Some(control) = weak.upgrade() else {
                    return false;
                };
                let shown = raw.map(ToString::to_string);
                control.borrow_mut().show_value(shown.as_deref());
                true
            });

            self.bindings.insert(
                id,
                ControlBinding {
                    field: modifier.field().to_string(),
                    unit_override,
                    observer,
                },
            );
            bound += 1;
        }
        bound
    }

    /// Remove a control's binding and its observer
    pub fn unbind_control(&mut self, id: ControlId) -> bool {
        let Some(binding) = self.bindings.remove(&id) else {
            return false;
        };
        if let Some(modifier) = self.fields.get_mut(&binding.field) {
            modifier.unsubscribe(binding.observer);
        }
        true
    }

    pub fn binding(&self, id: ControlId) -> Option<&ControlBinding> {
        self.bindings.get(&id)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}
