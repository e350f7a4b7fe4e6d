//! Control binding surface
//!
//! Controls are the on-page inputs that display and edit modifier values.
//! A control declares the group tag it belongs to and the field key it
//! subscribes to; a group matches both when wiring observers.
//!
//! Groups hold controls weakly. Dropping the last strong handle to a control
//! tears its observer down on the next notification.

use crate::modifier::ObserverId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Identifier of one control, unique within an editor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u64);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// An input element that can be bound to a modifier
pub trait Control {
    fn id(&self) -> ControlId;

    /// Group-level subscription key, if the control is tagged at all
    fn group_tag(&self) -> Option<&str>;

    /// Field-level subscription key
    fn field_key(&self) -> Option<&str>;

    /// Per-control unit override applied when the control edits a value
    fn unit_override(&self) -> Option<&str> {
        None
    }

    /// Current value shown by the control; `None` or empty clears the override
    fn current_value(&self) -> Option<String>;

    /// Display a value pushed from the bound modifier
    fn show_value(&mut self, value: Option<&str>);
}

/// Shared handle to a control
pub type SharedControl = Rc<RefCell<dyn Control>>;

/// Wiring recorded for one bound control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlBinding {
    /// Local field name of the bound modifier
    pub field: String,
    /// Unit override read from the control at bind time
    pub unit_override: Option<String>,
    /// Observer registered on the modifier
    pub observer: ObserverId,
}
