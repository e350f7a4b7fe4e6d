//! Restyle Core Runtime
//!
//! This crate provides the primitives behind the live theme editor:
//!
//! - **Modifiers**: named, nullable, observable bindings to a style variable
//! - **Modifier groups**: fixed field tables for one styled component
//! - **Change scheduling**: a trailing-edge debounce gating recompilation
//! - **Edit history**: bounded undo/redo over override map snapshots
//!
//! # Example
//!
//! ```rust
//! use restyle_core::{ModifierGroup, ModifierSpec, RawValue};
//!
//! let mut group = ModifierGroup::new(
//!     "buttons",
//!     "button",
//!     vec![
//!         ModifierSpec::new("color", "@btn-color"),
//!         ModifierSpec::new("padding", "@btn-padding").with_unit("px"),
//!     ],
//! )
//! .unwrap();
//!
//! group.modifier_mut("padding").unwrap().store(Some(RawValue::Number(10.0)), None);
//!
//! let extracted = group.extract();
//! assert_eq!(extracted.get("@btn-padding").map(String::as_str), Some("10px"));
//! assert!(extracted.get("@btn-color").is_none());
//! ```

pub mod binding;
pub mod clock;
pub mod error;
pub mod group;
pub mod history;
pub mod modifier;
pub mod scheduler;
pub mod value;

pub use binding::{Control, ControlBinding, ControlId, SharedControl};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result};
pub use group::ModifierGroup;
pub use history::{HistoryStack, DEFAULT_UNDO_CAPACITY};
pub use modifier::{Modifier, ModifierSpec, ObserverId, DEFAULT_UNIT};
pub use scheduler::{ChangeScheduler, Dispatch, SchedulerState, DEFAULT_DELAY};
pub use value::{OverrideMap, RawValue};
