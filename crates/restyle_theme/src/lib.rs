//! Restyle Theme Editor
//!
//! Live editing of Less-style theme variables. An [`Editor`] registers one
//! modifier group per styled component, flattens their values into an
//! override map and hands it to a [`Compiler`] under a debounce, keeping a
//! bounded undo history of every edit.
//!
//! # Example
//!
//! ```rust
//! use restyle_theme::{Editor, OutputSink, OverrideMap, RawValue};
//!
//! let mut editor = Editor::builder(|overrides: &OverrideMap, out: &OutputSink| {
//!     out.publish(format!("/* {} overrides */", overrides.len()));
//! })
//! .standard_groups()
//! .unwrap()
//! .build()
//! .unwrap();
//!
//! editor
//!     .set_value("navbar", "height", Some(RawValue::Number(60.0)), None)
//!     .unwrap();
//! assert_eq!(editor.value("navbar", "height"), Some("60px"));
//! assert_eq!(editor.serialize(), r#"{"@navbar-height":"60px"}"#);
//!
//! assert!(editor.undo());
//! assert!(editor.override_map().is_empty());
//! ```

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod editor;
pub mod error;
pub mod import_export;
pub mod presets;
pub mod scope;
pub mod transport;

pub use catalog::{default_schemas, standard_groups, FieldDef, GroupSchema};
pub use compiler::{Compiler, OutputSink};
pub use config::{EditorConfig, ExportTarget, SaveTarget};
pub use editor::{Editor, EditorBuilder, ImportMode};
pub use error::{ConfigError, EditorError, ImportError, Result, TransportError};
pub use import_export::{parse_theme, serialize_theme, ExportFormat, FORMAT_VERSION};
pub use presets::ThemePreset;
pub use scope::scope_css;
pub use transport::{Method, Transport};

// Core types most callers need alongside the editor
pub use restyle_core::{
    Clock, Control, ControlId, ManualClock, ModifierGroup, ModifierSpec, OverrideMap, RawValue,
    SharedControl, SystemClock,
};
