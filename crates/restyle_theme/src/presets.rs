//! Built-in theme presets.

use restyle_core::OverrideMap;
use std::fmt::{Display, Formatter};

/// Built-in preset catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemePreset {
    /// No overrides: the framework defaults.
    Stock,
    /// Dark navbar and slate brand colors.
    Slate,
    /// Warm, low-contrast palette with rounded panels.
    Sandstone,
    /// Dark page background with light text.
    Midnight,
}

impl ThemePreset {
    /// Stable preset id for config/serialization.
    pub fn id(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Slate => "slate",
            Self::Sandstone => "sandstone",
            Self::Midnight => "midnight",
        }
    }

    /// User-facing display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Stock => "Stock",
            Self::Slate => "Slate",
            Self::Sandstone => "Sandstone",
            Self::Midnight => "Midnight",
        }
    }

    /// Full preset list.
    pub fn all() -> &'static [ThemePreset] {
        const PRESETS: [ThemePreset; 4] = [
            ThemePreset::Stock,
            ThemePreset::Slate,
            ThemePreset::Sandstone,
            ThemePreset::Midnight,
        ];
        &PRESETS
    }

    /// Look a preset up by id.
    pub fn from_id(id: &str) -> Option<ThemePreset> {
        Self::all().iter().copied().find(|p| p.id() == id)
    }

    /// Override map applied by this preset.
    pub fn overrides(self) -> OverrideMap {
        let entries: &[(&str, &str)] = match self {
            Self::Stock => &[],
            Self::Slate => &[
                ("@brand-primary", "#3a4b5c"),
                ("@brand-info", "#5bc0de"),
                ("@body-bg", "#f4f6f8"),
                ("@text-color", "#2b2f33"),
                ("@navbar-default-bg", "#3a4b5c"),
                ("@navbar-default-color", "#e8ecef"),
                ("@navbar-default-link-color", "#e8ecef"),
                ("@btn-primary-bg", "#3a4b5c"),
                ("@btn-primary-border", "#2f3d4b"),
            ],
            Self::Sandstone => &[
                ("@brand-primary", "#325d88"),
                ("@brand-success", "#93c54b"),
                ("@brand-warning", "#f47c3c"),
                ("@brand-danger", "#d9534f"),
                ("@body-bg", "#fbf9f4"),
                ("@text-color", "#3e3f3a"),
                ("@panel-border-radius", "6px"),
                ("@input-border-radius", "4px"),
                ("@font-family-sans-serif", "\"Roboto\", sans-serif"),
            ],
            Self::Midnight => &[
                ("@body-bg", "#121417"),
                ("@text-color", "#d6d9dc"),
                ("@link-color", "#7aa2f7"),
                ("@panel-bg", "#1b1e22"),
                ("@panel-default-border", "#2a2e33"),
                ("@panel-default-heading-bg", "#22262b"),
                ("@input-bg", "#1b1e22"),
                ("@input-color", "#d6d9dc"),
                ("@input-border", "#2a2e33"),
                ("@navbar-inverse-bg", "#0b0c0e"),
            ],
        };
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

impl Display for ThemePreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for preset in ThemePreset::all() {
            assert_eq!(ThemePreset::from_id(preset.id()), Some(*preset));
        }
        assert_eq!(ThemePreset::from_id("solarized"), None);
    }

    #[test]
    fn test_stock_has_no_overrides() {
        assert!(ThemePreset::Stock.overrides().is_empty());
        assert!(!ThemePreset::Midnight.overrides().is_empty());
    }
}
