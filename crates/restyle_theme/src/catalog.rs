//! Component schema catalogue
//!
//! Each styled component is described by a flat field table. Editors build
//! one [`ModifierGroup`] per schema (or per variant for multi-instance
//! schemas such as buttons), so every component shares the same group
//! logic and only the table differs.

use restyle_core::{ModifierGroup, ModifierSpec};

use crate::error::ConfigError;

/// Placeholder substituted by the variant in multi-instance schemas
pub const VARIANT_PLACEHOLDER: &str = "{variant}";

/// One row of a schema's field table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub field: &'static str,
    pub variable: &'static str,
    /// Unit appended to stored values (`None` for colors and free text)
    pub unit: Option<&'static str>,
}

impl FieldDef {
    /// Color or free-text field
    pub const fn text(field: &'static str, variable: &'static str) -> Self {
        Self {
            field,
            variable,
            unit: None,
        }
    }

    /// Dimension field stored with a unit suffix
    pub const fn dimension(field: &'static str, variable: &'static str, unit: &'static str) -> Self {
        Self {
            field,
            variable,
            unit: Some(unit),
        }
    }

    fn to_spec(self, variant: Option<&str>) -> ModifierSpec {
        let variable = match variant {
            Some(v) => self.variable.replace(VARIANT_PLACEHOLDER, v),
            None => self.variable.to_string(),
        };
        let spec = ModifierSpec::new(self.field, variable);
        match self.unit {
            Some(unit) => spec.with_unit(unit),
            None => spec,
        }
    }
}

/// Declarative description of one styled component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupSchema {
    pub name: &'static str,
    /// Tag controls carry to subscribe to this component
    pub tag: &'static str,
    pub fields: &'static [FieldDef],
    /// Instances of a multi-instance component; empty for singletons
    pub variants: &'static [&'static str],
}

impl GroupSchema {
    pub fn is_multi_instance(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Build the group for this schema.
    ///
    /// Multi-instance schemas require a declared variant, which is appended
    /// to the group name and tag and substituted into variable names.
    pub fn instantiate(&self, variant: Option<&str>) -> Result<ModifierGroup, ConfigError> {
        let (name, tag) = match (self.is_multi_instance(), variant) {
            (false, None) => (self.name.to_string(), self.tag.to_string()),
            (false, Some(v)) => {
                return Err(ConfigError::UnknownVariant {
                    schema: self.name.to_string(),
                    variant: v.to_string(),
                })
            }
            (true, None) => {
                return Err(ConfigError::MissingDiscriminator {
                    schema: self.name.to_string(),
                })
            }
            (true, Some(v)) if !self.variants.iter().any(|known| *known == v) => {
                return Err(ConfigError::UnknownVariant {
                    schema: self.name.to_string(),
                    variant: v.to_string(),
                })
            }
            (true, Some(v)) => (format!("{}-{}", self.name, v), format!("{}-{}", self.tag, v)),
        };

        let specs = self.fields.iter().map(|f| f.to_spec(variant));
        Ok(ModifierGroup::new(name, tag, specs)?)
    }

    /// Build every instance of this schema (one group for singletons)
    pub fn instantiate_all(&self) -> Result<Vec<ModifierGroup>, ConfigError> {
        if self.is_multi_instance() {
            self.variants
                .iter()
                .map(|v| self.instantiate(Some(*v)))
                .collect()
        } else {
            Ok(vec![self.instantiate(None)?])
        }
    }
}

pub const BASE_COLORS: GroupSchema = GroupSchema {
    name: "colors",
    tag: "colors",
    fields: &[
        FieldDef::text("primary", "@brand-primary"),
        FieldDef::text("success", "@brand-success"),
        FieldDef::text("info", "@brand-info"),
        FieldDef::text("warning", "@brand-warning"),
        FieldDef::text("danger", "@brand-danger"),
        FieldDef::text("body_bg", "@body-bg"),
        FieldDef::text("text", "@text-color"),
        FieldDef::text("link", "@link-color"),
        FieldDef::text("link_hover", "@link-hover-color"),
    ],
    variants: &[],
};

pub const TYPOGRAPHY: GroupSchema = GroupSchema {
    name: "typography",
    tag: "typography",
    fields: &[
        FieldDef::text("sans_serif", "@font-family-sans-serif"),
        FieldDef::text("serif", "@font-family-serif"),
        FieldDef::text("monospace", "@font-family-monospace"),
        FieldDef::dimension("size_base", "@font-size-base", "px"),
        FieldDef::dimension("size_large", "@font-size-large", "px"),
        FieldDef::dimension("size_small", "@font-size-small", "px"),
        FieldDef::text("line_height", "@line-height-base"),
        FieldDef::text("headings_family", "@headings-font-family"),
        FieldDef::text("headings_weight", "@headings-font-weight"),
        FieldDef::text("headings_color", "@headings-color"),
    ],
    variants: &[],
};

pub const BUTTONS: GroupSchema = GroupSchema {
    name: "buttons",
    tag: "btn",
    fields: &[
        FieldDef::text("color", "@btn-{variant}-color"),
        FieldDef::text("bg", "@btn-{variant}-bg"),
        FieldDef::text("border", "@btn-{variant}-border"),
    ],
    variants: &["default", "primary", "success", "info", "warning", "danger"],
};

pub const NAVBAR: GroupSchema = GroupSchema {
    name: "navbar",
    tag: "navbar",
    fields: &[
        FieldDef::dimension("height", "@navbar-height", "px"),
        FieldDef::dimension("margin_bottom", "@navbar-margin-bottom", "px"),
        FieldDef::dimension("border_radius", "@navbar-border-radius", "px"),
        FieldDef::dimension("padding_horizontal", "@navbar-padding-horizontal", "px"),
        FieldDef::dimension("padding_vertical", "@navbar-padding-vertical", "px"),
        FieldDef::text("color", "@navbar-default-color"),
        FieldDef::text("bg", "@navbar-default-bg"),
        FieldDef::text("border", "@navbar-default-border"),
        FieldDef::text("link_color", "@navbar-default-link-color"),
        FieldDef::text("link_hover_color", "@navbar-default-link-hover-color"),
        FieldDef::text("inverse_bg", "@navbar-inverse-bg"),
        FieldDef::text("inverse_color", "@navbar-inverse-color"),
    ],
    variants: &[],
};

pub const PANELS: GroupSchema = GroupSchema {
    name: "panels",
    tag: "panel",
    fields: &[
        FieldDef::text("bg", "@panel-bg"),
        FieldDef::dimension("body_padding", "@panel-body-padding", "px"),
        FieldDef::dimension("heading_padding", "@panel-heading-padding", "px"),
        FieldDef::dimension("border_radius", "@panel-border-radius", "px"),
        FieldDef::text("text", "@panel-default-text"),
        FieldDef::text("border", "@panel-default-border"),
        FieldDef::text("heading_bg", "@panel-default-heading-bg"),
    ],
    variants: &[],
};

pub const FORMS: GroupSchema = GroupSchema {
    name: "forms",
    tag: "input",
    fields: &[
        FieldDef::text("bg", "@input-bg"),
        FieldDef::text("color", "@input-color"),
        FieldDef::text("border", "@input-border"),
        FieldDef::dimension("border_radius", "@input-border-radius", "px"),
        FieldDef::text("border_focus", "@input-border-focus"),
        FieldDef::text("placeholder", "@input-color-placeholder"),
        FieldDef::dimension("height", "@input-height-base", "px"),
    ],
    variants: &[],
};

/// Schemas of the standard editor, in registration order
pub fn default_schemas() -> &'static [GroupSchema] {
    const SCHEMAS: [GroupSchema; 6] = [BASE_COLORS, TYPOGRAPHY, BUTTONS, NAVBAR, PANELS, FORMS];
    &SCHEMAS
}

/// Instantiate every group of the standard editor
pub fn standard_groups() -> Result<Vec<ModifierGroup>, ConfigError> {
    let mut groups = Vec::new();
    for schema in default_schemas() {
        groups.extend(schema.instantiate_all()?);
    }
    Ok(groups)
}
