//! Theme editor
//!
//! The [`Editor`] owns every modifier group of one editing session together
//! with its change scheduler, undo history and compiler. All session state
//! lives here, so several editors can coexist in one process.
//!
//! An edit flows through the editor in a fixed order:
//!
//! 1. the modifier stores the (suffixed) value
//! 2. the scheduler decides whether to compile now or coalesce
//! 3. the flattened override map is committed to history
//! 4. observers see the raw value
//!
//! Bulk paths (import, undo/redo replay, reset) suppress history tracking
//! and per-field scheduling, then issue a single recompilation.

use restyle_core::{
    ChangeScheduler, Clock, Control, ControlId, Dispatch, HistoryStack, ModifierGroup,
    OverrideMap, RawValue, SharedControl, SystemClock,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::{standard_groups, GroupSchema};
use crate::compiler::{Compiler, OutputSink};
use crate::config::EditorConfig;
use crate::error::{ConfigError, EditorError, Result};
use crate::import_export::{parse_theme, serialize_theme, ExportFormat};
use crate::presets::ThemePreset;
use crate::scope::scope_css;
use crate::transport::Transport;

/// How an import treats fields missing from the imported map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Leave missing fields untouched
    #[default]
    Merge,
    /// Clear missing fields first
    Replace,
}

/// Builder for [`Editor`]
pub struct EditorBuilder {
    compiler: Box<dyn Compiler>,
    config: EditorConfig,
    clock: Box<dyn Clock>,
    groups: Vec<ModifierGroup>,
}

impl EditorBuilder {
    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Register a group. Registration order decides collision precedence.
    pub fn group(mut self, group: ModifierGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Register one instance of a schema
    pub fn schema(self, schema: &GroupSchema, variant: Option<&str>) -> std::result::Result<Self, ConfigError> {
        Ok(self.group(schema.instantiate(variant)?))
    }

    /// Register every group of the standard catalogue
    pub fn standard_groups(mut self) -> std::result::Result<Self, ConfigError> {
        self.groups.extend(standard_groups()?);
        Ok(self)
    }

    pub fn build(self) -> std::result::Result<Editor, ConfigError> {
        self.config.validate()?;

        let mut index = FxHashMap::default();
        let mut claimed: FxHashMap<&str, &str> = FxHashMap::default();
        for (i, group) in self.groups.iter().enumerate() {
            if index.insert(group.name().to_string(), i).is_some() {
                return Err(ConfigError::DuplicateGroup(group.name().to_string()));
            }
            for variable in group.variables() {
                if let Some(previous) = claimed.insert(variable, group.name()) {
                    warn!(
                        "Editor: variable {} claimed by both '{}' and '{}'; '{}' wins",
                        variable,
                        previous,
                        group.name(),
                        group.name()
                    );
                }
            }
        }

        let mut editor = Editor {
            scheduler: ChangeScheduler::new(self.config.delay()),
            history: HistoryStack::new(self.config.undo_capacity),
            compiler: self.compiler,
            output: OutputSink::new(),
            clock: self.clock,
            controls: FxHashMap::default(),
            compile_count: 0,
            groups: self.groups,
            index,
            config: self.config,
        };
        let initial = editor.override_map();
        editor.history.commit(&initial);

        debug!(
            "Editor: built with {} groups, delay {:?}, undo capacity {}",
            editor.groups.len(),
            editor.scheduler.delay(),
            editor.history.capacity()
        );
        Ok(editor)
    }
}

/// One live theme editing session
pub struct Editor {
    groups: Vec<ModifierGroup>,
    index: FxHashMap<String, usize>,
    scheduler: ChangeScheduler,
    history: HistoryStack,
    compiler: Box<dyn Compiler>,
    output: OutputSink,
    clock: Box<dyn Clock>,
    controls: FxHashMap<ControlId, (usize, Weak<RefCell<dyn Control>>)>,
    compile_count: u64,
    config: EditorConfig,
}

impl Editor {
    /// Start building an editor around a compiler
    pub fn builder(compiler: impl Compiler + 'static) -> EditorBuilder {
        EditorBuilder {
            compiler: Box::new(compiler),
            config: EditorConfig::default(),
            clock: Box::new(SystemClock),
            groups: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // ========== Groups ==========

    /// Groups in registration order
    pub fn groups(&self) -> &[ModifierGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&ModifierGroup> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    fn group_index(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| EditorError::UnknownGroup(name.to_string()))
    }

    /// Persisted value of one field
    pub fn value(&self, group: &str, field: &str) -> Option<&str> {
        self.group(group)?.modifier(field)?.value()
    }

    // ========== Editing ==========

    /// Set a modifier value.
    ///
    /// `unit` overrides the field's declared unit for this edit. Setting
    /// `None` clears the override; it only creates a history entry when
    /// `commit_cleared` is configured.
    pub fn set_value(
        &mut self,
        group: &str,
        field: &str,
        value: Option<RawValue>,
        unit: Option<&str>,
    ) -> Result<()> {
        let gi = self.group_index(group)?;
        let unknown_field = || EditorError::UnknownField {
            group: group.to_string(),
            field: field.to_string(),
        };

        self.groups[gi]
            .modifier_mut(field)
            .ok_or_else(unknown_field)?
            .store(value.clone(), unit);

        self.request_recompilation();

        if value.is_some() || self.config.commit_cleared {
            let snapshot = self.override_map();
            self.history.commit(&snapshot);
        }

        if let Some(modifier) = self.groups[gi].modifier_mut(field) {
            modifier.notify(value.as_ref());
        }
        Ok(())
    }

    // ========== Controls ==========

    /// Wire controls to the groups whose tag they carry. Returns how many
    /// controls were bound.
    pub fn bind_controls(&mut self, controls: &[SharedControl]) -> usize {
        let mut total = 0;
        for (gi, group) in self.groups.iter_mut().enumerate() {
            let bound = group.bind_controls(controls);
            if bound == 0 {
                continue;
            }
            total += bound;
            for control in controls {
                let id = control.borrow().id();
                if group.binding(id).is_some() {
                    self.controls.insert(id, (gi, Rc::downgrade(control)));
                }
            }
        }
        debug!("Editor: bound {} of {} controls", total, controls.len());
        total
    }

    /// Remove a control's binding
    pub fn unbind_control(&mut self, id: ControlId) -> bool {
        match self.controls.remove(&id) {
            Some((gi, _)) => self.groups[gi].unbind_control(id),
            None => false,
        }
    }

    /// Handle a "value changed" event from a bound control.
    ///
    /// Empty input clears the override. Numeric input for a dimension field
    /// is stored as a number so it gets its unit; every other field keeps
    /// the text exactly as typed.
    pub fn dispatch_input(&mut self, id: ControlId) -> Result<()> {
        let Some((gi, weak)) = self.controls.get(&id).cloned() else {
            return Err(EditorError::UnboundControl(id));
        };
        let Some(control) = weak.upgrade() else {
            self.unbind_control(id);
            return Err(EditorError::UnboundControl(id));
        };
        let Some(binding) = self.groups[gi].binding(id).cloned() else {
            return Err(EditorError::UnboundControl(id));
        };

        let suffixed = self.groups[gi]
            .modifier(&binding.field)
            .is_some_and(|m| m.spec().suffix_unit);
        let input = control.borrow().current_value();
        let value = input
            .filter(|s| !s.trim().is_empty())
            .map(|s| if suffixed { RawValue::parse(&s) } else { RawValue::Text(s) });
        let group = self.groups[gi].name().to_string();
        self.set_value(&group, &binding.field, value, binding.unit_override.as_deref())
    }

    // ========== Registry ==========

    /// Flatten every group into one override map. Later groups win on
    /// colliding variable names.
    pub fn override_map(&self) -> OverrideMap {
        let mut map = OverrideMap::new();
        for group in &self.groups {
            map.extend(group.extract());
        }
        map
    }

    /// Flat JSON encoding of the override map
    pub fn serialize(&self) -> String {
        serialize_theme(&self.override_map(), ExportFormat::Flat)
    }

    /// Clear every override and compile once with an empty map
    pub fn reset_all(&mut self) {
        self.scheduler.set_enabled(false);
        let mut cleared = 0;
        for group in &mut self.groups {
            cleared += group.reset();
        }
        self.scheduler.set_enabled(true);

        let empty = OverrideMap::new();
        if self.config.commit_cleared {
            self.history.commit(&empty);
        }
        info!("Editor: reset {} overridden fields", cleared);
        self.compile_with(&empty);
    }

    // ========== Scheduling ==========

    /// Ask for a recompilation; the scheduler decides when it runs.
    ///
    /// A cooldown that expired without a [`Editor::tick`] gets its trailing
    /// compile first, so the request then finds the scheduler ready.
    pub fn request_recompilation(&mut self) {
        self.tick();
        let now = self.clock.now();
        if self.scheduler.request(now) == Dispatch::Immediate {
            let map = self.override_map();
            self.compile_with(&map);
        }
    }

    /// Run the trailing compile if the cooldown has expired. Hosts call this
    /// from their event loop; returns whether a compile ran.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        if !self.scheduler.poll(now) {
            return false;
        }
        let map = self.override_map();
        self.compile_with(&map);
        true
    }

    /// When the next [`Editor::tick`] has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    pub fn scheduler(&self) -> &ChangeScheduler {
        &self.scheduler
    }

    /// Compiler invocations so far
    pub fn compile_count(&self) -> u64 {
        self.compile_count
    }

    fn compile_with(&mut self, overrides: &OverrideMap) {
        self.compile_count += 1;
        debug!(
            "Editor: compile #{} with {} overrides",
            self.compile_count,
            overrides.len()
        );
        self.compiler.compile(overrides, &self.output);
    }

    // ========== History ==========

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Record the current override map as an undo point
    pub fn commit(&mut self) -> bool {
        let snapshot = self.override_map();
        self.history.commit(&snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the previous snapshot. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_back() else {
            return false;
        };
        debug!("Editor: undo to {} overrides", snapshot.len());
        self.replay(&snapshot);
        true
    }

    /// Re-apply the most recently undone snapshot
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.step_forward() else {
            return false;
        };
        debug!("Editor: redo to {} overrides", snapshot.len());
        self.replay(&snapshot);
        true
    }

    fn replay(&mut self, snapshot: &OverrideMap) {
        self.history.set_suppressed(true);
        for group in &mut self.groups {
            group.restore(snapshot);
        }
        self.history.set_suppressed(false);
        self.request_recompilation();
    }

    // ========== Import / Export ==========

    /// Merge an external override map into the groups
    pub fn import_from(&mut self, overrides: &OverrideMap) -> usize {
        self.import(overrides, ImportMode::Merge)
    }

    /// Replace the whole theme with an external override map
    pub fn import_replacing(&mut self, overrides: &OverrideMap) -> usize {
        self.import(overrides, ImportMode::Replace)
    }

    /// Load an external override map as one undoable step.
    ///
    /// Variables no group knows are ignored. Returns the number of fields
    /// that received a value.
    pub fn import(&mut self, overrides: &OverrideMap, mode: ImportMode) -> usize {
        self.history.set_suppressed(true);
        let mut loaded = 0;
        for group in &mut self.groups {
            if mode == ImportMode::Replace {
                group.reset();
            }
            loaded += group.load(overrides);
        }
        self.history.set_suppressed(false);

        let known = self.known_variables(overrides);
        if known < overrides.len() {
            debug!(
                "Editor: ignored {} unknown variables on import",
                overrides.len() - known
            );
        }

        self.commit();
        self.request_recompilation();
        loaded
    }

    fn known_variables(&self, overrides: &OverrideMap) -> usize {
        overrides
            .keys()
            .filter(|key| {
                self.groups
                    .iter()
                    .any(|g| g.variables().any(|v| v == key.as_str()))
            })
            .count()
    }

    /// Parse theme JSON and import it. Malformed input leaves every group
    /// untouched.
    pub fn import_json(&mut self, text: &str, mode: ImportMode) -> Result<usize> {
        let overrides = parse_theme(text).map_err(|e| {
            warn!("Editor: rejected theme import: {}", e);
            e
        })?;
        Ok(self.import(&overrides, mode))
    }

    /// Replace the theme with a built-in preset
    pub fn apply_preset(&mut self, preset: ThemePreset) -> usize {
        info!("Editor: applying preset {}", preset);
        self.import_replacing(&preset.overrides())
    }

    /// Theme JSON for the current override map
    pub fn export_json_snapshot(&self, format: ExportFormat) -> String {
        serialize_theme(&self.override_map(), format)
    }

    /// Latest compiler output, scoped under the configured export selector
    pub fn export_compiled_output(&self) -> Result<String> {
        self.export_compiled_output_scoped(self.config.export.css_selector.as_deref())
    }

    /// Latest compiler output, optionally scoped under `scope`
    pub fn export_compiled_output_scoped(&self, scope: Option<&str>) -> Result<String> {
        let css = self.output.latest().ok_or(EditorError::NoOutput)?;
        Ok(match scope {
            Some(scope) => scope_css(&css, scope),
            None => css,
        })
    }

    /// Handle compilers publish into
    pub fn output(&self) -> &OutputSink {
        &self.output
    }

    // ========== Persistence ==========

    /// Send the theme JSON to the configured save target
    pub fn save(&self, transport: &mut dyn Transport) -> Result<()> {
        let target = self
            .config
            .save
            .as_ref()
            .ok_or(ConfigError::MissingRequired("save"))?;
        let body = self.serialize();
        transport.send(target.method, &target.url, &body)?;
        info!(
            "Editor: saved {} bytes to {} ({})",
            body.len(),
            target.url,
            target.method
        );
        if let Some(callback) = &target.callback {
            debug!("Editor: save callback '{}' is due", callback);
        }
        Ok(())
    }

    /// Fetch a theme and replace the current one with it
    pub fn load_theme(&mut self, transport: &mut dyn Transport, url: &str) -> Result<usize> {
        let text = transport.load(url)?;
        let loaded = self.import_json(&text, ImportMode::Replace)?;
        info!("Editor: loaded {} fields from {}", loaded, url);
        Ok(loaded)
    }

    /// Load the configured initial theme. Returns `Ok(false)` when none is configured.
    pub fn load_initial_theme(&mut self, transport: &mut dyn Transport) -> Result<bool> {
        let Some(url) = self.config.initial_theme.clone() else {
            return Ok(false);
        };
        self.load_theme(transport, &url)?;
        Ok(true)
    }
}
