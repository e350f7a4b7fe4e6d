use pretty_assertions::assert_eq;
use restyle_theme::catalog::{BUTTONS, NAVBAR};
use restyle_theme::{
    Compiler, ConfigError, Control, ControlId, Editor, EditorConfig, EditorError, ExportFormat,
    ImportError, ImportMode, ManualClock, Method, ModifierGroup, ModifierSpec, OutputSink,
    OverrideMap, RawValue, SaveTarget, SharedControl, ThemePreset, Transport, TransportError,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

type CompileLog = Rc<RefCell<Vec<OverrideMap>>>;

fn recording_compiler() -> (impl Compiler, CompileLog) {
    let log: CompileLog = Rc::default();
    let handle = log.clone();
    let compiler = move |overrides: &OverrideMap, out: &OutputSink| {
        handle.borrow_mut().push(overrides.clone());
        let text = overrides
            .get("@text-color")
            .map(String::as_str)
            .unwrap_or("#333");
        out.publish(format!("body{{color:{}}}", text));
    };
    (compiler, log)
}

fn editor_with(config: EditorConfig) -> (Editor, ManualClock, CompileLog) {
    let (compiler, log) = recording_compiler();
    let clock = ManualClock::new();
    let editor = Editor::builder(compiler)
        .config(config)
        .clock(clock.clone())
        .standard_groups()
        .unwrap()
        .build()
        .unwrap();
    (editor, clock, log)
}

fn editor() -> (Editor, ManualClock, CompileLog) {
    editor_with(EditorConfig::default())
}

fn map(entries: &[(&str, &str)]) -> OverrideMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn cleared_fields_are_left_out_of_the_override_map() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("colors", "primary", Some("#428bca".into()), None)
        .unwrap();
    editor
        .set_value("navbar", "height", Some(RawValue::Number(60.0)), None)
        .unwrap();
    editor.set_value("colors", "primary", None, None).unwrap();

    assert_eq!(editor.override_map(), map(&[("@navbar-height", "60px")]));
    assert_eq!(editor.value("colors", "primary"), None);
}

#[test]
fn serialization_is_deterministic_and_follows_registration_order() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("forms", "bg", Some("#fafafa".into()), None)
        .unwrap();
    editor
        .set_value("colors", "text", Some("#222".into()), None)
        .unwrap();

    let first = editor.serialize();
    assert_eq!(first, editor.serialize());
    assert_eq!(first, r##"{"@text-color":"#222","@input-bg":"#fafafa"}"##);
}

#[test]
fn export_then_import_reproduces_the_override_map() {
    let (mut source, _, _) = editor();
    source
        .set_value("buttons-primary", "bg", Some("#337ab7".into()), None)
        .unwrap();
    source
        .set_value("panels", "border_radius", Some(RawValue::Number(6.0)), None)
        .unwrap();

    for format in [ExportFormat::Flat, ExportFormat::Versioned] {
        let (mut target, _, _) = editor();
        let json = source.export_json_snapshot(format);
        assert_eq!(target.import_json(&json, ImportMode::Merge).unwrap(), 2);
        assert_eq!(target.override_map(), source.override_map());
    }
}

#[test]
fn burst_of_edits_compiles_once_now_and_once_after_the_cooldown() {
    let (mut editor, clock, log) = editor();

    for i in 0..5 {
        editor
            .set_value("navbar", "height", Some(RawValue::Number(40.0 + i as f64)), None)
            .unwrap();
        clock.advance(Duration::from_millis(100));
    }
    assert_eq!(editor.compile_count(), 1);
    assert_eq!(log.borrow()[0], map(&[("@navbar-height", "40px")]));
    assert_eq!(editor.scheduler().coalesced(), 4);

    assert!(!editor.tick());
    clock.advance(Duration::from_millis(250));
    assert!(editor.tick());
    assert_eq!(editor.compile_count(), 2);
    assert_eq!(log.borrow()[1], map(&[("@navbar-height", "44px")]));

    // Nothing armed anymore
    assert!(!editor.tick());
    assert_eq!(editor.next_deadline(), None);
}

#[test]
fn single_edit_still_gets_a_trailing_compile() {
    let (mut editor, clock, _) = editor();
    editor
        .set_value("colors", "link", Some("#06c".into()), None)
        .unwrap();
    assert!(editor.next_deadline().is_some());

    clock.advance(Duration::from_millis(750));
    assert!(editor.tick());
    assert_eq!(editor.compile_count(), 2);
}

#[test]
fn edit_after_an_unticked_cooldown_compiles_again() {
    let (mut editor, clock, log) = editor();
    editor
        .set_value("navbar", "height", Some(RawValue::Number(1.0)), None)
        .unwrap();
    clock.advance(Duration::from_millis(2000));
    editor
        .set_value("navbar", "height", Some(RawValue::Number(2.0)), None)
        .unwrap();

    assert_eq!(editor.compile_count(), 3);
    assert_eq!(log.borrow()[2], map(&[("@navbar-height", "2px")]));
    assert!(editor.next_deadline().is_some());
    assert_eq!(editor.scheduler().coalesced(), 0);
}

#[test]
fn undo_and_redo_walk_the_snapshot_sequence() {
    let (mut editor, _, _) = editor();
    assert!(!editor.can_undo());

    editor
        .set_value("colors", "primary", Some("#111".into()), None)
        .unwrap();
    editor
        .set_value("colors", "primary", Some("#222".into()), None)
        .unwrap();

    assert!(editor.undo());
    assert_eq!(editor.value("colors", "primary"), Some("#111"));
    assert!(editor.undo());
    assert!(editor.override_map().is_empty());
    assert!(!editor.undo());

    assert!(editor.redo());
    assert_eq!(editor.value("colors", "primary"), Some("#111"));
    assert!(editor.redo());
    assert_eq!(editor.value("colors", "primary"), Some("#222"));
    assert!(!editor.redo());

    // Replays never add entries of their own
    assert_eq!(editor.history().len(), 3);
}

#[test]
fn new_edit_after_undo_discards_redo() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("navbar", "bg", Some("#fff".into()), None)
        .unwrap();
    editor
        .set_value("navbar", "bg", Some("#000".into()), None)
        .unwrap();
    editor.undo();
    assert!(editor.can_redo());

    editor
        .set_value("navbar", "color", Some("#777".into()), None)
        .unwrap();
    assert!(!editor.can_redo());
    assert_eq!(
        editor.override_map(),
        map(&[("@navbar-default-color", "#777"), ("@navbar-default-bg", "#fff")])
    );
}

#[test]
fn undo_restores_fields_missing_from_the_snapshot_to_null() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("typography", "size_base", Some(RawValue::Number(14.0)), None)
        .unwrap();
    editor
        .set_value("panels", "bg", Some("#eee".into()), None)
        .unwrap();

    editor.undo();
    assert_eq!(editor.value("panels", "bg"), None);
    assert_eq!(editor.value("typography", "size_base"), Some("14px"));
}

#[test]
fn history_keeps_only_the_configured_number_of_snapshots() {
    let config = EditorConfig {
        undo_capacity: 3,
        ..EditorConfig::default()
    };
    let (mut editor, _, _) = editor_with(config);
    for i in 0..6 {
        editor
            .set_value("navbar", "height", Some(RawValue::Number(i as f64)), None)
            .unwrap();
    }

    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert_eq!(undone, 2);
    assert_eq!(editor.value("navbar", "height"), Some("3px"));
}

#[test]
fn clearing_a_value_only_commits_when_configured() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("forms", "color", Some("#555".into()), None)
        .unwrap();
    editor.set_value("forms", "color", None, None).unwrap();
    assert_eq!(editor.history().len(), 2);

    let config = EditorConfig {
        commit_cleared: true,
        ..EditorConfig::default()
    };
    let (mut editor, _, _) = editor_with(config);
    editor
        .set_value("forms", "color", Some("#555".into()), None)
        .unwrap();
    editor.set_value("forms", "color", None, None).unwrap();
    assert_eq!(editor.history().len(), 3);

    assert!(editor.undo());
    assert_eq!(editor.value("forms", "color"), Some("#555"));
}

#[test]
fn reset_compiles_exactly_once_with_an_empty_map() {
    let (mut editor, _, log) = editor();
    editor
        .set_value("navbar", "height", Some(RawValue::Number(60.0)), None)
        .unwrap();
    editor
        .set_value("colors", "primary", Some("#428bca".into()), None)
        .unwrap();
    let compiles = editor.compile_count();
    let entries = editor.history().len();

    editor.reset_all();

    assert_eq!(editor.compile_count(), compiles + 1);
    assert!(log.borrow().last().unwrap().is_empty());
    assert!(editor.override_map().is_empty());
    assert_eq!(editor.history().len(), entries);
}

#[test]
fn reset_can_be_undone_when_clears_are_committed() {
    let config = EditorConfig {
        commit_cleared: true,
        ..EditorConfig::default()
    };
    let (mut editor, _, _) = editor_with(config);
    editor
        .set_value("navbar", "height", Some(RawValue::Number(60.0)), None)
        .unwrap();
    editor.reset_all();
    assert!(editor.override_map().is_empty());

    assert!(editor.undo());
    assert_eq!(editor.override_map(), map(&[("@navbar-height", "60px")]));
}

#[test]
fn units_are_appended_to_dimension_fields_only() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("navbar", "height", Some(RawValue::Number(10.0)), None)
        .unwrap();
    assert_eq!(editor.value("navbar", "height"), Some("10px"));

    editor
        .set_value("navbar", "height", Some(RawValue::Number(2.5)), Some("em"))
        .unwrap();
    assert_eq!(editor.value("navbar", "height"), Some("2.5em"));

    editor.set_value("navbar", "height", None, None).unwrap();
    assert_eq!(editor.value("navbar", "height"), None);

    editor
        .set_value("navbar", "bg", Some("#101010".into()), Some("px"))
        .unwrap();
    assert_eq!(editor.value("navbar", "bg"), Some("#101010"));
}

#[test]
fn unknown_group_or_field_is_an_error() {
    let (mut editor, _, _) = editor();
    assert!(matches!(
        editor.set_value("sidebar", "width", None, None),
        Err(EditorError::UnknownGroup(name)) if name == "sidebar"
    ));
    assert!(matches!(
        editor.set_value("navbar", "width", None, None),
        Err(EditorError::UnknownField { .. })
    ));
    assert_eq!(editor.compile_count(), 0);
}

#[test]
fn import_ignores_unknown_variables() {
    let (mut editor, _, _) = editor();
    let loaded = editor.import_from(&map(&[
        ("@nonexistent-variable", "red"),
        ("@brand-primary", "#0275d8"),
    ]));

    assert_eq!(loaded, 1);
    assert_eq!(editor.override_map(), map(&[("@brand-primary", "#0275d8")]));
}

#[test]
fn import_is_a_single_undoable_step() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("colors", "info", Some("#5bc0de".into()), None)
        .unwrap();

    editor.import_from(&map(&[
        ("@brand-primary", "#0275d8"),
        ("@navbar-height", "3rem"),
        ("@panel-bg", "#fcfcfc"),
    ]));
    assert_eq!(editor.history().len(), 3);
    assert_eq!(editor.override_map().len(), 4);

    assert!(editor.undo());
    assert_eq!(editor.override_map(), map(&[("@brand-info", "#5bc0de")]));
}

#[test]
fn import_values_are_taken_verbatim() {
    let (mut editor, _, _) = editor();
    editor.import_from(&map(&[("@navbar-height", "3rem")]));
    assert_eq!(editor.value("navbar", "height"), Some("3rem"));
}

#[test]
fn replace_mode_clears_fields_missing_from_the_import() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("colors", "info", Some("#5bc0de".into()), None)
        .unwrap();

    editor.import(&map(&[("@brand-primary", "#0275d8")]), ImportMode::Replace);
    assert_eq!(editor.override_map(), map(&[("@brand-primary", "#0275d8")]));
}

#[test]
fn malformed_import_leaves_everything_untouched() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("colors", "primary", Some("#111".into()), None)
        .unwrap();
    let compiles = editor.compile_count();
    let before = editor.override_map();

    let err = editor
        .import_json(r##"{"@brand-primary": "#222", "@body-bg": "#"##, ImportMode::Replace)
        .unwrap_err();
    assert!(matches!(err, EditorError::Import(ImportError::Malformed(_))));

    let err = editor
        .import_json(r##"{"@brand-primary": "#222", "@body-bg": [1]}"##, ImportMode::Merge)
        .unwrap_err();
    assert!(matches!(err, EditorError::Import(ImportError::UnsupportedValue(_))));

    assert_eq!(editor.override_map(), before);
    assert_eq!(editor.compile_count(), compiles);
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn presets_replace_the_whole_theme() {
    let (mut editor, _, _) = editor();
    editor
        .set_value("forms", "height", Some(RawValue::Number(34.0)), None)
        .unwrap();

    let preset = ThemePreset::Slate.overrides();
    assert_eq!(editor.apply_preset(ThemePreset::Slate), preset.len());

    let current = editor.override_map();
    assert_eq!(current.len(), preset.len());
    for (variable, value) in &preset {
        assert_eq!(current.get(variable), Some(value), "{variable}");
    }

    editor.apply_preset(ThemePreset::Stock);
    assert!(editor.override_map().is_empty());
}

#[test]
fn later_groups_win_variable_collisions() {
    let (compiler, _) = recording_compiler();
    let first = ModifierGroup::new("first", "first", vec![ModifierSpec::new("a", "@shared")]).unwrap();
    let second = ModifierGroup::new("second", "second", vec![ModifierSpec::new("b", "@shared")]).unwrap();
    let mut editor = Editor::builder(compiler)
        .clock(ManualClock::new())
        .group(first)
        .group(second)
        .build()
        .unwrap();

    editor.set_value("first", "a", Some("1".into()), None).unwrap();
    assert_eq!(editor.override_map(), map(&[("@shared", "1")]));
    editor.set_value("second", "b", Some("2".into()), None).unwrap();
    assert_eq!(editor.override_map(), map(&[("@shared", "2")]));
}

#[test]
fn builder_rejects_bad_registrations() {
    let (compiler, _) = recording_compiler();
    let err = Editor::builder(compiler)
        .schema(&NAVBAR, None)
        .unwrap()
        .schema(&NAVBAR, None)
        .unwrap()
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, ConfigError::DuplicateGroup(name) if name == "navbar"));

    let (compiler, _) = recording_compiler();
    let err = Editor::builder(compiler).schema(&BUTTONS, None).err().unwrap();
    assert!(matches!(err, ConfigError::MissingDiscriminator { .. }));

    let (compiler, _) = recording_compiler();
    let config = EditorConfig {
        undo_capacity: 0,
        ..EditorConfig::default()
    };
    let err = Editor::builder(compiler).config(config).build().err().unwrap();
    assert!(matches!(err, ConfigError::Invalid { option: "undo_capacity", .. }));
}

#[test]
fn compiled_output_is_scoped_on_export() {
    let config = EditorConfig {
        export: restyle_theme::ExportTarget {
            css_selector: Some("#preview".to_string()),
            ..Default::default()
        },
        ..EditorConfig::default()
    };
    let (mut editor, _, _) = editor_with(config);
    assert!(matches!(
        editor.export_compiled_output(),
        Err(EditorError::NoOutput)
    ));

    editor
        .set_value("colors", "text", Some("#222".into()), None)
        .unwrap();
    assert_eq!(editor.export_compiled_output().unwrap(), "#preview{color:#222}");
    assert_eq!(
        editor.export_compiled_output_scoped(None).unwrap(),
        "body{color:#222}"
    );
}

// ========== Persistence ==========

#[derive(Default)]
struct MemoryTransport {
    files: HashMap<String, String>,
    sent: Vec<(Method, String)>,
}

impl Transport for MemoryTransport {
    fn send(&mut self, method: Method, url: &str, body: &str) -> Result<(), TransportError> {
        self.sent.push((method, url.to_string()));
        self.files.insert(url.to_string(), body.to_string());
        Ok(())
    }

    fn load(&mut self, url: &str) -> Result<String, TransportError> {
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(url.to_string()))
    }
}

fn saving_config(url: &str) -> EditorConfig {
    EditorConfig {
        save: Some(SaveTarget {
            url: url.to_string(),
            method: Method::Put,
            callback: None,
        }),
        ..EditorConfig::default()
    }
}

#[test]
fn save_then_load_round_trips_through_the_transport() {
    let mut transport = MemoryTransport::default();
    let (mut saving, _, _) = editor_with(saving_config("memory://theme.json"));
    saving
        .set_value("navbar", "inverse_bg", Some("#222".into()), None)
        .unwrap();
    saving.save(&mut transport).unwrap();
    assert_eq!(transport.sent, vec![(Method::Put, "memory://theme.json".to_string())]);

    let (mut other, _, _) = editor();
    other
        .set_value("colors", "danger", Some("#d9534f".into()), None)
        .unwrap();
    other.load_theme(&mut transport, "memory://theme.json").unwrap();
    assert_eq!(other.override_map(), map(&[("@navbar-inverse-bg", "#222")]));
}

#[test]
fn save_without_a_target_is_a_config_error() {
    let mut transport = MemoryTransport::default();
    let (editor, _, _) = editor();
    assert!(matches!(
        editor.save(&mut transport),
        Err(EditorError::Config(ConfigError::MissingRequired("save")))
    ));
    assert!(transport.sent.is_empty());
}

#[test]
fn initial_theme_is_loaded_when_configured() {
    let mut transport = MemoryTransport::default();
    transport.files.insert(
        "themes/start.json".to_string(),
        r##"{"version": 1, "variables": {"@body-bg": "#fdfdfd"}}"##.to_string(),
    );

    let (mut plain, _, _) = editor();
    assert!(!plain.load_initial_theme(&mut transport).unwrap());

    let config = EditorConfig {
        initial_theme: Some("themes/start.json".to_string()),
        ..EditorConfig::default()
    };
    let (mut editor, _, _) = editor_with(config);
    assert!(editor.load_initial_theme(&mut transport).unwrap());
    assert_eq!(editor.value("colors", "body_bg"), Some("#fdfdfd"));

    let config = EditorConfig {
        initial_theme: Some("themes/missing.json".to_string()),
        ..EditorConfig::default()
    };
    let (mut editor, _, _) = editor_with(config);
    assert!(matches!(
        editor.load_initial_theme(&mut transport),
        Err(EditorError::Transport(TransportError::NotFound(_)))
    ));
}

// ========== Controls ==========

struct TextInput {
    id: ControlId,
    tag: String,
    key: String,
    unit: Option<String>,
    input: String,
    shown: Vec<Option<String>>,
}

impl TextInput {
    fn shared(id: u64, tag: &str, key: &str) -> Rc<RefCell<TextInput>> {
        Rc::new(RefCell::new(TextInput {
            id: ControlId(id),
            tag: tag.to_string(),
            key: key.to_string(),
            unit: None,
            input: String::new(),
            shown: Vec::new(),
        }))
    }
}

impl Control for TextInput {
    fn id(&self) -> ControlId {
        self.id
    }

    fn group_tag(&self) -> Option<&str> {
        Some(&self.tag)
    }

    fn field_key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn unit_override(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    fn current_value(&self) -> Option<String> {
        Some(self.input.clone())
    }

    fn show_value(&mut self, value: Option<&str>) {
        self.shown.push(value.map(str::to_string));
    }
}

#[test]
fn control_input_flows_into_the_bound_modifier() {
    let (mut editor, _, _) = editor();
    let height = TextInput::shared(1, "navbar", "height");
    let button_bg = TextInput::shared(2, "btn-primary", "bg");
    let stray = TextInput::shared(3, "sidebar", "width");
    let controls: Vec<SharedControl> = vec![height.clone(), button_bg.clone(), stray.clone()];

    assert_eq!(editor.bind_controls(&controls), 2);

    height.borrow_mut().input = "48".to_string();
    editor.dispatch_input(ControlId(1)).unwrap();
    assert_eq!(editor.value("navbar", "height"), Some("48px"));
    assert_eq!(height.borrow().shown, vec![Some("48".to_string())]);

    button_bg.borrow_mut().input = "#286090".to_string();
    editor.dispatch_input(ControlId(2)).unwrap();
    assert_eq!(editor.value("buttons-primary", "bg"), Some("#286090"));

    assert!(matches!(
        editor.dispatch_input(ControlId(3)),
        Err(EditorError::UnboundControl(_))
    ));
}

#[test]
fn empty_control_input_clears_the_override() {
    let (mut editor, _, _) = editor();
    let color = TextInput::shared(5, "colors", "link");
    editor.bind_controls(&[color.clone() as SharedControl]);

    color.borrow_mut().input = "#06c".to_string();
    editor.dispatch_input(ControlId(5)).unwrap();
    color.borrow_mut().input = "   ".to_string();
    editor.dispatch_input(ControlId(5)).unwrap();

    assert_eq!(editor.value("colors", "link"), None);
    assert_eq!(color.borrow().shown.last(), Some(&None));
}

#[test]
fn numeric_looking_input_is_kept_verbatim_for_text_fields() {
    let (mut editor, _, _) = editor();
    let line_height = TextInput::shared(9, "typography", "line_height");
    let size = TextInput::shared(10, "typography", "size_base");
    let controls: Vec<SharedControl> = vec![line_height.clone(), size.clone()];
    editor.bind_controls(&controls);

    line_height.borrow_mut().input = "1.50".to_string();
    editor.dispatch_input(ControlId(9)).unwrap();
    assert_eq!(editor.value("typography", "line_height"), Some("1.50"));

    line_height.borrow_mut().input = "1e3".to_string();
    editor.dispatch_input(ControlId(9)).unwrap();
    assert_eq!(editor.value("typography", "line_height"), Some("1e3"));

    size.borrow_mut().input = "014".to_string();
    editor.dispatch_input(ControlId(10)).unwrap();
    assert_eq!(editor.value("typography", "size_base"), Some("14px"));
}

#[test]
fn control_unit_override_wins_over_the_field_unit() {
    let (mut editor, _, _) = editor();
    let padding = TextInput::shared(8, "panel", "body_padding");
    padding.borrow_mut().unit = Some("em".to_string());
    editor.bind_controls(&[padding.clone() as SharedControl]);

    padding.borrow_mut().input = "1.5".to_string();
    editor.dispatch_input(ControlId(8)).unwrap();
    assert_eq!(editor.value("panels", "body_padding"), Some("1.5em"));
}

#[test]
fn undo_pushes_restored_values_to_controls() {
    let (mut editor, _, _) = editor();
    let bg = TextInput::shared(4, "input", "bg");
    editor.bind_controls(&[bg.clone() as SharedControl]);

    editor
        .set_value("forms", "bg", Some("#fff".into()), None)
        .unwrap();
    editor
        .set_value("forms", "bg", Some("#000".into()), None)
        .unwrap();
    editor.undo();

    assert_eq!(bg.borrow().shown.last(), Some(&Some("#fff".to_string())));
}

#[test]
fn dropped_controls_can_no_longer_dispatch() {
    let (mut editor, _, _) = editor();
    let height = TextInput::shared(6, "navbar", "height");
    editor.bind_controls(&[height.clone() as SharedControl]);
    drop(height);

    assert!(matches!(
        editor.dispatch_input(ControlId(6)),
        Err(EditorError::UnboundControl(_))
    ));
    assert!(!editor.unbind_control(ControlId(6)));
}

#[test]
fn unbound_controls_stop_receiving_values() {
    let (mut editor, _, _) = editor();
    let color = TextInput::shared(7, "navbar", "color");
    editor.bind_controls(&[color.clone() as SharedControl]);

    assert!(editor.unbind_control(ControlId(7)));
    editor
        .set_value("navbar", "color", Some("#777".into()), None)
        .unwrap();
    assert!(color.borrow().shown.is_empty());
}
