//! Subcommand implementations

use anyhow::{bail, Context, Result};
use notify::{Event, RecursiveMode, Watcher};
use restyle_core::{OverrideMap, RawValue};
use restyle_theme::{
    default_schemas, Compiler, Editor, EditorConfig, ExportFormat, ImportMode, Method,
    OutputSink, SaveTarget, ThemePreset,
};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::files::FileTransport;
use crate::lessc::LesscCompiler;

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "restyle.toml";

/// Load the editor configuration.
///
/// An explicit path must exist. Without one, `restyle.toml` is used when
/// present and the defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            if !default.exists() {
                debug!("No {} found, using defaults", CONFIG_FILE);
                return Ok(EditorConfig::default());
            }
            default
        }
    };
    let config = EditorConfig::load_from_path(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

fn build_editor(config: EditorConfig, compiler: impl Compiler + 'static) -> Result<Editor> {
    let editor = Editor::builder(compiler)
        .config(config)
        .standard_groups()?
        .build()?;
    Ok(editor)
}

/// Editor whose compiles do nothing, for commands that only touch JSON
fn json_editor(config: EditorConfig) -> Result<Editor> {
    build_editor(config, |_: &OverrideMap, _: &OutputSink| {})
}

/// Load the theme named on the command line, or the configured initial theme
fn load_theme(editor: &mut Editor, transport: &mut FileTransport, theme: Option<&Path>) -> Result<()> {
    match theme {
        Some(path) => {
            let url = path.display().to_string();
            editor
                .load_theme(transport, &url)
                .with_context(|| format!("Failed to load theme {}", url))?;
        }
        None => {
            if !editor.load_initial_theme(transport)? {
                debug!("No theme given, starting from framework defaults");
            }
        }
    }
    Ok(())
}

fn parse_preset(id: &str) -> Result<ThemePreset> {
    match ThemePreset::from_id(id) {
        Some(preset) => Ok(preset),
        None => {
            let known: Vec<&str> = ThemePreset::all().iter().map(|p| p.id()).collect();
            bail!("Unknown preset '{}' (expected one of: {})", id, known.join(", "))
        }
    }
}

/// Print the schema catalogue
pub fn schemas(json: bool) -> Result<()> {
    if json {
        let catalogue: Vec<serde_json::Value> = default_schemas()
            .iter()
            .map(|schema| {
                serde_json::json!({
                    "name": schema.name,
                    "tag": schema.tag,
                    "variants": schema.variants,
                    "fields": schema.fields.iter().map(|f| serde_json::json!({
                        "field": f.field,
                        "variable": f.variable,
                        "unit": f.unit,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&catalogue)?);
        return Ok(());
    }

    for schema in default_schemas() {
        if schema.is_multi_instance() {
            println!("{} [{}] variants: {}", schema.name, schema.tag, schema.variants.join(", "));
        } else {
            println!("{} [{}]", schema.name, schema.tag);
        }
        for field in schema.fields {
            match field.unit {
                Some(unit) => println!("  {:<20} {} ({})", field.field, field.variable, unit),
                None => println!("  {:<20} {}", field.field, field.variable),
            }
        }
    }
    Ok(())
}

/// Write the theme JSON, optionally merged with a preset
pub fn export(
    config: EditorConfig,
    theme: Option<&Path>,
    preset: Option<&str>,
    versioned: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let out = out.unwrap_or_else(|| PathBuf::from(&config.export.json_file));
    let mut editor = json_editor(config)?;
    let mut transport = FileTransport::default();

    if let Some(id) = preset {
        editor.apply_preset(parse_preset(id)?);
    }
    match theme {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read theme {}", path.display()))?;
            editor.import_json(&text, ImportMode::Merge)?;
        }
        None if preset.is_none() => load_theme(&mut editor, &mut transport, None)?,
        None => {}
    }

    let format = if versioned {
        ExportFormat::Versioned
    } else {
        ExportFormat::Flat
    };
    fs::write(&out, editor.export_json_snapshot(format))
        .with_context(|| format!("Failed to write {}", out.display()))?;
    info!("Exported {} overrides to {}", editor.override_map().len(), out.display());
    Ok(())
}

/// Parse `group.field=value` into its parts. An empty value clears the field.
fn parse_assignment(assignment: &str) -> Result<(&str, &str, Option<RawValue>)> {
    let Some((target, value)) = assignment.split_once('=') else {
        bail!("Expected group.field=value, got '{}'", assignment);
    };
    let Some((group, field)) = target.rsplit_once('.') else {
        bail!("Expected group.field before '=', got '{}'", target);
    };
    let value = value.trim();
    let value = (!value.is_empty()).then(|| RawValue::parse(value));
    Ok((group, field, value))
}

/// Edit fields of a theme file and save it back
pub fn set(mut config: EditorConfig, theme: &Path, assignments: &[String], unit: Option<&str>) -> Result<()> {
    if config.save.is_none() {
        config.save = Some(SaveTarget {
            url: theme.display().to_string(),
            method: Method::Put,
            callback: None,
        });
    }
    let mut editor = json_editor(config)?;
    let mut transport = FileTransport::default();

    if theme.exists() {
        load_theme(&mut editor, &mut transport, Some(theme))?;
    }
    for assignment in assignments {
        let (group, field, value) = parse_assignment(assignment)?;
        editor.set_value(group, field, value, unit)?;
        match editor.value(group, field) {
            Some(value) => info!("{}.{} = {}", group, field, value),
            None => info!("{}.{} cleared", group, field),
        }
    }
    editor.save(&mut transport)?;
    Ok(())
}

fn write_css(editor: &Editor, out: &Path, scope: Option<&str>) -> Result<()> {
    let css = match scope {
        Some(scope) => editor.export_compiled_output_scoped(Some(scope))?,
        None => editor.export_compiled_output()?,
    };
    fs::write(out, &css).with_context(|| format!("Failed to write {}", out.display()))?;
    info!("Wrote {} bytes of CSS to {}", css.len(), out.display());
    Ok(())
}

/// Compile the Less source once with the theme applied
pub fn apply(
    config: EditorConfig,
    less: &Path,
    lessc: Option<PathBuf>,
    theme: Option<&Path>,
    scope: Option<&str>,
    out: Option<PathBuf>,
) -> Result<()> {
    let out = out.unwrap_or_else(|| PathBuf::from(&config.export.css_file));
    let mut compiler = LesscCompiler::new(less);
    if let Some(program) = lessc {
        compiler = compiler.with_program(program);
    }
    let mut editor = build_editor(config, compiler)?;
    let mut transport = FileTransport::default();

    load_theme(&mut editor, &mut transport, theme)?;
    if editor.compile_count() == 0 {
        editor.request_recompilation();
    }
    write_css(&editor, &out, scope).context("lessc produced no output")
}

/// Recompile whenever the theme file or Less sources change
pub async fn watch(
    config: EditorConfig,
    less: &Path,
    lessc: Option<PathBuf>,
    theme: &Path,
    out: Option<PathBuf>,
) -> Result<()> {
    let out = out.unwrap_or_else(|| PathBuf::from(&config.export.css_file));
    let theme = fs::canonicalize(theme)
        .with_context(|| format!("Theme file not found: {}", theme.display()))?;
    let less = fs::canonicalize(less)
        .with_context(|| format!("Less source not found: {}", less.display()))?;

    let mut compiler = LesscCompiler::new(&less);
    if let Some(program) = lessc {
        compiler = compiler.with_program(program);
    }
    debug!("Compiling {} on every change", compiler.source().display());
    let mut editor = build_editor(config, compiler)?;
    let mut transport = FileTransport::default();

    reload(&mut editor, &mut transport, &theme);
    if editor.compile_count() == 0 {
        editor.request_recompilation();
    }
    let mut written = 0;
    flush(&editor, &out, &mut written);

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<PathBuf>>();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        forward_event(&tx, res);
    })?;
    for dir in watch_dirs(&theme, &less) {
        watcher.watch(&dir, RecursiveMode::Recursive)?;
        debug!("Watching {}", dir.display());
    }
    info!(
        "Watching {} and {} (Ctrl-C to stop)",
        theme.display(),
        less.display()
    );

    loop {
        let deadline = editor
            .next_deadline()
            .map(tokio::time::Instant::from_std)
            .unwrap_or_else(tokio::time::Instant::now);

        tokio::select! {
            changed = rx.recv() => {
                let Some(paths) = changed else { break };
                if paths.iter().any(|p| p == &theme) {
                    reload(&mut editor, &mut transport, &theme);
                } else if paths.iter().any(|p| p.extension().is_some_and(|e| e == "less")) {
                    editor.request_recompilation();
                }
            }
            _ = tokio::time::sleep_until(deadline), if editor.next_deadline().is_some() => {
                editor.tick();
            }
        }
        flush(&editor, &out, &mut written);
    }
    Ok(())
}

/// Pass modify and create events on to the watch loop. Returns whether the
/// event was queued.
fn forward_event(tx: &mpsc::UnboundedSender<Vec<PathBuf>>, res: notify::Result<Event>) -> bool {
    match res {
        Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
            if tx.send(event.paths).is_err() {
                debug!("Watch channel closed, dropping change event");
                return false;
            }
            true
        }
        Ok(_) => false,
        Err(e) => {
            warn!("Watch error: {}", e);
            false
        }
    }
}

fn reload(editor: &mut Editor, transport: &mut FileTransport, theme: &Path) {
    let url = theme.display().to_string();
    match editor.load_theme(transport, &url) {
        Ok(loaded) => debug!("Reloaded {} fields from {}", loaded, url),
        Err(e) => warn!("Keeping previous theme: {}", e),
    }
}

/// Write the CSS if a new compile has been published since the last write
fn flush(editor: &Editor, out: &Path, written: &mut u64) {
    let generation = editor.output().generation();
    if generation == *written {
        return;
    }
    *written = generation;
    if let Err(e) = write_css(editor, out, None) {
        warn!("{:#}", e);
    }
}

/// Directories to watch: the theme's own directory and the Less source tree
fn watch_dirs(theme: &Path, less: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in [theme.parent(), less.parent()].into_iter().flatten() {
        if dirs.iter().any(|d| dir.starts_with(d)) {
            continue;
        }
        dirs.retain(|d| !d.starts_with(dir));
        dirs.push(dir.to_path_buf());
    }
    dirs
}
