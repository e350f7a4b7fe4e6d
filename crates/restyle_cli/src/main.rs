//! Restyle CLI
//!
//! Command-line front end for the theme editor:
//!
//! - `apply`: compile a Less source once with a theme's overrides
//! - `export`: normalize a theme (optionally on top of a preset) to JSON
//! - `set`: edit fields of a theme file in place
//! - `watch`: recompile whenever the theme or Less sources change
//! - `schemas`: list the editable groups, fields and variables
//! - `init`: write a default `restyle.toml`

mod commands;
mod files;
mod lessc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use restyle_theme::EditorConfig;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Live Less theme editor
#[derive(Parser, Debug)]
#[command(name = "restyle")]
#[command(about = "Edit, compile and export Less themes")]
#[command(version)]
struct Args {
    /// Editor configuration file (defaults to ./restyle.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a Less source with a theme applied
    Apply {
        /// Less entry file
        less: PathBuf,

        /// Theme JSON (defaults to the configured initial theme)
        #[arg(short, long)]
        theme: Option<PathBuf>,

        /// Selector to scope every rule under (defaults to export.css_selector)
        #[arg(short, long)]
        scope: Option<String>,

        /// Output CSS file (defaults to export.css_file)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Less compiler binary
        #[arg(long)]
        lessc: Option<PathBuf>,
    },

    /// Write a theme as JSON
    Export {
        /// Theme JSON to start from
        #[arg(short, long)]
        theme: Option<PathBuf>,

        /// Built-in preset applied before the theme
        #[arg(short, long)]
        preset: Option<String>,

        /// Wrap variables in a versioned envelope
        #[arg(long)]
        versioned: bool,

        /// Output JSON file (defaults to export.json_file)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Set or clear theme fields, e.g. `navbar.height=60` or `colors.primary=`
    Set {
        /// Theme JSON to edit (created if missing)
        #[arg(short, long)]
        theme: PathBuf,

        /// Unit appended to dimension values instead of the field's own
        #[arg(short, long)]
        unit: Option<String>,

        /// Assignments of the form group.field=value
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Recompile on every change to the theme or Less sources
    Watch {
        /// Less entry file
        less: PathBuf,

        /// Theme JSON to watch
        #[arg(short, long)]
        theme: PathBuf,

        /// Output CSS file (defaults to export.css_file)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Less compiler binary
        #[arg(long)]
        lessc: Option<PathBuf>,
    },

    /// List editable groups and their variables
    Schemas {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();

    match args.command {
        Command::Schemas { json } => commands::schemas(json),
        Command::Init { force } => init(args.config, force),
        Command::Apply {
            less,
            theme,
            scope,
            out,
            lessc,
        } => {
            let config = commands::load_config(args.config.as_deref())?;
            commands::apply(config, &less, lessc, theme.as_deref(), scope.as_deref(), out)
        }
        Command::Export {
            theme,
            preset,
            versioned,
            out,
        } => {
            let config = commands::load_config(args.config.as_deref())?;
            commands::export(config, theme.as_deref(), preset.as_deref(), versioned, out)
        }
        Command::Set {
            theme,
            unit,
            assignments,
        } => {
            let config = commands::load_config(args.config.as_deref())?;
            commands::set(config, &theme, &assignments, unit.as_deref())
        }
        Command::Watch {
            less,
            theme,
            out,
            lessc,
        } => {
            let config = commands::load_config(args.config.as_deref())?;
            commands::watch(config, &less, lessc, &theme, out).await
        }
    }
}

fn init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(commands::CONFIG_FILE));
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    fs::write(&path, EditorConfig::default().to_toml()?)?;
    info!("Wrote {}", path.display());
    Ok(())
}
