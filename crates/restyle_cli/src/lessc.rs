//! `lessc` compiler backend
//!
//! Runs the Less command-line compiler once per compile, passing every
//! override as `--modify-var`. Failures are logged and leave the previous
//! output in place.

use restyle_core::OverrideMap;
use restyle_theme::{Compiler, OutputSink};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, error};

/// Ways a `lessc` run can fail
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to run {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {stderr}", .program.display())]
    Failed {
        program: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("compiler output is not UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Compiles a Less entry file with the `lessc` binary
#[derive(Clone, Debug)]
pub struct LesscCompiler {
    program: PathBuf,
    source: PathBuf,
}

impl LesscCompiler {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("lessc"),
            source: source.into(),
        }
    }

    /// Use a different compiler binary
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Command-line arguments for one compile
    pub fn args(&self, overrides: &OverrideMap) -> Vec<String> {
        let mut args: Vec<String> = overrides
            .iter()
            .map(|(variable, value)| {
                let name = variable.strip_prefix('@').unwrap_or(variable);
                format!("--modify-var={}={}", name, value)
            })
            .collect();
        args.push(self.source.display().to_string());
        args
    }

    /// Run the compiler once and return the generated CSS
    pub fn run(&self, overrides: &OverrideMap) -> Result<String, CompileError> {
        let out = Command::new(&self.program)
            .args(self.args(overrides))
            .output()
            .map_err(|source| CompileError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !out.status.success() {
            return Err(CompileError::Failed {
                program: self.program.clone(),
                status: out.status,
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8(out.stdout)?)
    }
}

impl Compiler for LesscCompiler {
    fn compile(&mut self, overrides: &OverrideMap, output: &OutputSink) {
        debug!(
            "LesscCompiler: compiling {} with {} overrides",
            self.source.display(),
            overrides.len()
        );
        match self.run(overrides) {
            Ok(css) => output.publish(css),
            Err(e) => error!("LesscCompiler: {}", e),
        }
    }
}
