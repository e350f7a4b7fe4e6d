//! Stylesheet compiler collaborator
//!
//! The editor hands the current override map to a [`Compiler`] whenever the
//! scheduler allows it. Compilers report generated CSS through an
//! [`OutputSink`], either before returning or later from their own
//! callback; the editor only ever reads the most recent output.

use restyle_core::OverrideMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Receives stylesheet output from a compiler
#[derive(Clone, Debug, Default)]
pub struct OutputSink {
    inner: Rc<RefCell<SinkState>>,
}

#[derive(Debug, Default)]
struct SinkState {
    latest: Option<String>,
    generation: u64,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest output
    pub fn publish(&self, css: impl Into<String>) {
        let mut state = self.inner.borrow_mut();
        state.latest = Some(css.into());
        state.generation += 1;
        tracing::trace!("OutputSink: output generation {}", state.generation);
    }

    pub fn latest(&self) -> Option<String> {
        self.inner.borrow().latest.clone()
    }

    /// Number of outputs published so far
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }
}

/// Regenerates stylesheets from an override map
pub trait Compiler {
    fn compile(&mut self, overrides: &OverrideMap, output: &OutputSink);
}

impl<F> Compiler for F
where
    F: FnMut(&OverrideMap, &OutputSink),
{
    fn compile(&mut self, overrides: &OverrideMap, output: &OutputSink) {
        self(overrides, output)
    }
}
