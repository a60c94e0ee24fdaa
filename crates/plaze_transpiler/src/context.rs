//! Per-call transpilation state.

use crate::error::TranspileResult;
use crate::transpiler::Transpiler;

/// State owned by a single top-level transpile call.
///
/// Holds the footer queue and the offset of the span currently being
/// transformed. Directive handlers and extensions receive it so they can
/// defer code to the footer or call back into the pipeline.
#[derive(Debug)]
pub struct TranspileContext<'a> {
    transpiler: &'a Transpiler,
    footer: Vec<String>,
    offset: usize,
}

impl<'a> TranspileContext<'a> {
    pub(crate) fn new(transpiler: &'a Transpiler) -> Self {
        Self {
            transpiler,
            footer: Vec::new(),
            offset: 0,
        }
    }

    /// The transpiler running this call.
    pub fn transpiler(&self) -> &'a Transpiler {
        self.transpiler
    }

    /// Queue code to be emitted after the document body.
    ///
    /// Footer entries are written in reverse order of insertion.
    pub fn push_footer(&mut self, line: impl Into<String>) {
        self.footer.push(line.into());
    }

    /// Footer entries queued so far, in insertion order.
    pub fn footer(&self) -> &[String] {
        &self.footer
    }

    /// Byte offset in the template of the span being transformed.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Run directive transpilation over `text`.
    pub fn transpile_statements(&mut self, text: &str) -> TranspileResult<String> {
        let transpiler = self.transpiler;
        transpiler.statements().transpile(text, self)
    }

    /// Run the raw, escaped and regular echo passes over `text`.
    pub fn transpile_echos(&self, text: &str) -> TranspileResult<String> {
        self.transpiler.echos().transpile(text, self.offset)
    }

    pub(crate) fn into_footer(self) -> Vec<String> {
        self.footer
    }
}
