//! State shared by the observers of one file.

use std::path::Path;

use kiln_config::EmitTarget;
use kiln_gen::LineIndex;
use kiln_graph::{FileKind, ModuleRef, SourceLocation, SymbolGraph};
use oxc_span::Span;

use crate::bus::ObserverBus;
use crate::edits::EditQueue;
use crate::error::{CompileError, ErrorKind};
use crate::layout::OutputLayout;
use crate::resolver::ImportResolver;
use crate::scope::ModuleScope;

/// Build-wide collaborators, borrowed by every file compilation.
#[derive(Debug, Clone, Copy)]
pub struct CompileEnv<'c> {
    pub graph: &'c SymbolGraph,
    pub resolver: &'c ImportResolver,
    pub layout: &'c OutputLayout,
    pub bus: &'c ObserverBus,
    pub emit: EmitTarget,
}

/// Everything an observer may read or change while one file is walked.
///
/// Observers never touch the tree directly: they record edits here, and the
/// edits are applied once the walk is over.
pub struct FileContext<'c> {
    pub env: CompileEnv<'c>,
    pub path: &'c Path,
    pub kind: FileKind,
    pub module: ModuleRef,
    pub source: &'c str,
    pub scope: ModuleScope,
    pub edits: EditQueue,
    line_index: LineIndex,
    errors: Vec<CompileError>,
}

impl<'c> FileContext<'c> {
    pub fn new(
        env: CompileEnv<'c>,
        path: &'c Path,
        kind: FileKind,
        source: &'c str,
        scope: ModuleScope,
    ) -> Self {
        Self {
            env,
            path,
            kind,
            module: ModuleRef::file(path),
            source,
            scope,
            edits: EditQueue::default(),
            line_index: LineIndex::new(source),
            errors: Vec::new(),
        }
    }

    pub fn location(&self, span: Span) -> SourceLocation {
        let (line, column) = self.line_index.line_column(span.start, self.source);
        SourceLocation::new(self.path, line, column)
    }

    /// A located error pointing at `span`, with the excerpt attached.
    pub fn error(&self, kind: ErrorKind, span: Span, message: impl Into<String>) -> CompileError {
        CompileError::new(kind, message)
            .at(self.location(span))
            .with_excerpt(self.path, self.source, span.start, span.size())
    }

    /// Attach this file's location to an error raised without one.
    pub fn locate(&self, error: CompileError, span: Span) -> CompileError {
        if error.location().is_some() {
            return error;
        }
        error
            .at(self.location(span))
            .with_excerpt(self.path, self.source, span.start, span.size())
    }

    pub fn report(&mut self, error: CompileError) {
        tracing::debug!(code = error.code(), "{error}");
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Split into the collected errors and the pending edits.
    pub fn finish(self) -> (Vec<CompileError>, EditQueue) {
        (self.errors, self.edits)
    }
}
