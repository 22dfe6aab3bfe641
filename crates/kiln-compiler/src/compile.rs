//! Per-file pipeline: parse, walk, edit, print.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_config::EmitTarget;
use kiln_gen::{Allocator, LineIndex, ParseOptions};
use kiln_graph::{FileKind, SourceLocation};
use oxc_ast::ast::Program;
use oxc_codegen::Codegen;
use oxc_semantic::SemanticBuilder;
use oxc_transformer::{TransformOptions, Transformer};

use crate::bus::ObserverBus;
use crate::command::CommandPolicy;
use crate::context::{CompileEnv, FileContext};
use crate::decorators::{DecoratorObserver, DecoratorTable};
use crate::error::{CompileError, ErrorKind, Warning};
use crate::scope::ModuleScope;

/// A source file scheduled for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, kind: FileKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// The transformed text of one source file.
#[derive(Debug, Clone)]
pub struct CompiledFile {
    pub path: PathBuf,
    pub kind: FileKind,
    pub code: String,
    pub warnings: Vec<Warning>,
}

impl ObserverBus {
    /// The bus every build uses: decorator handlers first, then the command
    /// file policy.
    pub fn standard(table: Arc<DecoratorTable>) -> Self {
        let mut bus = Self::new();
        bus.subscribe(Arc::new(DecoratorObserver::new(table)));
        bus.subscribe(Arc::new(CommandPolicy));
        bus
    }
}

/// Compile one file. Every error found in the file is returned, not just the
/// first.
pub fn compile_source(
    env: &CompileEnv<'_>,
    file: &SourceFile,
    source: &str,
) -> Result<CompiledFile, Vec<CompileError>> {
    let _span = tracing::debug_span!("compile_file", path = %file.path.display()).entered();

    let allocator = Allocator::default();
    let path_str = file.path.to_string_lossy();
    let options = ParseOptions::from_path(&path_str).recover();
    let parsed = kiln_gen::parse(&allocator, &path_str, source, &options).map_err(|err| {
        vec![
            CompileError::new(ErrorKind::Parse, err.to_string())
                .at(SourceLocation::new(&file.path, 1, 1)),
        ]
    })?;

    let mut warnings = Vec::new();
    if parsed.has_errors() {
        let lines = LineIndex::new(source);
        for diagnostic in &parsed.diagnostics {
            let (line, column) = lines.line_column(diagnostic.offset.unwrap_or(0), source);
            let warning = Warning::new(
                diagnostic.message.clone(),
                Some(SourceLocation::new(&file.path, line, column)),
            );
            tracing::warn!("recovered from syntax error: {warning}");
            warnings.push(warning);
        }
    }

    let mut program = parsed.program;
    let scope = ModuleScope::collect(&program);
    let mut cx = FileContext::new(*env, &file.path, file.kind, source, scope);
    env.bus.walk(&program, &mut cx);

    let (errors, edits) = cx.finish();
    if !errors.is_empty() {
        return Err(errors);
    }

    edits
        .apply(&mut program, &allocator)
        .map_err(|err| vec![codegen_error(&file.path, err)])?;

    if env.emit == EmitTarget::Js {
        strip_types(&allocator, &file.path, &mut program).map_err(|err| vec![err])?;
    }

    let code = Codegen::new().build(&program).code;
    tracing::trace!(bytes = code.len(), "compiled");

    Ok(CompiledFile {
        path: file.path.clone(),
        kind: file.kind,
        code,
        warnings,
    })
}

fn strip_types<'a>(
    allocator: &'a Allocator,
    path: &Path,
    program: &mut Program<'a>,
) -> Result<(), CompileError> {
    let scoping = SemanticBuilder::new().build(program).semantic.into_scoping();
    let result = Transformer::new(allocator, path, &TransformOptions::default())
        .build_with_scoping(scoping, program);

    if result.errors.is_empty() {
        return Ok(());
    }
    let message = result
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(codegen_error(path, message))
}

fn codegen_error(path: &Path, err: impl std::fmt::Display) -> CompileError {
    CompileError::new(
        ErrorKind::Codegen,
        format!("{}: cannot emit JavaScript: {err}", path.display()),
    )
}
