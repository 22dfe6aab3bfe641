//! Generated modules, assembled statement by statement.

use crate::error::{GenError, Result};
use oxc_allocator::Allocator;
use oxc_ast::AstBuilder;
use oxc_ast::ast::Statement;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::{SPAN, SourceType};

/// A module under construction.
///
/// Every snippet is parsed into the builder's arena as it is pushed, so a
/// malformed snippet fails at the call that introduced it and leaves the
/// module untouched.
pub struct ProgramBuilder<'a> {
    allocator: &'a Allocator,
    source_type: SourceType,
    statements: Vec<Statement<'a>>,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(allocator: &'a Allocator) -> Self {
        Self::with_source_type(allocator, SourceType::mjs())
    }

    pub fn with_source_type(allocator: &'a Allocator, source_type: SourceType) -> Self {
        Self {
            allocator,
            source_type,
            statements: Vec::new(),
        }
    }

    /// Append every statement of `source`.
    pub fn push_source(&mut self, source: &str) -> Result<()> {
        let parsed = parse_snippet(self.allocator, self.source_type, source)?;
        self.statements.extend(parsed);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Print the module.
    pub fn generate(self) -> Result<String> {
        let ast = AstBuilder::new(self.allocator);
        let program = ast.program(
            SPAN,
            self.source_type,
            "",
            ast.vec(),
            None,
            ast.vec(),
            ast.vec_from_iter(self.statements),
        );
        Ok(Codegen::new().build(&program).code)
    }
}

/// Parse generated code into statements owned by `allocator`.
///
/// Generated code has no business being malformed, so there is no recovery
/// here: any syntax error rejects the whole snippet.
pub fn parse_snippet<'a>(
    allocator: &'a Allocator,
    source_type: SourceType,
    source: &str,
) -> Result<Vec<Statement<'a>>> {
    let text = allocator.alloc_str(source);
    let ret = Parser::new(allocator, text, source_type).parse();

    if !ret.panicked && ret.errors.is_empty() {
        return Ok(ret.program.body.into_iter().collect());
    }
    let message = ret
        .errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(GenError::InvalidSnippet {
        snippet: source.to_owned(),
        message,
    })
}
