//! Reading source text into an oxc tree.
//!
//! Syntax errors the parser recovered from come back as [`ParseDiagnostic`]s
//! next to the partial tree when recovery is enabled. A parser panic is
//! always fatal.

use crate::error::{GenError, Result};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;

#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Dialect to parse; decorators need TypeScript.
    pub source_type: SourceType,
    /// Hand back partial trees instead of failing on recoverable errors.
    pub allow_errors: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::with_type(SourceType::mjs())
    }
}

impl ParseOptions {
    fn with_type(source_type: SourceType) -> Self {
        Self {
            source_type,
            allow_errors: false,
        }
    }

    /// Pick the dialect from the file extension, falling back to TypeScript.
    pub fn from_path(path: &str) -> Self {
        Self::with_type(SourceType::from_path(path).unwrap_or_else(|_| SourceType::ts()))
    }

    pub fn typescript() -> Self {
        Self::with_type(SourceType::ts())
    }

    pub fn recover(self) -> Self {
        Self {
            allow_errors: true,
            ..self
        }
    }
}

/// One recovered syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    pub message: String,
    /// Start of the first label, when the parser attached one.
    pub offset: Option<u32>,
}

pub struct ParsedProgram<'a> {
    pub program: Program<'a>,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub source_text: &'a str,
}

impl ParsedProgram<'_> {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parse `source` into a tree owned by `allocator`.
///
/// `path` only shows up in the error when parsing fails outright.
pub fn parse<'a>(
    allocator: &'a Allocator,
    path: &str,
    source: &'a str,
    options: &ParseOptions,
) -> Result<ParsedProgram<'a>> {
    let ret = Parser::new(allocator, source, options.source_type).parse();

    let mut diagnostics = Vec::with_capacity(ret.errors.len());
    for error in &ret.errors {
        let offset = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .and_then(|label| u32::try_from(label.offset()).ok());
        diagnostics.push(ParseDiagnostic {
            message: error.to_string(),
            offset,
        });
    }

    let fatal = ret.panicked || (!diagnostics.is_empty() && !options.allow_errors);
    if fatal {
        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        return Err(GenError::ParseFailed {
            path: path.to_owned(),
            message: messages.join(", "),
        });
    }

    Ok(ParsedProgram {
        program: ret.program,
        diagnostics,
        source_text: source,
    })
}

/// Byte offset to 1-based line and column.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first byte of every line.
    starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let newlines = source
            .bytes()
            .enumerate()
            .filter(|&(_, byte)| byte == b'\n')
            .map(|(at, _)| at as u32 + 1);
        Self {
            starts: std::iter::once(0).chain(newlines).collect(),
        }
    }

    /// Columns count characters, not bytes.
    pub fn line_column(&self, offset: u32, source: &str) -> (u32, u32) {
        // number of line starts at or before `offset`
        let line = self.starts.partition_point(|&start| start <= offset).max(1);
        let start = self.starts[line - 1] as usize;
        let column = source
            .get(start..offset as usize)
            .map_or(0, |text| text.chars().count());
        (line as u32, column as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovered_errors_are_reported_not_thrown() {
        let arena = Allocator::default();
        let source = "const a = 1;\nconst = 2;\nconst b = 3;";
        let parsed = parse(&arena, "broken.ts", source, &ParseOptions::typescript().recover());

        // a partial tree with diagnostics, or a hard failure; never a panic
        match parsed {
            Ok(parsed) => assert!(parsed.has_errors()),
            Err(err) => assert!(matches!(err, GenError::ParseFailed { .. })),
        }
    }

    #[test]
    fn strict_mode_rejects_errors() {
        let arena = Allocator::default();
        let Err(err) = parse(&arena, "bad.ts", "class {", &ParseOptions::typescript()) else {
            panic!("`class {{` parsed");
        };
        assert!(err.to_string().contains("bad.ts"));
    }

    #[test]
    fn decorators_parse_in_typescript() {
        let arena = Allocator::default();
        let source = "@Service()\nexport class A { constructor(private b: B) {} }";
        let parsed = parse(&arena, "svc.ts", source, &ParseOptions::typescript()).unwrap();
        assert!(!parsed.has_errors());
        assert_eq!(parsed.program.body.len(), 1);
    }

    #[test]
    fn extensions_pick_the_dialect() {
        assert!(ParseOptions::from_path("a.ts").source_type.is_typescript());
        assert!(!ParseOptions::from_path("a.js").source_type.is_typescript());
    }

    #[test]
    fn line_columns_are_one_based() {
        let source = "a\nbc\n  d";
        let index = LineIndex::new(source);
        assert_eq!(index.line_column(0, source), (1, 1));
        assert_eq!(index.line_column(3, source), (2, 2));
        assert_eq!(index.line_column(7, source), (3, 3));
        assert_eq!(index.line_column(2, source), (2, 1));
    }

    #[test]
    fn columns_count_characters() {
        let source = "é = 1";
        let index = LineIndex::new(source);
        assert_eq!(index.line_column(3, source), (1, 3));
    }
}
