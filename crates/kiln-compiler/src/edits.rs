//! Deferred tree edits.
//!
//! Observers see the tree through shared references, so every change they
//! want is queued here and applied in one pass after the walk. Statement edits
//! are keyed by the span of a top-level statement; decorators by their own
//! span.

use indexmap::IndexSet;
use kiln_gen::{Allocator, parse_snippet};
use oxc_allocator::Vec as ArenaVec;
use oxc_ast::AstBuilder;
use oxc_ast::ast::{
    Class, Declaration, Decorator, ExportDefaultDeclarationKind, Expression, FormalParameter,
    FunctionType, MethodDefinition, Program, PropertyDefinition, Statement,
};
use oxc_ast_visit::{VisitMut, walk_mut};
use oxc_span::{GetSpan, SPAN, Span};
use rustc_hash::{FxHashMap, FxHashSet};

/// What to do with one top-level statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementEdit {
    /// Swap the statement for the statements parsed from this code.
    Replace(String),
    Remove,
    /// `export default <expr>` becomes `return <expr>`.
    ReturnDefault,
    /// `export const x = ...` becomes `const x = ...`.
    UnwrapExport,
}

#[derive(Debug, Default)]
pub struct EditQueue {
    removed_decorators: FxHashSet<Span>,
    statements: FxHashMap<Span, StatementEdit>,
    after: FxHashMap<Span, Vec<String>>,
    exports: IndexSet<String>,
    appended: Vec<String>,
}

impl EditQueue {
    pub fn is_decorator_removed(&self, span: Span) -> bool {
        self.removed_decorators.contains(&span)
    }

    /// Returns `false` when the decorator was already queued for removal.
    pub fn remove_decorator(&mut self, span: Span) -> bool {
        self.removed_decorators.insert(span)
    }

    pub fn edit_statement(&mut self, statement: Span, edit: StatementEdit) {
        self.statements.insert(statement, edit);
    }

    pub fn statement_edit(&self, statement: Span) -> Option<&StatementEdit> {
        self.statements.get(&statement)
    }

    /// Insert `code` right after the top-level statement at `statement`.
    pub fn insert_after(&mut self, statement: Span, code: impl Into<String>) {
        let code = code.into();
        let pending = self.after.entry(statement).or_default();
        if !pending.contains(&code) {
            pending.push(code);
        }
    }

    /// Make a top-level binding importable by name.
    pub fn export_local(&mut self, local: &str) {
        self.exports.insert(local.to_string());
    }

    pub fn append(&mut self, code: impl Into<String>) {
        self.appended.push(code.into());
    }

    pub fn removed_decorator_count(&self) -> usize {
        self.removed_decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.removed_decorators.is_empty()
            && self.statements.is_empty()
            && self.after.is_empty()
            && self.exports.is_empty()
            && self.appended.is_empty()
    }

    /// Apply every queued edit to `program`.
    pub fn apply<'a>(&self, program: &mut Program<'a>, allocator: &'a Allocator) -> kiln_gen::Result<()> {
        if !self.removed_decorators.is_empty() {
            let mut stripper = DecoratorStripper {
                spans: &self.removed_decorators,
            };
            stripper.visit_program(program);
        }

        if self.statements.is_empty()
            && self.after.is_empty()
            && self.exports.is_empty()
            && self.appended.is_empty()
        {
            return Ok(());
        }

        let ast = AstBuilder::new(allocator);
        let source_type = program.source_type;
        let original = std::mem::replace(&mut program.body, ast.vec());
        let mut body: ArenaVec<'a, Statement<'a>> = ast.vec_with_capacity(original.len());

        for stmt in original {
            let span = stmt.span();
            match self.statements.get(&span) {
                None => body.push(stmt),
                Some(StatementEdit::Remove) => {}
                Some(StatementEdit::Replace(code)) => {
                    body.extend(parse_snippet(allocator, source_type, code)?);
                }
                Some(StatementEdit::ReturnDefault) => body.push(return_default(&ast, stmt)),
                Some(StatementEdit::UnwrapExport) => {
                    if let Some(stmt) = unwrap_export(stmt) {
                        body.push(stmt);
                    }
                }
            }
            if let Some(snippets) = self.after.get(&span) {
                for code in snippets {
                    body.extend(parse_snippet(allocator, source_type, code)?);
                }
            }
        }

        if !self.exports.is_empty() {
            let names: Vec<&str> = self.exports.iter().map(String::as_str).collect();
            let code = format!("export {{ {} }};", names.join(", "));
            body.extend(parse_snippet(allocator, source_type, &code)?);
        }
        for code in &self.appended {
            body.extend(parse_snippet(allocator, source_type, code)?);
        }

        program.body = body;
        Ok(())
    }
}

fn return_default<'a>(ast: &AstBuilder<'a>, stmt: Statement<'a>) -> Statement<'a> {
    let Statement::ExportDefaultDeclaration(decl) = stmt else {
        return stmt;
    };
    let expression = match decl.unbox().declaration {
        ExportDefaultDeclarationKind::FunctionDeclaration(mut function) => {
            function.r#type = FunctionType::FunctionExpression;
            Expression::FunctionExpression(function)
        }
        ExportDefaultDeclarationKind::ClassDeclaration(_)
        | ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => {
            return ast.statement_empty(SPAN);
        }
        kind => kind.into_expression(),
    };
    ast.statement_return(SPAN, Some(expression))
}

fn unwrap_export(stmt: Statement<'_>) -> Option<Statement<'_>> {
    let Statement::ExportNamedDeclaration(decl) = stmt else {
        return Some(stmt);
    };
    match decl.unbox().declaration? {
        Declaration::VariableDeclaration(d) => Some(Statement::VariableDeclaration(d)),
        Declaration::FunctionDeclaration(d) => Some(Statement::FunctionDeclaration(d)),
        Declaration::ClassDeclaration(d) => Some(Statement::ClassDeclaration(d)),
        Declaration::TSTypeAliasDeclaration(d) => Some(Statement::TSTypeAliasDeclaration(d)),
        Declaration::TSInterfaceDeclaration(d) => Some(Statement::TSInterfaceDeclaration(d)),
        Declaration::TSEnumDeclaration(d) => Some(Statement::TSEnumDeclaration(d)),
        Declaration::TSModuleDeclaration(d) => Some(Statement::TSModuleDeclaration(d)),
        _ => None,
    }
}

struct DecoratorStripper<'s> {
    spans: &'s FxHashSet<Span>,
}

impl DecoratorStripper<'_> {
    fn strip(&self, decorators: &mut ArenaVec<'_, Decorator<'_>>) {
        let spans = self.spans;
        decorators.retain(|decorator| !spans.contains(&decorator.span));
    }
}

impl<'a> VisitMut<'a> for DecoratorStripper<'_> {
    fn visit_class(&mut self, it: &mut Class<'a>) {
        self.strip(&mut it.decorators);
        walk_mut::walk_class(self, it);
    }

    fn visit_method_definition(&mut self, it: &mut MethodDefinition<'a>) {
        self.strip(&mut it.decorators);
        walk_mut::walk_method_definition(self, it);
    }

    fn visit_property_definition(&mut self, it: &mut PropertyDefinition<'a>) {
        self.strip(&mut it.decorators);
        walk_mut::walk_property_definition(self, it);
    }

    fn visit_formal_parameter(&mut self, it: &mut FormalParameter<'a>) {
        self.strip(&mut it.decorators);
        walk_mut::walk_formal_parameter(self, it);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_gen::{ParseOptions, parse};
    use oxc_codegen::Codegen;

    fn apply(source: &str, build: impl FnOnce(&Program<'_>, &mut EditQueue)) -> String {
        let allocator = Allocator::default();
        let parsed = parse(&allocator, "test.ts", source, &ParseOptions::typescript()).unwrap();
        let mut program = parsed.program;
        let mut edits = EditQueue::default();
        build(&program, &mut edits);
        edits.apply(&mut program, &allocator).unwrap();
        Codegen::new().build(&program).code
    }

    fn first_class_decorators(program: &Program<'_>) -> Vec<Span> {
        program
            .body
            .iter()
            .find_map(|stmt| match stmt {
                Statement::ClassDeclaration(class) => {
                    Some(class.decorators.iter().map(|d| d.span).collect())
                }
                _ => None,
            })
            .unwrap_or_default()
    }

    #[test]
    fn removes_only_queued_decorators() {
        let code = apply("@Injectable @Other class A {}", |program, edits| {
            let spans = first_class_decorators(program);
            assert!(edits.remove_decorator(spans[0]));
            assert!(!edits.remove_decorator(spans[0]));
        });
        assert!(!code.contains("Injectable"));
        assert!(code.contains("@Other"));
    }

    #[test]
    fn statement_edits() {
        let code = apply(
            "import type { A } from 'a';\nexport const x = 1;\nexport default function run() { return x; }",
            |program, edits| {
                edits.edit_statement(program.body[0].span(), StatementEdit::Remove);
                edits.edit_statement(program.body[1].span(), StatementEdit::UnwrapExport);
                edits.edit_statement(program.body[2].span(), StatementEdit::ReturnDefault);
            },
        );
        assert!(!code.contains("import"));
        assert!(!code.contains("export"));
        assert!(code.contains("const x = 1;"));
        assert!(code.contains("return function run()"));
    }

    #[test]
    fn insertions_and_exports() {
        let code = apply("class A {}\nconst b = 1;", |program, edits| {
            edits.insert_after(program.body[0].span(), "A.serializable = true;");
            edits.insert_after(program.body[0].span(), "A.serializable = true;");
            edits.export_local("A");
            edits.export_local("A");
        });
        assert_eq!(code.matches("A.serializable = true;").count(), 1);
        let class_at = code.find("class A").unwrap();
        let flag_at = code.find("A.serializable").unwrap();
        let b_at = code.find("const b").unwrap();
        assert!(class_at < flag_at && flag_at < b_at);
        assert_eq!(code.matches("export { A };").count(), 1);
    }

    #[test]
    fn replacement_code_is_parsed() {
        let code = apply("import { a } from './a.js';\nconsole.log(a);", |program, edits| {
            edits.edit_statement(
                program.body[0].span(),
                StatementEdit::Replace(String::from(
                    "const { a } = await import(\"./a.js\");",
                )),
            );
        });
        assert!(code.contains("await import(\"./a.js\")"));
    }
}
