//! Command file policy and transform.
//!
//! A command file becomes the body of an async function inside the commands
//! bundle, so it must not declare anything the bundle cannot hold: classes and
//! enums are rejected, as are re-exports. Static imports turn into
//! `await import(...)` with local specifiers rewritten to the emitted files,
//! `export const` loses its `export`, and `export default` becomes the
//! function's return value.

use kiln_gen::string_literal;
use oxc_ast::ast::{ExportDefaultDeclarationKind, ImportDeclaration, ImportDeclarationSpecifier};
use oxc_span::Span;

use crate::bus::{Node, NodeKind, Observer};
use crate::context::FileContext;
use crate::edits::StatementEdit;
use crate::error::{ErrorKind, Result};
use crate::resolver::Resolved;

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandPolicy;

impl Observer for CommandPolicy {
    fn name(&self) -> &'static str {
        "command-policy"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[
            NodeKind::Import,
            NodeKind::ExportDefault,
            NodeKind::ExportNamed,
            NodeKind::ExportAll,
            NodeKind::Class,
            NodeKind::Enum,
        ]
    }

    fn applies_to(&self, kind: kiln_graph::FileKind) -> bool {
        kind == kiln_graph::FileKind::Command
    }

    fn on_node(&self, node: &Node<'_, '_>, cx: &mut FileContext<'_>) -> Result<()> {
        match node {
            Node::Class(class) if class.is_declaration() => Err(cx.error(
                ErrorKind::CommandClass,
                class.span,
                "command files cannot declare classes",
            )
            .with_help("move the class to a service or manager module and import it")),
            Node::Enum(decl) => Err(cx.error(
                ErrorKind::CommandEnum,
                decl.span,
                "command files cannot declare enums",
            )),
            Node::ExportAll(decl) => Err(cx.error(
                ErrorKind::CommandExportAll,
                decl.span,
                "command files cannot use `export *`",
            )),
            Node::ExportNamed(decl) => {
                if decl.export_kind.is_type() {
                    cx.edits.edit_statement(decl.span, StatementEdit::Remove);
                    return Ok(());
                }
                if decl.declaration.is_some() {
                    cx.edits.edit_statement(decl.span, StatementEdit::UnwrapExport);
                    return Ok(());
                }
                let exports_values = decl
                    .specifiers
                    .iter()
                    .any(|spec| !spec.export_kind.is_type());
                if decl.source.is_some() || exports_values {
                    return Err(cx
                        .error(
                            ErrorKind::CommandExportSpecifiers,
                            decl.span,
                            "command files cannot use export lists",
                        )
                        .with_help("export the command with `export default`"));
                }
                cx.edits.edit_statement(decl.span, StatementEdit::Remove);
                Ok(())
            }
            Node::ExportDefault(decl) => {
                let edit = match decl.declaration {
                    ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => StatementEdit::Remove,
                    _ => StatementEdit::ReturnDefault,
                };
                cx.edits.edit_statement(decl.span, edit);
                Ok(())
            }
            Node::Import(decl) => {
                let edit = match dynamic_import(decl, cx)? {
                    Some(code) => StatementEdit::Replace(code),
                    None => StatementEdit::Remove,
                };
                cx.edits.edit_statement(decl.span, edit);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn on_finish(&self, cx: &mut FileContext<'_>) -> Result<()> {
        if cx.scope.has_default_export() {
            return Ok(());
        }
        Err(cx
            .error(
                ErrorKind::CommandDefaultExpected,
                Span::new(0, 0),
                "command files must have a default export",
            )
            .with_help("end the file with `export default { ... }`"))
    }
}

/// The `await import(...)` replacing a static import, or `None` when the
/// import only brings in types.
fn dynamic_import(decl: &ImportDeclaration<'_>, cx: &FileContext<'_>) -> Result<Option<String>> {
    if decl.import_kind.is_type() {
        return Ok(None);
    }

    let specifier = bundle_specifier(decl.source.value.as_str(), decl.source.span, cx)?;
    let module = format!("await import({})", string_literal(&specifier));

    let Some(specifiers) = &decl.specifiers else {
        return Ok(Some(format!("{module};")));
    };

    let mut namespace = None;
    let mut bindings = Vec::new();
    for spec in specifiers {
        match spec {
            ImportDeclarationSpecifier::ImportSpecifier(s) => {
                if s.import_kind.is_type() {
                    continue;
                }
                let imported = s.imported.name();
                let imported = if kiln_gen::is_identifier(imported.as_str()) {
                    imported.to_string()
                } else {
                    string_literal(imported.as_str())
                };
                if imported == s.local.name.as_str() {
                    bindings.push(imported);
                } else {
                    bindings.push(format!("{imported}: {}", s.local.name));
                }
            }
            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                bindings.push(format!("default: {}", s.local.name));
            }
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                namespace = Some(s.local.name.to_string());
            }
        }
    }

    let code = match (namespace, bindings.is_empty()) {
        (None, true) if specifiers.is_empty() => format!("{module};"),
        (None, true) => return Ok(None),
        (None, false) => format!("const {{ {} }} = {module};", bindings.join(", ")),
        (Some(ns), true) => format!("const {ns} = {module};"),
        (Some(ns), false) => format!(
            "const {ns} = {module};\nconst {{ {} }} = {ns};",
            bindings.join(", ")
        ),
    };
    Ok(Some(code))
}

/// Local specifiers point at the emitted file, relative to the bundle;
/// packages and virtual modules are kept as written.
fn bundle_specifier(specifier: &str, span: Span, cx: &FileContext<'_>) -> Result<String> {
    let resolver = cx.env.resolver;
    if resolver.is_virtual(specifier) || !resolver.is_local(specifier) {
        return Ok(specifier.to_string());
    }
    match resolver.resolve(specifier, cx.path) {
        Ok(Resolved::File(path)) => Ok(cx.env.layout.specifier_for(&path)),
        Ok(_) => Ok(specifier.to_string()),
        Err(err) => Err(cx.locate(err.into(), span)),
    }
}
