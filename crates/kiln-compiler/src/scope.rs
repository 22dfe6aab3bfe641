//! Module-level bindings collected before the main walk.
//!
//! Handlers need facts that may appear anywhere at the top level of a file:
//! the import a type name came from, or an `export { Foo as Bar }` placed after
//! the class it renames. One pass over the top-level statements gathers them.

use oxc_ast::ast::{
    Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier, Program, Statement,
};
use oxc_span::Span;
use rustc_hash::FxHashMap;

/// What an import binds from its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    Default,
    Named(String),
    Namespace,
}

impl Imported {
    /// The export name the binding refers to; `None` for namespaces.
    pub fn export_name(&self) -> Option<&str> {
        match self {
            Self::Default => Some("default"),
            Self::Named(name) => Some(name),
            Self::Namespace => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub specifier: String,
    pub imported: Imported,
    pub type_only: bool,
}

/// A class declared at the top level of the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopLevelClass {
    /// Binding name, `None` for `export default class {}`.
    pub local: Option<String>,
    /// Name other modules import it by, if exported.
    pub export: Option<String>,
    /// Span of the top-level statement holding the class.
    pub statement: Span,
}

#[derive(Debug, Default)]
pub struct ModuleScope {
    imports: FxHashMap<String, ImportBinding>,
    exports: FxHashMap<String, String>,
    classes: FxHashMap<Span, TopLevelClass>,
    has_default_export: bool,
}

impl ModuleScope {
    pub fn collect(program: &Program<'_>) -> Self {
        let mut scope = Self::default();

        for stmt in &program.body {
            match stmt {
                Statement::ImportDeclaration(decl) => {
                    let specifier = decl.source.value.to_string();
                    let declaration_type_only = decl.import_kind.is_type();
                    for spec in decl.specifiers.iter().flatten() {
                        let (local, imported, type_only) = match spec {
                            ImportDeclarationSpecifier::ImportSpecifier(s) => (
                                s.local.name.to_string(),
                                Imported::Named(s.imported.name().to_string()),
                                s.import_kind.is_type(),
                            ),
                            ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                                (s.local.name.to_string(), Imported::Default, false)
                            }
                            ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                                (s.local.name.to_string(), Imported::Namespace, false)
                            }
                        };
                        scope.imports.insert(
                            local,
                            ImportBinding {
                                specifier: specifier.clone(),
                                imported,
                                type_only: declaration_type_only || type_only,
                            },
                        );
                    }
                }
                Statement::ExportNamedDeclaration(decl) => {
                    if let Some(Declaration::ClassDeclaration(class)) = &decl.declaration {
                        let local = class.id.as_ref().map(|id| id.name.to_string());
                        scope.classes.insert(
                            class.span,
                            TopLevelClass {
                                export: local.clone(),
                                local,
                                statement: decl.span,
                            },
                        );
                    }
                    if decl.source.is_none() {
                        for spec in &decl.specifiers {
                            let exported = spec.exported.name().to_string();
                            let type_only = decl.export_kind.is_type() || spec.export_kind.is_type();
                            if exported == "default" && !type_only {
                                scope.has_default_export = true;
                            }
                            scope
                                .exports
                                .entry(spec.local.name().to_string())
                                .or_insert(exported);
                        }
                    }
                }
                Statement::ExportDefaultDeclaration(decl) => {
                    // `export default interface` exports no value
                    scope.has_default_export |= !matches!(
                        decl.declaration,
                        ExportDefaultDeclarationKind::TSInterfaceDeclaration(_)
                    );
                    match &decl.declaration {
                        ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                            scope.classes.insert(
                                class.span,
                                TopLevelClass {
                                    local: class.id.as_ref().map(|id| id.name.to_string()),
                                    export: Some(String::from("default")),
                                    statement: decl.span,
                                },
                            );
                        }
                        ExportDefaultDeclarationKind::Identifier(ident) => {
                            scope
                                .exports
                                .entry(ident.name.to_string())
                                .or_insert_with(|| String::from("default"));
                        }
                        _ => {}
                    }
                }
                Statement::ClassDeclaration(class) => {
                    scope.classes.insert(
                        class.span,
                        TopLevelClass {
                            local: class.id.as_ref().map(|id| id.name.to_string()),
                            export: None,
                            statement: class.span,
                        },
                    );
                }
                _ => {}
            }
        }

        for class in scope.classes.values_mut() {
            if class.export.is_none() {
                class.export = class
                    .local
                    .as_ref()
                    .and_then(|local| scope.exports.get(local))
                    .cloned();
            }
        }

        scope
    }

    pub fn import(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.get(local)
    }

    pub fn imports(&self) -> impl Iterator<Item = (&str, &ImportBinding)> {
        self.imports.iter().map(|(local, binding)| (local.as_str(), binding))
    }

    pub fn top_level_class(&self, span: Span) -> Option<&TopLevelClass> {
        self.classes.get(&span)
    }

    pub fn export_name(&self, local: &str) -> Option<&str> {
        self.exports.get(local).map(String::as_str)
    }

    pub fn has_default_export(&self) -> bool {
        self.has_default_export
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_gen::{Allocator, ParseOptions, parse};

    fn scope_of(source: &str) -> ModuleScope {
        let allocator = Allocator::default();
        let parsed = parse(&allocator, "test.ts", source, &ParseOptions::typescript()).unwrap();
        ModuleScope::collect(&parsed.program)
    }

    #[test]
    fn import_bindings() {
        let scope = scope_of(
            r#"
            import Users, { Db as Database, type Cache } from "./deps";
            import * as models from "@/models";
            import type { Client } from "discord.js";
            "#,
        );

        let users = scope.import("Users").unwrap();
        assert_eq!(users.imported, Imported::Default);
        assert_eq!(users.specifier, "./deps");

        let db = scope.import("Database").unwrap();
        assert_eq!(db.imported, Imported::Named(String::from("Db")));
        assert!(!db.type_only);
        assert!(scope.import("Cache").unwrap().type_only);

        assert_eq!(scope.import("models").unwrap().imported, Imported::Namespace);
        assert!(scope.import("Client").unwrap().type_only);
        assert!(scope.import("Db").is_none());
    }

    #[test]
    fn class_export_names() {
        let source = r#"
            export class A {}
            export default class B {}
            class C {}
            class D {}
            export { C as Renamed };
        "#;
        let allocator = Allocator::default();
        let parsed = parse(&allocator, "test.ts", source, &ParseOptions::typescript()).unwrap();
        let scope = ModuleScope::collect(&parsed.program);

        let mut names: Vec<(Option<String>, Option<String>)> = scope
            .classes
            .values()
            .map(|c| (c.local.clone(), c.export.clone()))
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                (Some("A".into()), Some("A".into())),
                (Some("B".into()), Some("default".into())),
                (Some("C".into()), Some("Renamed".into())),
                (Some("D".into()), None),
            ]
        );
        assert!(scope.has_default_export());
    }

    #[test]
    fn type_only_defaults_are_not_default_exports() {
        assert!(!scope_of("export default interface Options { name: string }").has_default_export());
        assert!(!scope_of("type A = number;\nexport type { A as default };").has_default_export());
        assert!(!scope_of("type A = number;\nexport { type A as default };").has_default_export());
        assert!(scope_of("export default abstract class {}").has_default_export());
    }

    #[test]
    fn default_export_of_identifier() {
        let scope = scope_of("const ping = {}; export default ping;");
        assert!(scope.has_default_export());
        assert_eq!(scope.export_name("ping"), Some("default"));
    }
}
