//! Constructor dependency analysis for injectable classes.
//!
//! An injectable's dependencies are its constructor parameter properties
//! (`constructor(private db: Database)`), in order. Each parameter's type must
//! name an imported class; the import is resolved to the defining module and
//! the class becomes a symbol in the graph.

use kiln_graph::{SymbolId, SymbolKind};
use oxc_ast::ast::{
    Class, ClassElement, FormalParameter, MethodDefinition, MethodDefinitionKind, TSType,
    TSTypeName,
};
use oxc_span::{GetSpan, Span};

use crate::context::FileContext;
use crate::error::{ErrorKind, Result};
use crate::scope::Imported;

fn constructor<'n, 'a>(class: &'n Class<'a>) -> Option<&'n MethodDefinition<'a>> {
    class.body.body.iter().find_map(|element| match element {
        ClassElement::MethodDefinition(method)
            if method.kind == MethodDefinitionKind::Constructor =>
        {
            Some(&**method)
        }
        _ => None,
    })
}

/// Dependency symbols of `class`, in constructor argument order. A class
/// without a constructor has none.
pub fn analyze_class(class: &Class<'_>, cx: &FileContext<'_>) -> Result<Vec<SymbolId>> {
    let Some(ctor) = constructor(class) else {
        return Ok(Vec::new());
    };
    let params = &ctor.value.params;

    if let Some(rest) = &params.rest {
        return Err(cx.error(
            ErrorKind::ParameterNotInjectable,
            rest.span,
            "rest parameters cannot be injected",
        ));
    }

    params
        .items
        .iter()
        .map(|param| dependency(param, cx))
        .collect()
}

fn dependency(param: &FormalParameter<'_>, cx: &FileContext<'_>) -> Result<SymbolId> {
    if param.accessibility.is_none() && !param.readonly {
        return Err(cx
            .error(
                ErrorKind::ParameterNotInjectable,
                param.span,
                "injected constructor parameters must be parameter properties",
            )
            .with_help("declare it as `private name: Type`, `public`, `protected` or `readonly`"));
    }

    let Some(annotation) = &param.pattern.type_annotation else {
        return Err(cx.error(
            ErrorKind::TypeAnnotationExpected,
            param.span,
            "injected parameter needs a type annotation naming the class to inject",
        ));
    };

    let TSType::TSTypeReference(reference) = &annotation.type_annotation else {
        return Err(cx.error(
            ErrorKind::TypeReferenceExpected,
            annotation.type_annotation.span(),
            "injected parameter type must be a class reference",
        ));
    };

    type_symbol(&reference.type_name, reference.span, cx)
}

/// Resolve `Foo` or `ns.Foo` through the file's imports.
fn type_symbol(name: &TSTypeName<'_>, span: Span, cx: &FileContext<'_>) -> Result<SymbolId> {
    let (local, member) = match name {
        TSTypeName::IdentifierReference(ident) => (ident.name.as_str(), None),
        TSTypeName::QualifiedName(qualified) => match &qualified.left {
            TSTypeName::IdentifierReference(ns) => {
                (ns.name.as_str(), Some(qualified.right.name.as_str()))
            }
            _ => {
                return Err(cx.error(
                    ErrorKind::TypeReferenceExpected,
                    span,
                    "only one level of namespace access is supported for injected types",
                ));
            }
        },
        _ => {
            return Err(cx.error(
                ErrorKind::TypeReferenceExpected,
                span,
                "injected parameter type must be a class reference",
            ));
        }
    };

    let Some(binding) = cx.scope.import(local) else {
        return Err(cx
            .error(
                ErrorKind::ImportExpected,
                span,
                format!("`{local}` is not imported; injected types must be imported classes"),
            )
            .with_help("move the class to its own module and import it"));
    };

    let export_name = match (&binding.imported, member) {
        (Imported::Namespace, Some(member)) => member,
        (Imported::Namespace, None) => {
            return Err(cx.error(
                ErrorKind::TypeReferenceExpected,
                span,
                format!("`{local}` is a namespace import; name a class inside it"),
            ));
        }
        (imported, None) => imported.export_name().unwrap_or("default"),
        (_, Some(_)) => {
            return Err(cx.error(
                ErrorKind::TypeReferenceExpected,
                span,
                format!("`{local}` is not a namespace import"),
            ));
        }
    };

    let resolved = cx
        .env
        .resolver
        .resolve(&binding.specifier, cx.path)
        .map_err(|err| cx.locate(err.into(), span))?;

    Ok(cx
        .env
        .graph
        .resolve_symbol(&resolved.module_ref(), export_name, SymbolKind::Class, None))
}
