//! Decorator recognition.
//!
//! The [`DecoratorTable`] is a read-only tree of the decorators the compiler
//! understands, keyed by the dotted path written in source (`Injectable`,
//! `Http.get`, `Api.post`). Resolving a decorator expression walks its
//! identifier/member chain against the table; the outermost call, if any,
//! carries the arguments. Roots the table does not know are left alone.

mod events;
mod handlers;

pub use events::{EventBinding, parse_event_name};
pub use handlers::{
    DecoratorObserver, handle_event, handle_injectable, handle_route, handle_serializable,
};

use std::fmt;

use indexmap::IndexMap;
use kiln_graph::HttpMethod;
use oxc_ast::ast::{Argument, Expression};

use crate::error::ErrorKind;

/// Kind of declaration a decorator is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Class,
    Method,
    Property,
    Parameter,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Method => "method",
            Self::Property => "property",
            Self::Parameter => "parameter",
        })
    }
}

/// What a recognized decorator does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorHandler {
    /// Register the class for dependency injection.
    Injectable,
    /// Bind the method to an endpoint.
    Route { method: HttpMethod, ipc: bool },
    /// Bind the method to a gateway event named after it.
    Event,
    /// Mark the class as serializable.
    Serializable,
}

#[derive(Debug, Clone)]
pub enum DecoratorDef {
    Leaf {
        target: TargetKind,
        handler: DecoratorHandler,
    },
    Namespace(IndexMap<String, DecoratorDef>),
}

/// A decorator matched against the table.
#[derive(Debug)]
pub struct ResolvedDecorator<'n, 'a> {
    /// Dotted path as written, e.g. `Http.get`.
    pub path: String,
    pub target: TargetKind,
    pub handler: DecoratorHandler,
    /// Arguments of the outermost call; `None` when the decorator is not called.
    pub arguments: Option<&'n [Argument<'a>]>,
}

#[derive(Debug)]
pub enum Resolution<'n, 'a> {
    /// The root identifier is not one of ours.
    Unknown,
    Known(ResolvedDecorator<'n, 'a>),
}

/// A decorator whose root is known but whose shape is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ShapeError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecoratorTable {
    roots: IndexMap<String, DecoratorDef>,
}

impl DecoratorTable {
    /// An empty table; every decorator resolves to [`Resolution::Unknown`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The decorators of the framework runtime.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for name in ["Injectable", "Service", "Manager"] {
            table.define(name, leaf(TargetKind::Class, DecoratorHandler::Injectable));
        }
        table.define("Http", routes(false));
        table.define("Api", routes(true));
        table.define("Event", leaf(TargetKind::Method, DecoratorHandler::Event));
        table.define(
            "Serializable",
            leaf(TargetKind::Class, DecoratorHandler::Serializable),
        );
        table
    }

    pub fn define(&mut self, name: impl Into<String>, def: DecoratorDef) {
        self.roots.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&DecoratorDef> {
        self.roots.get(name)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Match a decorator expression (the part after `@`).
    pub fn resolve<'n, 'a>(
        &self,
        expression: &'n Expression<'a>,
    ) -> Result<Resolution<'n, 'a>, ShapeError> {
        let mut segments: Vec<&'n str> = Vec::new();
        let mut call = None;
        let mut nested_call = false;
        let mut computed = false;
        let mut current = expression;

        let root_is_identifier = loop {
            match current {
                Expression::CallExpression(it) => {
                    if call.is_some() || !segments.is_empty() {
                        nested_call = true;
                    } else {
                        call = Some(it);
                    }
                    current = &it.callee;
                }
                Expression::StaticMemberExpression(it) => {
                    segments.push(it.property.name.as_str());
                    current = &it.object;
                }
                Expression::ComputedMemberExpression(it) => {
                    computed = true;
                    current = &it.object;
                }
                Expression::ParenthesizedExpression(it) => current = &it.expression,
                Expression::Identifier(it) => {
                    segments.push(it.name.as_str());
                    break true;
                }
                _ => break false,
            }
        };
        segments.reverse();

        let Some(root) = segments.first().copied().filter(|_| root_is_identifier) else {
            return Ok(Resolution::Unknown);
        };
        let Some(mut def) = self.roots.get(root) else {
            return Ok(Resolution::Unknown);
        };

        if computed {
            return Err(ShapeError::new(
                ErrorKind::ComputedDecorator,
                format!("`@{root}` must be accessed with static member names, not computed ones"),
            ));
        }
        if nested_call {
            return Err(ShapeError::new(
                ErrorKind::DecoratorShape,
                format!("`@{root}` decorators may only be called once, as the outermost expression"),
            ));
        }

        let mut path = root.to_string();
        for segment in &segments[1..] {
            let next = match def {
                DecoratorDef::Namespace(members) => members.get(*segment),
                DecoratorDef::Leaf { .. } => None,
            };
            let Some(next) = next else {
                return Err(ShapeError::new(
                    ErrorKind::UnknownDecoratorMember,
                    format!("`@{path}` has no member `{segment}`"),
                ));
            };
            path.push('.');
            path.push_str(segment);
            def = next;
        }

        match def {
            DecoratorDef::Namespace(members) => {
                let example = members.keys().next().map(String::as_str).unwrap_or("member");
                Err(ShapeError::new(
                    ErrorKind::IncompleteDecorator,
                    format!("`@{path}` is a namespace; use a member such as `@{path}.{example}`"),
                ))
            }
            DecoratorDef::Leaf { target, handler } => Ok(Resolution::Known(ResolvedDecorator {
                path,
                target: *target,
                handler: *handler,
                arguments: call.map(|it| &it.arguments[..]),
            })),
        }
    }
}

fn leaf(target: TargetKind, handler: DecoratorHandler) -> DecoratorDef {
    DecoratorDef::Leaf { target, handler }
}

fn routes(ipc: bool) -> DecoratorDef {
    DecoratorDef::Namespace(
        HttpMethod::ALL
            .into_iter()
            .map(|method| {
                (
                    method.as_str().to_string(),
                    leaf(TargetKind::Method, DecoratorHandler::Route { method, ipc }),
                )
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_gen::{Allocator, ParseOptions, parse};
    use oxc_ast::ast::{ClassElement, Statement};

    /// Resolve the first decorator of `class A { <member> }`.
    fn resolve_method_decorator(member: &str) -> Result<Option<(String, DecoratorHandler, usize)>, ShapeError> {
        let source = format!("class A {{ {member} }}");
        let allocator = Allocator::default();
        let parsed = parse(&allocator, "a.ts", &source, &ParseOptions::typescript()).unwrap();
        let Statement::ClassDeclaration(class) = &parsed.program.body[0] else {
            panic!("expected a class");
        };
        let ClassElement::MethodDefinition(method) = &class.body.body[0] else {
            panic!("expected a method");
        };
        let table = DecoratorTable::standard();
        match table.resolve(&method.decorators[0].expression)? {
            Resolution::Unknown => Ok(None),
            Resolution::Known(resolved) => Ok(Some((
                resolved.path,
                resolved.handler,
                resolved.arguments.map_or(0, <[_]>::len),
            ))),
        }
    }

    #[test]
    fn member_chains() {
        let (path, handler, args) = resolve_method_decorator("@Http.get('/ping') ping() {}")
            .unwrap()
            .unwrap();
        assert_eq!(path, "Http.get");
        assert_eq!(
            handler,
            DecoratorHandler::Route {
                method: HttpMethod::Get,
                ipc: false
            }
        );
        assert_eq!(args, 1);

        let (path, handler, _) = resolve_method_decorator("@Api.delete('/x') x() {}")
            .unwrap()
            .unwrap();
        assert_eq!(path, "Api.delete");
        assert_eq!(
            handler,
            DecoratorHandler::Route {
                method: HttpMethod::Delete,
                ipc: true
            }
        );

        let (path, handler, args) = resolve_method_decorator("@Event OnReady() {}")
            .unwrap()
            .unwrap();
        assert_eq!((path.as_str(), handler, args), ("Event", DecoratorHandler::Event, 0));
    }

    #[test]
    fn unknown_roots_pass_through() {
        assert_eq!(resolve_method_decorator("@log x() {}").unwrap(), None);
        assert_eq!(
            resolve_method_decorator("@vendor.trace('x')() x() {}").unwrap(),
            None
        );
    }

    #[test]
    fn malformed_shapes() {
        let kind = |member: &str| resolve_method_decorator(member).unwrap_err().kind;

        // a bare `@Http['get']` would end the decorator at `[`; only the
        // parenthesized form reaches the resolver
        assert_eq!(kind("@(Http['get'])('/x') x() {}"), ErrorKind::ComputedDecorator);
        assert_eq!(kind("@(Http['get']('/x')) x() {}"), ErrorKind::ComputedDecorator);
        assert_eq!(kind("@(Http.get('/x')('/y')) x() {}"), ErrorKind::DecoratorShape);
        assert_eq!(kind("@(Http('/x').get) x() {}"), ErrorKind::DecoratorShape);
        assert_eq!(kind("@Http x() {}"), ErrorKind::IncompleteDecorator);
        assert_eq!(kind("@Http.fetch('/x') x() {}"), ErrorKind::UnknownDecoratorMember);
        assert_eq!(kind("@Event.once x() {}"), ErrorKind::UnknownDecoratorMember);
    }

    #[test]
    fn standard_table_roots() {
        let table = DecoratorTable::standard();
        assert_eq!(table.len(), 7);
        for root in ["Injectable", "Service", "Manager", "Serializable"] {
            assert!(matches!(
                table.get(root),
                Some(DecoratorDef::Leaf {
                    target: TargetKind::Class,
                    ..
                })
            ));
        }
        let Some(DecoratorDef::Namespace(verbs)) = table.get("Http") else {
            panic!("Http is a namespace");
        };
        assert_eq!(verbs.len(), HttpMethod::ALL.len());
    }
}
