//! Observer bus: one walk over a file, many interested handlers.
//!
//! The walk emits a [`Node`] for every construct some observer may care
//! about. Each observer declares the node kinds it wants and whether it runs
//! for a given kind of file; the bus calls the matching observers in
//! subscription order. Observers only read the tree and record facts and
//! edits in the [`FileContext`].

use std::fmt;
use std::sync::Arc;

use kiln_graph::FileKind;
use oxc_ast::ast::{
    Class, ClassElement, ExportAllDeclaration, ExportDefaultDeclaration, ExportNamedDeclaration,
    FormalParameter, ImportDeclaration, MethodDefinition, Program, PropertyDefinition,
    TSEnumDeclaration,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;
use rustc_hash::FxHashMap;

use crate::context::FileContext;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Import,
    ExportDefault,
    ExportNamed,
    ExportAll,
    Class,
    Enum,
    Method,
    Property,
    Parameter,
}

/// A construct reached by the walk.
#[derive(Clone, Copy)]
pub enum Node<'n, 'a> {
    Import(&'n ImportDeclaration<'a>),
    ExportDefault(&'n ExportDefaultDeclaration<'a>),
    ExportNamed(&'n ExportNamedDeclaration<'a>),
    ExportAll(&'n ExportAllDeclaration<'a>),
    Class(&'n Class<'a>),
    Enum(&'n TSEnumDeclaration<'a>),
    Method {
        class: &'n Class<'a>,
        method: &'n MethodDefinition<'a>,
    },
    Property {
        class: &'n Class<'a>,
        property: &'n PropertyDefinition<'a>,
    },
    Parameter(&'n FormalParameter<'a>),
}

impl Node<'_, '_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Import(_) => NodeKind::Import,
            Self::ExportDefault(_) => NodeKind::ExportDefault,
            Self::ExportNamed(_) => NodeKind::ExportNamed,
            Self::ExportAll(_) => NodeKind::ExportAll,
            Self::Class(_) => NodeKind::Class,
            Self::Enum(_) => NodeKind::Enum,
            Self::Method { .. } => NodeKind::Method,
            Self::Property { .. } => NodeKind::Property,
            Self::Parameter(_) => NodeKind::Parameter,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Import(it) => it.span,
            Self::ExportDefault(it) => it.span,
            Self::ExportNamed(it) => it.span,
            Self::ExportAll(it) => it.span,
            Self::Class(it) => it.span,
            Self::Enum(it) => it.span,
            Self::Method { method, .. } => method.span,
            Self::Property { property, .. } => property.span,
            Self::Parameter(it) => it.span,
        }
    }
}

/// A handler subscribed to the bus.
pub trait Observer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Node kinds this observer wants to see.
    fn interests(&self) -> &'static [NodeKind];

    fn applies_to(&self, _kind: FileKind) -> bool {
        true
    }

    /// Handle one node. An error is recorded against the file and the walk
    /// continues, so one pass reports every problem in the file.
    fn on_node(&self, node: &Node<'_, '_>, cx: &mut FileContext<'_>) -> Result<()>;

    /// Called once after the walk.
    fn on_finish(&self, _cx: &mut FileContext<'_>) -> Result<()> {
        Ok(())
    }
}

/// Handle returned by [`ObserverBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(usize);

#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<Arc<dyn Observer>>,
    by_kind: FxHashMap<NodeKind, Vec<usize>>,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn Observer>) -> Subscription {
        let index = self.observers.len();
        for kind in observer.interests() {
            self.by_kind.entry(*kind).or_default().push(index);
        }
        tracing::trace!(observer = observer.name(), "subscribed");
        self.observers.push(observer);
        Subscription(index)
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Deliver `node` to every interested observer, in subscription order.
    pub fn emit(&self, node: &Node<'_, '_>, cx: &mut FileContext<'_>) {
        let Some(indices) = self.by_kind.get(&node.kind()) else {
            return;
        };
        for &index in indices {
            let observer = &self.observers[index];
            if !observer.applies_to(cx.kind) {
                continue;
            }
            if let Err(err) = observer.on_node(node, cx) {
                cx.report(err);
            }
        }
    }

    /// Walk `program`, then let every applicable observer finish.
    pub fn walk(&self, program: &Program<'_>, cx: &mut FileContext<'_>) {
        let mut dispatcher = Dispatcher { bus: self, cx };
        dispatcher.visit_program(program);

        for observer in &self.observers {
            if !observer.applies_to(cx.kind) {
                continue;
            }
            if let Err(err) = observer.on_finish(cx) {
                cx.report(err);
            }
        }
    }
}

impl fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.observers.iter().map(|o| o.name()))
            .finish()
    }
}

struct Dispatcher<'b, 'c, 'x> {
    bus: &'b ObserverBus,
    cx: &'x mut FileContext<'c>,
}

impl Dispatcher<'_, '_, '_> {
    fn emit(&mut self, node: Node<'_, '_>) {
        self.bus.emit(&node, self.cx);
    }
}

impl<'a> Visit<'a> for Dispatcher<'_, '_, '_> {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.emit(Node::Import(it));
    }

    fn visit_export_default_declaration(&mut self, it: &ExportDefaultDeclaration<'a>) {
        self.emit(Node::ExportDefault(it));
        walk::walk_export_default_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        self.emit(Node::ExportNamed(it));
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.emit(Node::ExportAll(it));
    }

    fn visit_ts_enum_declaration(&mut self, it: &TSEnumDeclaration<'a>) {
        self.emit(Node::Enum(it));
        walk::walk_ts_enum_declaration(self, it);
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        self.emit(Node::Class(it));
        for element in &it.body.body {
            match element {
                ClassElement::MethodDefinition(method) => {
                    self.emit(Node::Method { class: it, method });
                }
                ClassElement::PropertyDefinition(property) => {
                    self.emit(Node::Property { class: it, property });
                }
                _ => {}
            }
        }
        walk::walk_class(self, it);
    }

    fn visit_formal_parameter(&mut self, it: &FormalParameter<'a>) {
        self.emit(Node::Parameter(it));
        walk::walk_formal_parameter(self, it);
    }
}
