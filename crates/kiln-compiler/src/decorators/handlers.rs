//! Decorator handlers: record facts in the graph and strip the decorator.
//!
//! Every handler first checks whether its decorator is already queued for
//! removal; if so the decorator was handled before and the call is a no-op.

use std::sync::Arc;

use kiln_graph::{EventEntry, HttpMethod, InjectableEntry, RouteEntry, SymbolId, SymbolKind};
use oxc_ast::ast::{Argument, Class, Decorator, MethodDefinition, PropertyKey};
use oxc_span::{GetSpan, Span};

use super::{DecoratorHandler, DecoratorTable, Resolution, TargetKind, parse_event_name};
use crate::bus::{Node, NodeKind, Observer};
use crate::context::FileContext;
use crate::dependencies::analyze_class;
use crate::error::{ErrorKind, Result};

/// Runs the handlers of every recognized decorator.
#[derive(Debug, Clone)]
pub struct DecoratorObserver {
    table: Arc<DecoratorTable>,
}

impl DecoratorObserver {
    pub fn new(table: Arc<DecoratorTable>) -> Self {
        Self { table }
    }

    fn apply(
        &self,
        node: &Node<'_, '_>,
        target: TargetKind,
        decorator: &Decorator<'_>,
        cx: &mut FileContext<'_>,
    ) -> Result<()> {
        let resolved = match self.table.resolve(&decorator.expression) {
            Ok(Resolution::Unknown) => return Ok(()),
            Ok(Resolution::Known(resolved)) => resolved,
            Err(shape) => return Err(cx.error(shape.kind, decorator.span, shape.message)),
        };

        if resolved.target != target {
            return Err(cx.error(
                ErrorKind::Placement,
                decorator.span,
                format!(
                    "`@{}` expects a {}, found a {target}",
                    resolved.path, resolved.target
                ),
            ));
        }

        match (resolved.handler, *node) {
            (DecoratorHandler::Injectable, Node::Class(class)) => {
                handle_injectable(cx, class, decorator)
            }
            (DecoratorHandler::Serializable, Node::Class(class)) => {
                handle_serializable(cx, class, decorator)
            }
            (DecoratorHandler::Route { method, ipc }, Node::Method { class, method: def }) => {
                handle_route(cx, class, def, decorator, method, ipc, resolved.arguments)
            }
            (DecoratorHandler::Event, Node::Method { class, method }) => {
                handle_event(cx, class, method, decorator)
            }
            _ => Ok(()),
        }
    }
}

impl Observer for DecoratorObserver {
    fn name(&self) -> &'static str {
        "decorators"
    }

    fn interests(&self) -> &'static [NodeKind] {
        &[
            NodeKind::Class,
            NodeKind::Method,
            NodeKind::Property,
            NodeKind::Parameter,
        ]
    }

    fn on_node(&self, node: &Node<'_, '_>, cx: &mut FileContext<'_>) -> Result<()> {
        let (target, decorators) = match node {
            Node::Class(class) => (TargetKind::Class, &class.decorators),
            Node::Method { method, .. } => (TargetKind::Method, &method.decorators),
            Node::Property { property, .. } => (TargetKind::Property, &property.decorators),
            Node::Parameter(param) => (TargetKind::Parameter, &param.decorators),
            _ => return Ok(()),
        };

        for decorator in decorators.iter() {
            if let Err(err) = self.apply(node, target, decorator, cx) {
                cx.report(err);
            }
        }
        Ok(())
    }
}

/// A decorated class as the graph sees it.
struct ClassInfo {
    id: SymbolId,
    /// Name other modules import the class by.
    name: String,
    local: String,
    statement: Span,
}

fn class_info(cx: &mut FileContext<'_>, class: &Class<'_>, at: Span) -> Result<ClassInfo> {
    let Some(top) = cx.scope.top_level_class(class.span).cloned() else {
        return Err(cx.error(
            ErrorKind::ClassNotTopLevel,
            at,
            "decorated classes must be declared at the top level of the module",
        ));
    };
    let Some(local) = top.local else {
        return Err(cx
            .error(
                ErrorKind::ClassNameExpected,
                at,
                "decorated classes must be named",
            )
            .with_help("write `export default class Name { ... }`"));
    };

    let name = match top.export {
        Some(name) => name,
        None => {
            cx.edits.export_local(&local);
            local.clone()
        }
    };
    let id = cx
        .env
        .graph
        .resolve_symbol(&cx.module, &name, SymbolKind::Class, None);

    Ok(ClassInfo {
        id,
        name,
        local,
        statement: top.statement,
    })
}

fn method_symbol(
    cx: &mut FileContext<'_>,
    class: &Class<'_>,
    method: &MethodDefinition<'_>,
    at: Span,
) -> Result<(SymbolId, String)> {
    let member = match &method.key {
        PropertyKey::PrivateIdentifier(_) => None,
        key => key.static_name(),
    };
    let Some(member) = member else {
        return Err(cx.error(
            ErrorKind::HandlerNameExpected,
            method.key.span(),
            "decorated methods need a static, public name",
        ));
    };
    let member = member.to_string();

    let owner = class_info(cx, class, at)?;
    let (name, kind) = if method.r#static {
        (format!("{}::{member}", owner.name), SymbolKind::StaticMethod)
    } else {
        (format!("{}.{member}", owner.name), SymbolKind::Method)
    };
    let id = cx
        .env
        .graph
        .resolve_symbol(&cx.module, &name, kind, Some(owner.id));
    Ok((id, member))
}

/// `@Injectable`, `@Service`, `@Manager`.
pub fn handle_injectable(
    cx: &mut FileContext<'_>,
    class: &Class<'_>,
    decorator: &Decorator<'_>,
) -> Result<()> {
    if cx.edits.is_decorator_removed(decorator.span) {
        return Ok(());
    }

    let owner = class_info(cx, class, decorator.span)?;
    let dependencies = analyze_class(class, cx)?;
    tracing::debug!(
        class = %owner.name,
        dependencies = dependencies.len(),
        "injectable"
    );
    cx.env.graph.add_injectable(InjectableEntry {
        symbol: owner.id,
        dependencies,
        location: cx.location(decorator.span),
    });
    cx.edits.remove_decorator(decorator.span);
    Ok(())
}

/// `@Serializable`: flags the class for the runtime's serializer.
pub fn handle_serializable(
    cx: &mut FileContext<'_>,
    class: &Class<'_>,
    decorator: &Decorator<'_>,
) -> Result<()> {
    if cx.edits.is_decorator_removed(decorator.span) {
        return Ok(());
    }

    let owner = class_info(cx, class, decorator.span)?;
    cx.edits.insert_after(
        owner.statement,
        format!("{}.serializable = true;", owner.local),
    );
    cx.edits.remove_decorator(decorator.span);
    Ok(())
}

/// `@Http.<verb>(path)` and `@Api.<verb>(path)`.
pub fn handle_route(
    cx: &mut FileContext<'_>,
    class: &Class<'_>,
    method: &MethodDefinition<'_>,
    decorator: &Decorator<'_>,
    verb: HttpMethod,
    ipc: bool,
    arguments: Option<&[Argument<'_>]>,
) -> Result<()> {
    if cx.edits.is_decorator_removed(decorator.span) {
        return Ok(());
    }

    let namespace = if ipc { "Api" } else { "Http" };
    let endpoint = match arguments {
        Some([Argument::StringLiteral(path)]) => path.value.to_string(),
        Some([other]) => {
            return Err(cx.error(
                ErrorKind::RoutePathStringExpected,
                other.span(),
                format!("`@{namespace}.{verb}` expects a string literal route path"),
            ));
        }
        None | Some([]) => {
            return Err(cx
                .error(
                    ErrorKind::RouteExpected,
                    decorator.span,
                    format!("`@{namespace}.{verb}` needs a route path"),
                )
                .with_help(format!("write `@{namespace}.{verb}(\"/path\")`")));
        }
        Some(_) => {
            return Err(cx.error(
                ErrorKind::RouteExpected,
                decorator.span,
                format!("`@{namespace}.{verb}` takes exactly one argument, the route path"),
            ));
        }
    };

    let (symbol, member) = method_symbol(cx, class, method, decorator.span)?;
    tracing::debug!(%verb, %endpoint, ipc, handler = %member, "route");
    cx.env.graph.add_route(RouteEntry {
        symbol,
        endpoint,
        method: verb,
        ipc,
        location: cx.location(decorator.span),
    });
    cx.edits.remove_decorator(decorator.span);
    Ok(())
}

/// `@Event` on a method named `On<Event>` or `Once<Event>`.
pub fn handle_event(
    cx: &mut FileContext<'_>,
    class: &Class<'_>,
    method: &MethodDefinition<'_>,
    decorator: &Decorator<'_>,
) -> Result<()> {
    if cx.edits.is_decorator_removed(decorator.span) {
        return Ok(());
    }

    let (symbol, member) = method_symbol(cx, class, method, decorator.span)?;
    let Some(binding) = parse_event_name(&member) else {
        return Err(cx
            .error(
                ErrorKind::EventName,
                method.key.span(),
                format!("event handler `{member}` must be named On<Event> or Once<Event>"),
            )
            .with_help("e.g. `OnMessageCreate` or `OnceReady`"));
    };

    tracing::debug!(
        event = %binding.event_type,
        once = binding.once,
        handler = %member,
        "event"
    );
    cx.env.graph.add_event(EventEntry {
        symbol,
        event_type: binding.event_type,
        once: binding.once,
        location: cx.location(decorator.span),
    });
    cx.edits.remove_decorator(decorator.span);
    Ok(())
}
