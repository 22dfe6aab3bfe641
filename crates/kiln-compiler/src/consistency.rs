//! Cross-file checks run once every file has been analyzed.

use std::collections::BTreeMap;

use kiln_graph::{HttpMethod, SourceLocation, SymbolGraph, SymbolId};
use rustc_hash::FxHashSet;

use crate::error::{CompileError, ErrorKind, Warning};

/// Fatal conflicts in the collected facts, plus warnings for suspicious but
/// legal ones. Errors are ordered by location.
pub fn check_graph(graph: &SymbolGraph) -> Result<Vec<Warning>, Vec<CompileError>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut routes = graph.routes();
    routes.sort_by(|a, b| a.location.cmp(&b.location));

    let mut endpoints: BTreeMap<(HttpMethod, &str, bool), &SourceLocation> = BTreeMap::new();
    for route in &routes {
        let key = (route.method, route.endpoint.as_str(), route.ipc);
        match endpoints.get(&key) {
            Some(first) => errors.push(
                CompileError::new(
                    ErrorKind::DuplicateRoute,
                    format!(
                        "{} {} is already bound at {first}",
                        route.method.as_str().to_uppercase(),
                        route.endpoint
                    ),
                )
                .at(route.location.clone())
                .with_related((*first).clone()),
            ),
            None => {
                endpoints.insert(key, &route.location);
            }
        }
    }

    duplicates(
        routes.iter().map(|r| (r.symbol, &r.location)),
        "a method can carry only one route decorator",
        &mut errors,
    );

    let mut events = graph.events();
    events.sort_by(|a, b| a.location.cmp(&b.location));
    duplicates(
        events.iter().map(|e| (e.symbol, &e.location)),
        "a method can carry only one `@Event` decorator",
        &mut errors,
    );

    let mut injectables = graph.injectables();
    injectables.sort_by(|a, b| a.location.cmp(&b.location));
    duplicates(
        injectables.iter().map(|i| (i.symbol, &i.location)),
        "a class can be registered for injection only once",
        &mut errors,
    );

    let injectable: FxHashSet<SymbolId> = injectables.iter().map(|i| i.symbol).collect();
    let handlers = routes
        .iter()
        .map(|r| (r.symbol, &r.location))
        .chain(events.iter().map(|e| (e.symbol, &e.location)));
    let mut warned = FxHashSet::default();
    for (symbol, location) in handlers {
        let Ok(method) = graph.symbol(symbol) else {
            continue;
        };
        let Some(class) = method.parent else {
            continue;
        };
        if injectable.contains(&class) || !warned.insert(class) {
            continue;
        }
        let class_name = graph
            .symbol(class)
            .map(|s| s.name.clone())
            .unwrap_or_default();
        warnings.push(Warning::new(
            format!(
                "`{class_name}` has route or event handlers but is not injectable; the runtime cannot instantiate it"
            ),
            Some(location.clone()),
        ));
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        errors.sort_by(|a, b| a.location().cmp(&b.location()));
        Err(errors)
    }
}

fn duplicates<'l>(
    entries: impl Iterator<Item = (SymbolId, &'l SourceLocation)>,
    message: &str,
    errors: &mut Vec<CompileError>,
) {
    let mut seen: BTreeMap<SymbolId, &SourceLocation> = BTreeMap::new();
    for (symbol, location) in entries {
        match seen.get(&symbol) {
            Some(first) => errors.push(
                CompileError::new(ErrorKind::DuplicateDecoration, message)
                    .at(location.clone())
                    .with_related((*first).clone()),
            ),
            None => {
                seen.insert(symbol, location);
            }
        }
    }
}
