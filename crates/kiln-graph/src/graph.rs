//! The process-wide symbol table and fact store.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::{
    Error, EventEntry, FileKind, InjectableEntry, ModuleRef, Result, RouteEntry, SourceModule,
    Symbol, SymbolId, SymbolKind,
};

/// Arena of symbols plus the `(module, name)` index that deduplicates them.
#[derive(Debug, Default)]
struct SymbolArena {
    symbols: Vec<Arc<Symbol>>,
    index: FxHashMap<(ModuleRef, String), SymbolId>,
    by_module: FxHashMap<ModuleRef, Vec<SymbolId>>,
}

#[derive(Debug, Default)]
struct Facts {
    injectables: Vec<InjectableEntry>,
    routes: Vec<RouteEntry>,
    events: Vec<EventEntry>,
    modules: Vec<SourceModule>,
}

/// Symbol table and accumulated decorator facts for one build.
///
/// The graph is created empty at the start of a build and discarded (or
/// [`cleared`](Self::clear)) before the next one. Fact lists are append-only:
/// duplicates are kept so the consistency pass can report them.
#[derive(Debug, Default)]
pub struct SymbolGraph {
    arena: RwLock<SymbolArena>,
    facts: Mutex<Facts>,
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the symbol for `(module, name)`, creating it on first use.
    ///
    /// `kind` and `parent` are only recorded when the symbol is created; later
    /// calls with the same key return the existing handle untouched.
    pub fn resolve_symbol(
        &self,
        module: &ModuleRef,
        name: &str,
        kind: SymbolKind,
        parent: Option<SymbolId>,
    ) -> SymbolId {
        let key = (module.clone(), name.to_string());
        if let Some(id) = self.arena.read().index.get(&key) {
            return *id;
        }

        let mut arena = self.arena.write();
        // Another worker may have inserted the key between the two locks.
        if let Some(id) = arena.index.get(&key) {
            return *id;
        }

        let id = SymbolId::from_index(arena.symbols.len());
        arena.symbols.push(Arc::new(Symbol {
            id,
            name: name.to_string(),
            module: module.clone(),
            kind,
            parent,
        }));
        arena.by_module.entry(module.clone()).or_default().push(id);
        arena.index.insert(key, id);
        tracing::trace!(symbol = %id, module = %module, name, "registered symbol");
        id
    }

    /// Look up a symbol by handle.
    pub fn symbol(&self, id: SymbolId) -> Result<Arc<Symbol>> {
        self.arena
            .read()
            .symbols
            .get(id.index())
            .cloned()
            .ok_or(Error::UnknownSymbol(id))
    }

    /// Look up a symbol by key without creating it.
    pub fn find(&self, module: &ModuleRef, name: &str) -> Option<SymbolId> {
        self.arena
            .read()
            .index
            .get(&(module.clone(), name.to_string()))
            .copied()
    }

    /// All symbols owned by `module`, in registration order.
    pub fn symbols_by_module(&self, module: &ModuleRef) -> Vec<SymbolId> {
        self.arena
            .read()
            .by_module
            .get(module)
            .cloned()
            .unwrap_or_default()
    }

    pub fn add_injectable(&self, entry: InjectableEntry) {
        self.facts.lock().injectables.push(entry);
    }

    pub fn add_route(&self, entry: RouteEntry) {
        self.facts.lock().routes.push(entry);
    }

    pub fn add_event(&self, entry: EventEntry) {
        self.facts.lock().events.push(entry);
    }

    pub fn add_module(&self, path: impl Into<PathBuf>, kind: FileKind) {
        self.facts.lock().modules.push(SourceModule {
            path: path.into(),
            kind,
        });
    }

    pub fn injectables(&self) -> Vec<InjectableEntry> {
        self.facts.lock().injectables.clone()
    }

    pub fn routes(&self) -> Vec<RouteEntry> {
        self.facts.lock().routes.clone()
    }

    pub fn events(&self) -> Vec<EventEntry> {
        self.facts.lock().events.clone()
    }

    pub fn modules(&self) -> Vec<SourceModule> {
        self.facts.lock().modules.clone()
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.arena.read().symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every symbol and fact, ready for a fresh build.
    ///
    /// Handles obtained before the call must not be used afterwards.
    pub fn clear(&self) {
        *self.arena.write() = SymbolArena::default();
        *self.facts.lock() = Facts::default();
    }

    pub fn statistics(&self) -> GraphStatistics {
        let facts = self.facts.lock();
        GraphStatistics {
            symbols: self.len(),
            modules: facts.modules.len(),
            injectables: facts.injectables.len(),
            routes: facts.routes.len(),
            events: facts.events.len(),
        }
    }
}

/// Counts reported at the end of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub symbols: usize,
    pub modules: usize,
    pub injectables: usize,
    pub routes: usize,
    pub events: usize,
}
