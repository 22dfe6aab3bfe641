//! # kiln-graph
//!
//! Pure data structures shared by every phase of a kiln build.
//!
//! This crate owns the [`SymbolGraph`]: the process-wide table of traceable
//! declarations plus the facts the decorator handlers extract from them
//! (injectable dependency edges, routes, event bindings, discovered modules).
//! It also defines the [`Runtime`] trait through which the compiler touches the
//! file system, so the core can be driven against an in-memory tree in tests.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     SymbolGraph                          │
//! │   (arena of symbols, RwLock-guarded, one per build)      │
//! └───────────────┬──────────────────────────────────────────┘
//!                 │ SymbolId (index, identity)
//!     ┌───────────┼───────────────┬───────────────┐
//!     ▼           ▼               ▼               ▼
//! ┌─────────┐ ┌──────────┐  ┌───────────┐  ┌────────────┐
//! │ Symbol  │ │Injectable│  │   Route   │  │   Event    │
//! │ (node)  │ │  (edges) │  │  (fact)   │  │  (fact)    │
//! └─────────┘ └──────────┘  └───────────┘  └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use kiln_graph::{ModuleRef, SymbolGraph, SymbolKind};
//!
//! let graph = SymbolGraph::new();
//! let module = ModuleRef::file("/app/src/managers/users.ts");
//!
//! let first = graph.resolve_symbol(&module, "UserManager", SymbolKind::Class, None);
//! let second = graph.resolve_symbol(&module, "UserManager", SymbolKind::Class, None);
//!
//! // Same (module, name) pair always yields the same handle.
//! assert_eq!(first, second);
//! assert_eq!(graph.symbols_by_module(&module), vec![first]);
//! ```
//!
//! ## Thread Safety
//!
//! Files are analyzed concurrently on a blocking pool, so every mutation goes
//! through interior locks. Handles ([`SymbolId`]) are plain indices and can be
//! copied freely between threads.

pub mod entries;
pub mod graph;
pub mod module_ref;
pub mod runtime;
pub mod span;
pub mod symbol;

pub use entries::{EventEntry, FileKind, HttpMethod, InjectableEntry, RouteEntry, SourceModule};
pub use graph::{GraphStatistics, SymbolGraph};
pub use module_ref::ModuleRef;
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
pub use span::SourceLocation;
pub use symbol::{Symbol, SymbolId, SymbolKind};

pub use runtime::native::NativeRuntime;

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils::TestRuntime;

/// Error types for graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A handle that does not belong to this graph.
    #[error("unknown symbol handle: {0}")]
    UnknownSymbol(SymbolId),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;
