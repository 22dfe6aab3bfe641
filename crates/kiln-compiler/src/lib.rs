//! # kiln-compiler
//!
//! Build-time decorator compiler for kiln bots.
//!
//! Bot sources declare services, HTTP/IPC routes and gateway event handlers
//! with decorators (`@Injectable`, `@Http.get("/ping")`, `@Event`). Nothing
//! evaluates those decorators at run time: this crate reads every source file,
//! records what the decorators declare in a [`SymbolGraph`](kiln_graph::SymbolGraph),
//! strips them, rewrites command files into a single bundle, and generates the
//! manifests the runtime bootstraps from.
//!
//! ## Pipeline
//!
//! ```text
//! sources ──► parse ──► ModuleScope ──► ObserverBus walk ──► EditQueue ──► codegen
//!                                          │
//!                                          ▼
//!                                     SymbolGraph ──► consistency ──► manifests
//! ```
//!
//! Each file is compiled independently on a blocking worker; the graph is the
//! only shared state. Output is written only when every file compiled and the
//! collected facts are consistent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use kiln_compiler::Compiler;
//! use kiln_config::KilnConfig;
//! use kiln_graph::NativeRuntime;
//!
//! # async fn run() -> Result<(), kiln_compiler::BuildError> {
//! let config = KilnConfig::for_root("/path/to/bot");
//! let compiler = Compiler::new(Arc::new(NativeRuntime::new("/path/to/bot")), config);
//! let report = compiler.build_project().await?;
//! println!("{} routes, {} events", report.routes, report.events);
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod command;
pub mod consistency;
pub mod decorators;
pub mod dependencies;
pub mod discovery;
pub mod edits;
pub mod emit;
pub mod error;
pub mod layout;
pub mod resolver;
pub mod scope;

mod build;
mod compile;
mod context;

pub use build::{BuildReport, Compiler};
pub use bus::{Node, NodeKind, Observer, ObserverBus, Subscription};
pub use compile::{CompiledFile, SourceFile, compile_source};
pub use context::{CompileEnv, FileContext};
pub use decorators::{DecoratorTable, TargetKind};
pub use emit::{Artifact, CommandModule, ManifestEmitter};
pub use error::{BuildError, CompileError, ErrorCategory, ErrorKind, Result, Warning};
pub use layout::OutputLayout;
pub use resolver::{ImportResolver, Resolved};
pub use scope::ModuleScope;
