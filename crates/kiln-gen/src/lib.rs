//! Parsing and code generation helpers on top of OXC.
//!
//! kiln never prints JavaScript by hand into output files. Generated code is
//! assembled as statements inside an OXC arena, either parsed from small
//! source snippets or moved out of an existing tree, and printed with
//! `oxc_codegen`. Snippets that fail to parse are reported as
//! [`GenError::InvalidSnippet`], so malformed generated code is caught at
//! build time instead of at bot startup.
//!
//! # Examples
//!
//! ```rust
//! use kiln_gen::{Allocator, ImportKind, ImportTable, ProgramBuilder, string_literal};
//!
//! let allocator = Allocator::default();
//! let mut module = ProgramBuilder::new(&allocator);
//!
//! let mut imports = ImportTable::new();
//! let users = imports.import("./managers/users.js", ImportKind::Default, "Users");
//! module.push_source(&imports.render())?;
//! module.push_source(&format!(
//!     "export default [{{ entity: {users}, name: {} }}];",
//!     string_literal("users"),
//! ))?;
//!
//! let code = module.generate()?;
//! assert!(code.contains("import Users from \"./managers/users.js\""));
//! # Ok::<(), kiln_gen::GenError>(())
//! ```

mod error;
mod imports;
mod literal;
mod parser;
mod program_builder;

pub use error::{GenError, Result};
pub use imports::{ImportKind, ImportTable};
pub use literal::{is_identifier, string_literal, to_identifier};
pub use parser::{LineIndex, ParseDiagnostic, ParseOptions, ParsedProgram, parse};
pub use program_builder::{ProgramBuilder, parse_snippet};

// Re-export commonly used OXC types for convenience
pub use oxc_allocator::Allocator;
pub use oxc_span::SourceType;
