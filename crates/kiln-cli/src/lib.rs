//! Command-line interface of the kiln decorator compiler.
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`commands`] - `build`, `check` and `init`
//! - [`error`] - CLI errors and their miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines on stderr

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
