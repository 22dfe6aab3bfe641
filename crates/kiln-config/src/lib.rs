//! Configuration for kiln builds.
//!
//! A [`KilnConfig`] is assembled from, in increasing priority: built-in
//! defaults, `kiln.toml` (or the `kiln` field of `package.json`), `KILN_*`
//! environment variables, and command-line overrides.
//!
//! ```no_run
//! use kiln_config::{ConfigOverrides, KilnConfig};
//!
//! let cwd = std::env::current_dir()?;
//! let config = KilnConfig::load(&cwd, &ConfigOverrides::default())?;
//! config.validate()?;
//! println!("compiling {}", config.source_root().display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod discovery;
pub mod error;
mod loading;
pub mod validation;

pub use config::{ConfigOverrides, EmitTarget, KilnConfig};
pub use discovery::ConfigDiscovery;
pub use error::{ConfigError, Result};
