//! Command implementations.

pub mod build;
pub mod check;
pub mod init;

use std::sync::Arc;

use kiln_compiler::{BuildReport, Compiler};
use kiln_config::{ConfigOverrides, KilnConfig};
use kiln_graph::NativeRuntime;

use crate::error::Result;
use crate::ui;

/// Load and validate the configuration for a build started in the current
/// directory.
pub fn load_config(overrides: &ConfigOverrides) -> Result<KilnConfig> {
    let cwd = std::env::current_dir()?;
    let config = KilnConfig::load(&cwd, overrides)?;
    config.validate_fs()?;
    tracing::debug!(
        root = %config.root.display(),
        src = %config.source_root().display(),
        out = %config.output_root().display(),
        "configuration loaded"
    );
    Ok(config)
}

pub fn compiler(config: KilnConfig) -> Compiler {
    let runtime = NativeRuntime::new(config.root.clone());
    Compiler::new(Arc::new(runtime), config)
}

/// Warnings first, then one summary line.
pub fn print_report(report: &BuildReport, verb: &str) {
    for warning in &report.warnings {
        ui::warning(&warning.to_string());
    }
    ui::success(&format!(
        "{verb} {}: {}, {}, {}, {}",
        ui::plural(report.modules, "module"),
        ui::plural(report.injectables, "injectable"),
        ui::plural(report.routes, "route"),
        ui::plural(report.events, "event"),
        ui::plural(report.commands, "command"),
    ));
}
