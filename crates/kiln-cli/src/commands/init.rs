//! `kiln init`: write a starter `kiln.toml`.

use std::path::Path;

use crate::cli::InitArgs;
use crate::error::{CliError, Result};
use crate::ui;

/// Starter configuration; every key shows its default.
pub const TEMPLATE: &str = r#"# Kiln configuration. Every key is optional; the values below are the defaults.

# Sources to compile, relative to this file.
src_dir = "src"

# Where compiled modules and manifests are written.
out_dir = ".kiln"

# "js" strips type annotations, "ts" keeps them.
emit = "js"

# Module the generated entry imports `bootstrap` from.
runtime_module = "@kiln/runtime"

# Specifier prefixes provided by the runtime rather than the filesystem.
virtual_prefixes = ["kiln:"]

# Directories under src_dir whose files are commands.
command_dirs = ["commands"]

# Report every error instead of stopping at the first.
keep_going = false

# Remove out_dir before writing.
clean = false

# Import aliases, merged over tsconfig.json `paths`.
[aliases]
"#;

pub async fn execute(args: InitArgs) -> Result<()> {
    let path = write_config(&args.dir, args.force).await?;
    ui::success(&format!("created {}", path.display()));
    ui::info("put your sources under src/ and run `kiln build`");
    Ok(())
}

async fn write_config(dir: &Path, force: bool) -> Result<std::path::PathBuf> {
    let path = dir.join("kiln.toml");
    if !force && tokio::fs::try_exists(&path).await? {
        return Err(CliError::AlreadyExists(path));
    }
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, TEMPLATE).await?;
    tracing::debug!(path = %path.display(), "wrote starter config");
    Ok(path)
}
