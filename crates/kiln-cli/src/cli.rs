//! Command-line interface definition.
//!
//! - `kiln build` - compile the bot and write the output directory
//! - `kiln check` - analyze everything, report every error, write nothing
//! - `kiln init` - write a starter `kiln.toml`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kiln_config::{ConfigOverrides, EmitTarget};

/// Kiln - build-time decorator compiler for chat bots
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Build-time decorator compiler for chat bots",
    long_about = "Kiln reads a bot's TypeScript sources, turns its decorators into\n\
                  dependency, route, event and command manifests, and writes plain\n\
                  modules the runtime can load without evaluating any decorator."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile the project and write the output directory
    ///
    /// Stops at the first error unless --keep-going is given. Nothing is
    /// written when any file fails.
    Build(BuildArgs),

    /// Analyze the project without writing anything
    ///
    /// Every error is reported, not just the first.
    Check(CheckArgs),

    /// Write a starter kiln.toml
    Init(InitArgs),
}

/// Options shared by `build` and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (defaults to the nearest directory with kiln.toml or package.json)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Explicit config file (kiln.toml or package.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory, relative to the root
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Whether emitted modules keep their type annotations
    #[arg(long, value_enum)]
    pub emit: Option<Emit>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Report every error instead of stopping at the first
    #[arg(long)]
    pub keep_going: bool,

    /// Remove the output directory before writing
    #[arg(long)]
    pub clean: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Directory to initialize
    #[arg(default_value = ".", value_name = "DIR")]
    pub dir: PathBuf,

    /// Overwrite an existing kiln.toml
    #[arg(short, long)]
    pub force: bool,
}

/// Output flavor of emitted modules
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum Emit {
    /// Plain JavaScript, types stripped
    #[value(name = "js")]
    Js,
    /// TypeScript, types kept
    #[value(name = "ts")]
    Ts,
}

impl From<Emit> for EmitTarget {
    fn from(emit: Emit) -> Self {
        match emit {
            Emit::Js => EmitTarget::Js,
            Emit::Ts => EmitTarget::Ts,
        }
    }
}

impl ProjectArgs {
    /// Config overrides carried by these flags. Boolean switches only
    /// override when set, so `false` never masks a config file value.
    pub fn overrides(&self, keep_going: bool, clean: bool) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            out_dir: self.out_dir.clone(),
            emit: self.emit.map(EmitTarget::from),
            keep_going: keep_going.then_some(true),
            clean: clean.then_some(true),
            config_file: self.config.clone(),
        }
    }
}

impl BuildArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        self.project.overrides(self.keep_going, self.clean)
    }
}

impl CheckArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        self.project.overrides(false, false)
    }
}
